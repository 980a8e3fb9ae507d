mod command;
mod launch;
mod listener;
mod request;
mod session;
