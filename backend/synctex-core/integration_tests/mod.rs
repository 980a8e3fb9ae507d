mod bridge;
mod callback;
mod config;
mod error;
mod helpers;
mod listener;
