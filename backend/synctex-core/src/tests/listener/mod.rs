mod dispatch;
mod validation;
