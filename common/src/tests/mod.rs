mod error_location;
mod shared_secret;
