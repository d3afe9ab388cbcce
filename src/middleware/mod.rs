mod auth;
mod error_handler;
mod hook;

pub use auth::identify_caller;
pub use error_handler::log_errors;
pub use hook::{HOOK_SECRET_HEADER, require_hook_secret};
