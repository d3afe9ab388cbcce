mod handler;
mod model;

pub use handler::{complete_setup, load_settings, redirect_setup, save_settings};
