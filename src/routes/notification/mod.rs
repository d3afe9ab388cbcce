mod handler;

pub use handler::push_notification;
