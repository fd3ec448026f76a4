mod handlers;
mod reply;
mod router;
mod types;

pub use router::handle_request;
pub use types::{AppState, Request};
