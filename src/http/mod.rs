pub mod error;
pub mod server;

pub use error::{HttpError, HttpResult};
pub use server::{build_router, start_http_server, ServerState};
