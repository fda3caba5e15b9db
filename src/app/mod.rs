pub mod handlers;
pub mod response;
pub mod router;
pub mod server;
pub mod state;

pub use router::build_router;
pub use server::{run, serve_with_shutdown};
pub use state::{build_state, AppState};
