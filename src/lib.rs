pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::InMemoryDirectory;
pub use app::{build_router, build_state, AppState};
pub use config::ServerConfig;
pub use crate::core::{Marshaller, RendererRegistry, RouteTable, Schema};
pub use utils::error::{ApiError, Result};
