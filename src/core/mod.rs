pub mod fields;
pub mod links;
pub mod loader;
pub mod marshal;
pub mod negotiate;
pub mod render;
pub mod routes;
pub mod schema;

pub use crate::domain::model::{Entity, Project, SecurityLevel, User};
pub use crate::domain::ports::{Directory, RouteResolver};
pub use crate::utils::error::Result;
pub use fields::{Field, Rel, ValueTree};
pub use loader::Loaded;
pub use marshal::Marshaller;
pub use negotiate::RendererRegistry;
pub use routes::{ResourceType, RouteTable};
pub use schema::Schema;
