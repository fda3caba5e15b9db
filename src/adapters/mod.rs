// Adapters layer: concrete implementations of the domain ports.

pub mod memory;

pub use memory::{DirectorySeed, InMemoryDirectory, ProjectSeed};
