pub mod cache;
pub mod catalog;
pub mod definitions;
mod error;
pub mod hash;
pub mod resolver;
pub mod source;

pub use error::ManifestError;
pub use hash::DefinitionHash;
pub use resolver::{DefinitionResolver, DefinitionTable, DefinitionTables};
