//! Sources module - registered data sources and their storage targets.

mod sources_model;
mod sources_traits;

pub use sources_model::{NewSourceConfig, SourceConfig};
pub use sources_traits::SourceRepositoryTrait;
