//! Storage for registered sources and the default category mapping.

mod model;
mod repository;

pub use model::{NewSourceTypeCategoryDB, SourceConfigDB};
pub use repository::SourceRepository;
