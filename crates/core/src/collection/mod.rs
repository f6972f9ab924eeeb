//! Collection module - drives registered sources through collect and write.

mod collection_service;
mod collection_traits;

#[cfg(test)]
mod collection_service_tests;

pub use collection_service::CollectionService;
pub use collection_traits::{CollectionServiceTrait, SourceRunResult};
