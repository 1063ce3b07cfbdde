pub mod metadata_fetcher;
pub mod registry;
pub mod session;
