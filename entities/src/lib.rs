pub mod api_key;
pub mod catalog;
pub mod chain;
pub mod metadata;
