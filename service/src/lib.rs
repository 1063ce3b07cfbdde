pub mod catalog_aggregator;
pub mod diagnostics;
pub mod price_resolver;
pub mod purchase_executor;
pub mod sync_controller;
