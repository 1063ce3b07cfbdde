pub mod metadata_fetcher_http;
