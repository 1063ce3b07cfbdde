pub mod auth;
pub mod endpoints;
pub mod sync_tasks;
pub mod web_app;
