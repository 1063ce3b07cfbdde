pub mod logging;
pub mod rest;
