pub mod amount;
pub mod config;
pub mod gateway;
pub mod retry;
pub mod str_util;
