pub mod config;
pub mod errors;
pub mod filter;
pub mod scheduler;
pub mod source;
pub mod web;
