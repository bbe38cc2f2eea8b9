pub mod core;
pub mod models;
pub mod output;
