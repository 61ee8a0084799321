pub mod cli;
pub mod config;
pub mod errors;
pub mod export;
pub mod layout;
pub mod models;
pub mod persistence;
pub mod render;
pub mod state;
pub mod store;
