pub mod cli;
pub mod es_store;
pub mod load_config;

pub use cli::{execute, run, Cli, Commands};
