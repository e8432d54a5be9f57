pub mod actors;
pub mod cli;
pub mod error;
pub mod github;
pub mod models;
pub mod platform;
pub mod repl;
pub mod settings;
pub mod types;
pub mod view;
