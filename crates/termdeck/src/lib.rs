pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod layout;
pub mod logging;
pub mod navigation;
pub mod parser;
pub mod render;
pub mod settings;
pub mod source;
pub mod terminal;
pub mod theme;
pub mod validate;
