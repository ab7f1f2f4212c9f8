pub mod commands;
pub mod config;
pub mod host;
pub mod installer;
pub mod package;
pub mod plugin;
pub mod runtime;
