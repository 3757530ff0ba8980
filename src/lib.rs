pub mod app;
pub mod config;
pub mod confirm;
pub mod domain;
pub mod error;
pub mod output;
pub mod resolver;
pub mod season;
pub mod store;
pub mod tui;
pub mod validate;
pub mod writer;
