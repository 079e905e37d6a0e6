pub mod api;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod error;
pub mod logging;
pub mod models;
pub mod prices;
pub mod recommendation;
pub mod ui;
