pub mod app;
pub mod config;
pub mod db;
pub mod envelope;
pub mod error;
pub mod state;
pub mod users;
