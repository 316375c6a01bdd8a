pub mod app;
pub mod bootstrap;
pub mod config;
pub mod server;
pub mod services;
pub mod shutdown;

pub use bootstrap::{init_foundation, spawn_background_tasks};
