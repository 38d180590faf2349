//! Application composition
//!
//! Configuration loading and construction of the long-lived components.

mod config;
mod init;
mod loader;

pub use config::AppConfig;
pub use init::App;
pub use loader::load_config;
