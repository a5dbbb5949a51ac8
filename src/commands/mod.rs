//! Application command handlers for holdrec.
//!
//! # Commands
//! - `record`: The press-and-hold recording bar (default command)
//! - `list_devices`: List available audio input devices
//! - `config`: Open configuration file in user's preferred editor
//! - `logs`: Display recent log entries

pub mod config;
pub mod list_devices;
pub mod logs;
pub mod record;

pub use config::handle_config;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use record::handle_record;
