//! Terminal UI: the recording bar screen and the error screen.

pub mod bar;
pub mod error;

pub use bar::{RecordBarTui, UiCommand};
pub use error::ErrorScreen;
