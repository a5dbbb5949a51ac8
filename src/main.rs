//! holdrec — press-and-hold voice message recorder for the terminal.

mod app;
mod capture;
mod commands;
mod config;
mod logging;
mod recordbar;
mod ui;

#[tokio::main]
async fn main() {
    if let Err(e) = app::run().await {
        tracing::error!("Fatal error: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
