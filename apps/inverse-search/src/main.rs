// Prevents a console window flashing up on every click on Windows release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use inverse_search::cli::{Cli, EXIT_ERROR, exit_code};
use inverse_search::logger::{default_log_dir, initialize as LoggerInitialize};

use synctex_core::callback::send_callback;

use std::fs::create_dir_all;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Without a log file the click is still forwarded; stderr is all we lose
    let log_dir = default_log_dir();
    if let Err(e) = create_dir_all(&log_dir) {
        eprintln!("Failed to create log directory {}: {e}", log_dir.display());
    } else if let Err(e) = LoggerInitialize(&log_dir) {
        eprintln!("{e}");
    }

    let callback = match cli.into_callback() {
        Ok(callback) => callback,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    info!(
        "Inverse search {}:{} -> port {}",
        callback.source_path, callback.source_line, callback.port
    );

    let result = send_callback(&callback).await;
    if let Err(e) = &result {
        error!("Failed to reach editor: {e}");
    }

    ExitCode::from(exit_code(&result))
}
