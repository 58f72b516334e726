#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use anyhow::Context;
use codecraft::app::config::AppConfig;
use codecraft::app::generation::{GeminiClient, GenerationClient, UnavailableClient};
use codecraft::app::preview::{parse_sandbox_args, run_sandbox};
use codecraft::{AppServices, CodeCraftApp};
use eframe::egui;
use std::sync::Arc;
use tracing_subscriber::prelude::*;

const LOG_FILTER: &str =
    "codecraft=info,eframe=info,egui=warn,wgpu=warn,winit=warn,wry=warn,tao=warn,reqwest=warn,hyper=warn";

fn log_dir() -> Option<std::path::PathBuf> {
    directories::ProjectDirs::from("com", "", "codecraft").map(|dirs| dirs.data_dir().join("logs"))
}

/// File logging; the sandbox process writes to its own file
fn init_logging(file_name: &str) {
    let Some(log_dir) = log_dir() else {
        eprintln!("Could not determine log directory, logging disabled");
        return;
    };
    let _ = std::fs::create_dir_all(&log_dir);
    let log_path = log_dir.join(file_name);

    let file = match std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {:?}: {}", log_path, e);
            return;
        }
    };

    // Owner read/write only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = file.metadata() {
            let mut perms = metadata.permissions();
            perms.set_mode(0o600);
            if let Err(e) = std::fs::set_permissions(&log_path, perms) {
                eprintln!("[SECURITY] Failed to set log file permissions: {}", e);
            }
        }
    }

    // RUST_LOG wins over the built-in levels
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(LOG_FILTER));

    let subscriber = tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false),
    );

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return;
    }

    // Bridge log crate events from eframe, wgpu and wry
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to initialize log-to-tracing bridge: {}", e);
    }

    tracing::info!("Logging initialized to: {:?}", log_path);
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        let crash_msg = format!(
            "CodeCraft crashed!\n\
             Panic occurred at: {}\n\
             Details: {}\n\
             Backtrace:\n{:?}\n",
            panic_info
                .location()
                .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
                .unwrap_or_else(|| "unknown location".to_string()),
            panic_info
                .payload()
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| panic_info.payload().downcast_ref::<String>().map(|s| s.as_str()))
                .unwrap_or("unknown panic"),
            std::backtrace::Backtrace::force_capture()
        );

        eprintln!("\n{}", crash_msg);

        if let Some(log_dir) = log_dir() {
            let _ = std::fs::create_dir_all(&log_dir);
            let crash_log_path = log_dir.join("crash.log");

            if let Ok(mut file) = std::fs::OpenOptions::new()
                .append(true)
                .create(true)
                .open(&crash_log_path)
            {
                use std::io::Write;
                let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
                let _ = writeln!(file, "\n=== CRASH at {} ===\n{}", timestamp, crash_msg);
                eprintln!("Crash log written to: {:?}", crash_log_path);
            }
        }
    }));
}

fn build_client(config: &AppConfig) -> Arc<dyn GenerationClient> {
    match GeminiClient::new(&config.generation) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!("Generation client unavailable: {}", e);
            Arc::new(UnavailableClient::new(e.to_string()))
        }
    }
}

fn main() -> anyhow::Result<()> {
    setup_panic_handler();

    let args: Vec<String> = std::env::args().collect();

    if let Some(title) = parse_sandbox_args(&args) {
        init_logging("codecraft-sandbox.log");
        tracing::info!("Sandbox args detected, entering preview mode");
        return run_sandbox(title);
    }

    init_logging("codecraft.log");
    tracing::info!(
        "codecraft starting on {} ({})",
        env!("GIT_BRANCH"),
        env!("GIT_COMMIT")
    );

    let config = AppConfig::load();
    if config.generation.api_key.is_none() {
        tracing::warn!("No API key configured, generation requests will fail");
    }

    // Lives until run_native returns; generation and debounce tasks run here
    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    let services = AppServices {
        runtime: runtime.handle().clone(),
        client: build_client(&config),
        config,
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("CodeCraft")
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "CodeCraft",
        native_options,
        Box::new(|cc| Ok(Box::new(CodeCraftApp::new(cc, services)))),
    )
    .map_err(|e| anyhow::anyhow!("UI event loop failed: {}", e))?;

    runtime.shutdown_timeout(std::time::Duration::from_secs(1));
    tracing::info!("codecraft exited");
    Ok(())
}
