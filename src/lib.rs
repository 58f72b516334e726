//! CodeCraft - describe a web page, get a working single-file HTML document
//!
//! The user types a prompt, a generation model returns a complete HTML page,
//! and the page runs in a sandboxed live preview next to its editable source.
//!
//! # Architecture
//!
//! - **UI** ([`app::dashui`]): egui window with prompt panel, code view and layout toolbar
//! - **Generation** ([`app::generation`]): one request at a time, results applied on the UI thread
//! - **Preview** ([`app::preview`]): edits are debounced, each published document gets a new
//!   render epoch, and every epoch is mounted in a fresh webview in a separate sandbox process
//!
//! The same binary runs both sides. Started with `--sandbox` it becomes the
//! preview process and reads [`app::preview::SandboxCommand`] lines from stdin.

#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub use app::{AppServices, CodeCraftApp};
