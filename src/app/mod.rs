//! Core application modules for CodeCraft.
//!
//! ## Pipeline
//! - [`generation`] - prompt to document requests against the model API
//! - [`preview`] - debounced publishing and the sandboxed preview renderer
//!
//! ## Infrastructure
//! - [`config`] - `codecraft.toml` loading and environment overrides
//! - [`dashui`] - the egui user interface

pub mod config;
pub mod dashui;
pub mod generation;
pub mod preview;

pub use dashui::app::{AppServices, CodeCraftApp};
