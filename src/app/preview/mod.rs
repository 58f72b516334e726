//! Sandboxed live-preview pipeline
//!
//! ```text
//! edits ──► EditBuffer ──► DebouncedPublisher ──► SandboxRenderer ──► sandbox process
//!                ▲            (quiet period)        (epoch change        (wry webview,
//!   generation ──┘ replace ── force_publish ──►      = teardown +         CSP sandbox)
//!                                                     rebuild)
//! ```
//!
//! - [`publisher`] owns the published document and the render epoch
//! - [`edit_buffer`] owns the live source text
//! - [`renderer`] turns epoch changes into explicit teardown/rebuild calls
//! - [`process_host`] and [`sandbox_window`] are the two sides of the
//!   out-of-process webview host

pub mod document;
pub mod edit_buffer;
pub mod policy;
pub mod process_host;
pub mod protocol;
pub mod publisher;
pub mod renderer;
pub mod sandbox_window;

pub use document::{PublishedSnapshot, RenderEpoch};
pub use edit_buffer::EditBuffer;
pub use policy::SandboxPolicy;
pub use process_host::{parse_sandbox_args, ProcessSandboxHost};
pub use protocol::{PreviewFrame, SandboxCommand, ScreenPoint};
pub use publisher::{DebouncedPublisher, PublishListener, DEFAULT_QUIET_PERIOD};
pub use renderer::{SandboxError, SandboxHost, SandboxRenderer};
pub use sandbox_window::run_sandbox;
