//! Sandbox permission set for previewed documents
//!
//! The preview is served with a `Content-Security-Policy: sandbox ...` header,
//! which applies the same restrictions as an `<iframe sandbox>` attribute.
//! The document always gets an opaque origin: `allow-same-origin` and the
//! top-navigation tokens are never emitted, whatever the flags say.

use serde::{Deserialize, Serialize};

/// Capabilities granted to a previewed document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxPolicy {
    pub allow_scripts: bool,
    pub allow_forms: bool,
    pub allow_modals: bool,
    pub allow_popups: bool,
    pub allow_downloads: bool,
}

impl SandboxPolicy {
    /// The fixed permission set used for generated pages
    pub const PREVIEW: SandboxPolicy = SandboxPolicy {
        allow_scripts: true,
        allow_forms: true,
        allow_modals: true,
        allow_popups: true,
        allow_downloads: true,
    };

    /// Everything denied
    pub const LOCKED: SandboxPolicy = SandboxPolicy {
        allow_scripts: false,
        allow_forms: false,
        allow_modals: false,
        allow_popups: false,
        allow_downloads: false,
    };

    /// Sandbox tokens in the order browsers document them
    pub fn tokens(&self) -> Vec<&'static str> {
        [
            (self.allow_scripts, "allow-scripts"),
            (self.allow_forms, "allow-forms"),
            (self.allow_modals, "allow-modals"),
            (self.allow_popups, "allow-popups"),
            (self.allow_downloads, "allow-downloads"),
        ]
        .into_iter()
        .filter_map(|(granted, token)| granted.then_some(token))
        .collect()
    }

    /// Value for the `Content-Security-Policy` response header
    pub fn csp_header(&self) -> String {
        let tokens = self.tokens();
        if tokens.is_empty() {
            "sandbox".to_string()
        } else {
            format!("sandbox {}", tokens.join(" "))
        }
    }
}

impl Default for SandboxPolicy {
    fn default() -> Self {
        Self::PREVIEW
    }
}
