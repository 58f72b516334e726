//! Edit buffer holding the live source document

use super::document::{PublishedSnapshot, RenderEpoch};
use super::publisher::DebouncedPublisher;

/// The text the user is editing, wired to the debounced publisher.
///
/// The buffer is the only writer of the source document. User edits go
/// through the quiet period, wholesale replacements are published at once.
pub struct EditBuffer {
    source: String,
    publisher: DebouncedPublisher,
}

impl EditBuffer {
    /// Wrap a publisher; the source starts as the publisher's current document.
    pub fn new(publisher: DebouncedPublisher) -> Self {
        let source = publisher.snapshot().document.to_string();
        Self { source, publisher }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Mutable access for in-place editors. Call [`EditBuffer::commit_edit`]
    /// after the text changed.
    pub fn source_mut(&mut self) -> &mut String {
        &mut self.source
    }

    /// Replace the source with user-typed text and schedule a publish.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.source = text.into();
        self.commit_edit();
    }

    /// Schedule a debounced publish of the current source.
    pub fn commit_edit(&self) {
        self.publisher.update(self.source.as_str());
    }

    /// Replace the source and publish it in the same step.
    pub fn replace(&mut self, text: impl Into<String>) -> RenderEpoch {
        self.source = text.into();
        self.publisher.force_publish(self.source.as_str())
    }

    /// Reload the preview without touching the text.
    pub fn refresh(&self) -> RenderEpoch {
        self.publisher.refresh()
    }

    pub fn published(&self) -> PublishedSnapshot {
        self.publisher.snapshot()
    }

    pub fn publisher(&self) -> &DebouncedPublisher {
        &self.publisher
    }
}
