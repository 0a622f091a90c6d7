//! Clipboard sinks.
//!
//! A copy writes a single item carrying both an HTML and a plain-text
//! representation. [`SystemClipboard`] talks to the desktop clipboard,
//! [`MemoryClipboard`] keeps the payloads in memory.

use crate::error::ClipboardError;
use serde::Serialize;

/// The two representations written by one copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClipboardPayload {
    pub html: String,
    pub text: String,
}

pub trait ClipboardSink {
    /// Write both representations of `payload` in one call.
    fn write(&mut self, payload: &ClipboardPayload) -> Result<(), ClipboardError>;
}

impl<S: ClipboardSink + ?Sized> ClipboardSink for &mut S {
    fn write(&mut self, payload: &ClipboardPayload) -> Result<(), ClipboardError> {
        (**self).write(payload)
    }
}

/// The desktop clipboard.
///
/// On X11 and Wayland the contents are owned by the writing process, so a
/// short-lived process may lose them on exit unless a clipboard manager takes
/// them over.
pub struct SystemClipboard {
    #[cfg(feature = "system-clipboard")]
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    #[cfg(feature = "system-clipboard")]
    pub fn new() -> Result<Self, ClipboardError> {
        let inner = arboard::Clipboard::new().map_err(|e| ClipboardError::Access(e.to_string()))?;
        Ok(SystemClipboard { inner })
    }

    #[cfg(not(feature = "system-clipboard"))]
    pub fn new() -> Result<Self, ClipboardError> {
        Err(ClipboardError::Unavailable)
    }
}

impl ClipboardSink for SystemClipboard {
    #[cfg(feature = "system-clipboard")]
    fn write(&mut self, payload: &ClipboardPayload) -> Result<(), ClipboardError> {
        self.inner
            .set_html(payload.html.as_str(), Some(payload.text.as_str()))
            .map_err(|e| ClipboardError::Write(e.to_string()))
    }

    #[cfg(not(feature = "system-clipboard"))]
    fn write(&mut self, _payload: &ClipboardPayload) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable)
    }
}

/// Records payloads instead of publishing them.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    writes: Vec<ClipboardPayload>,
    failure: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects every write with `message`.
    pub fn failing(message: &str) -> Self {
        MemoryClipboard {
            writes: Vec::new(),
            failure: Some(message.to_string()),
        }
    }

    pub fn writes(&self) -> &[ClipboardPayload] {
        &self.writes
    }

    pub fn last(&self) -> Option<&ClipboardPayload> {
        self.writes.last()
    }
}

impl ClipboardSink for MemoryClipboard {
    fn write(&mut self, payload: &ClipboardPayload) -> Result<(), ClipboardError> {
        if let Some(message) = &self.failure {
            return Err(ClipboardError::Write(message.clone()));
        }
        self.writes.push(payload.clone());
        Ok(())
    }
}
