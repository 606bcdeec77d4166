//! Build events.
//!
//! Every console-facing outcome of a build is a [`BuildEvent`]. The shell
//! renders them as status lines, or as one JSON object per line with
//! `--message-format json`.
//!
//! # Stability
//!
//! The JSON schema is keyed by `reason`. New fields may be added, but existing
//! fields should not be removed or renamed.

use std::path::PathBuf;
use std::sync::Mutex;

use serde::Serialize;

/// A build event emitted during the build process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum BuildEvent {
    /// The project description was loaded.
    ProjectLoaded {
        name: String,
        sources: usize,
        headers: usize,
        toolchain: String,
    },

    /// The cache was read and the build kind decided.
    CacheResolved {
        /// `"clean"` or `"incremental"`
        mode: String,
    },

    /// A translation unit is being compiled.
    Compiling { source: PathBuf, object: PathBuf },

    /// The project declares no sources.
    NoSources,

    /// Nothing needed recompiling.
    UpToDate { sources: usize },

    /// Linking has started.
    Linking { output: PathBuf, objects: usize },

    /// The executable was produced.
    LinkSucceeded { output: PathBuf },

    /// Linking was skipped because the executable is current.
    LinkSkipped { output: PathBuf },

    /// Linking failed.
    LinkFailed { output: PathBuf, message: String },

    /// Link was requested without any object files.
    NoObjects,

    /// Build completed (success or failure).
    BuildFinished {
        success: bool,
        compiled: usize,
        duration_ms: u64,
    },
}

impl BuildEvent {
    /// Create a compiling event.
    pub fn compiling(source: impl Into<PathBuf>, object: impl Into<PathBuf>) -> Self {
        BuildEvent::Compiling {
            source: source.into(),
            object: object.into(),
        }
    }

    /// Create a build finished event.
    pub fn finished(success: bool, compiled: usize, duration_ms: u64) -> Self {
        BuildEvent::BuildFinished {
            success,
            compiled,
            duration_ms,
        }
    }

    /// Serialize this event to a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Receiver of build events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: BuildEvent);
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: BuildEvent) {}
}

/// Sink that keeps every event and forwards it to an inner sink.
pub struct EventLog<'a> {
    inner: &'a dyn EventSink,
    events: Mutex<Vec<BuildEvent>>,
}

impl<'a> EventLog<'a> {
    pub fn new(inner: &'a dyn EventSink) -> Self {
        EventLog {
            inner,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Take the recorded events, leaving the log empty.
    pub fn take(&self) -> Vec<BuildEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

impl EventSink for EventLog<'_> {
    fn emit(&self, event: BuildEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
        self.inner.emit(event);
    }
}
