//! Bridge to the embedded native plugin
//!
//! The plugin runtime is opaque: players only ask it for numbers. Hosts
//! attach a `NativePlugin` implementation once the embed element is live.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Callbacks the plugin runtime fires into the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeSignal {
    Ready,
    Playing,
    Paused,
    MetadataLoaded,
}

impl std::str::FromStr for NativeSignal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ready" => Ok(NativeSignal::Ready),
            "play" | "playing" => Ok(NativeSignal::Playing),
            "pause" | "paused" => Ok(NativeSignal::Paused),
            "meta" | "metadata" => Ok(NativeSignal::MetadataLoaded),
            other => Err(format!("unknown signal: {}", other)),
        }
    }
}

/// Read-only queries against the native plugin
///
/// Defaults report nothing known (0), which is what players see before the
/// plugin has parsed the media.
pub trait NativePlugin: Send + Sync {
    /// Media duration in seconds
    fn duration(&self) -> f64 {
        0.0
    }

    /// Playback position in seconds
    fn current_time(&self) -> f64 {
        0.0
    }
}

/// Plugin that never reports anything
#[derive(Debug, Default)]
pub struct NoopPlugin;

impl NativePlugin for NoopPlugin {}

/// Plugin whose answers are set from outside, for hosts that mirror plugin
/// state and for deterministic sessions
#[derive(Debug, Default)]
pub struct ScriptedPlugin {
    duration: Mutex<f64>,
    current_time: Mutex<f64>,
    duration_queries: AtomicUsize,
}

impl ScriptedPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_duration(&self, seconds: f64) {
        *self.duration.lock().unwrap_or_else(PoisonError::into_inner) = seconds;
    }

    pub fn set_current_time(&self, seconds: f64) {
        *self
            .current_time
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = seconds;
    }

    /// How many times `duration` has been asked
    pub fn duration_queries(&self) -> usize {
        self.duration_queries.load(Ordering::SeqCst)
    }
}

impl NativePlugin for ScriptedPlugin {
    fn duration(&self) -> f64 {
        self.duration_queries.fetch_add(1, Ordering::SeqCst);
        *self.duration.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_time(&self) -> f64 {
        *self
            .current_time
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clamp a plugin-reported number to a usable, non-negative value
pub(crate) fn sanitize_seconds(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
