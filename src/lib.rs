//! Flash Fallback
//!
//! A media-player adapter that lets a generic player front end drive a
//! Flash-based fallback player through uniform lifecycle events
//! (`loadstart`, `playing`, `pause`, `timeupdate`, `durationchange`,
//! `loadeddata`, `loadedmetadata`) and a uniform element-creation call.
//!
//! # Features
//!
//! - **Adapter trait**: `MediaPlayerAdapter` with shared behavior composed
//!   from `PlayerBase`
//! - **Embed markup**: deterministic `<object>`/`<embed>` construction
//! - **Explicit registry**: player kinds are selected through a
//!   `PlayerRegistry` value, not global state
//! - **Deterministic timers**: polling runs on a virtual clock the host
//!   advances (or the tokio `driver` advances in real time)
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use flash_fallback::{Display, MediaFile, PlayerOptions, PlayerRegistry};
//! use flash_fallback::plugin::{NativeSignal, ScriptedPlugin};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = PlayerRegistry::with_defaults();
//! let file = MediaFile::from_url("http://media.test/clip.flv")?;
//! let kind = registry.select(&file, "flash")?;
//! let mut player = registry.create(kind.tag, Display::new("display"), PlayerOptions::default(), file)?;
//!
//! let plugin = Arc::new(ScriptedPlugin::new());
//! plugin.set_duration(120.0);
//! player.attach_plugin(plugin);
//!
//! player.on_native_signal(NativeSignal::Ready);
//! player.advance(Duration::from_secs(1));
//! assert_eq!(player.duration(), 120.0);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod base;
pub mod dom;
pub mod events;
pub mod file;
pub mod markup;
pub mod plugin;
pub mod timer;

// Players
pub mod flash;

// Player-kind selection
pub mod registry;

// Real-time event-loop pump
pub mod driver;

pub use base::PlayerBase;
pub use dom::{Display, Element, Query};
pub use events::{EventBus, EventLog, LifecycleEvent};
pub use file::MediaFile;
pub use flash::FlashPlayerAdapter;
pub use markup::{build_embed_markup, Dimension, EmbedParams};
pub use registry::{PlayerKind, PlayerRegistry};

use plugin::{NativePlugin, NativeSignal};
use timer::TimerHandle;

/// Options a player is constructed with
///
/// Immutable once the embed element has been created. Loadable from JSON
/// with camelCase keys; missing keys take the defaults below.
///
/// # Examples
///
/// ```
/// let opts = flash_fallback::PlayerOptions::from_json(r#"{"swf": "foo.swf", "width": 640}"#).unwrap();
/// assert_eq!(opts.swf, "foo.swf");
/// assert_eq!(opts.player_type, "flash");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerOptions {
    /// Element id (and name) of the embedded player
    pub id: String,
    /// Tag stamped on the object element so the markup can be found again
    pub player_type: String,
    /// URL of the Flash movie
    pub swf: String,
    pub width: Dimension,
    pub height: Dimension,
    /// Flash window mode
    pub wmode: String,
    /// Configuration handed to the movie at construction time
    #[serde(alias = "flashvars")]
    pub flash_vars: BTreeMap<String, String>,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            id: "player".to_string(),
            player_type: "flash".to_string(),
            swf: "flash/player.swf".to_string(),
            width: Dimension::Css("100%".to_string()),
            height: Dimension::Css("350px".to_string()),
            wmode: "transparent".to_string(),
            flash_vars: BTreeMap::new(),
        }
    }
}

impl PlayerOptions {
    /// Parse and validate options from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let opts: PlayerOptions = serde_json::from_str(json)?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> Result<()> {
        if self.swf.trim().is_empty() {
            return Err(Error::ConfigError("swf must not be empty".into()));
        }
        if self.id.trim().is_empty() {
            return Err(Error::ConfigError("id must not be empty".into()));
        }
        if self.player_type.trim().is_empty() {
            return Err(Error::ConfigError("playerType must not be empty".into()));
        }
        Ok(())
    }

    pub fn embed_params(&self) -> EmbedParams {
        EmbedParams {
            width: self.width.clone(),
            height: self.height.clone(),
            id: self.id.clone(),
            player_type: self.player_type.clone(),
            swf: self.swf.clone(),
            wmode: self.wmode.clone(),
            flash_vars: self.flash_vars.clone(),
        }
    }
}

/// Where a player is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerPhase {
    Uninitialized,
    Created,
    Ready,
    Playing,
    Paused,
    Destroyed,
}

/// Uniform control surface over one playback technology
///
/// Required methods are the hooks a player must supply; everything else has
/// a generic implementation backed by `PlayerBase`. Getters never fail: an
/// absent plugin yields 0, false, or the generic fallback.
pub trait MediaPlayerAdapter: Send {
    /// Registry tag of this player kind
    fn kind(&self) -> &'static str;

    fn base(&self) -> &PlayerBase;

    fn base_mut(&mut self) -> &mut PlayerBase;

    /// Markup to insert when the display does not hold the player yet
    fn markup(&self) -> Option<Element> {
        None
    }

    /// Whether the player markup is already present in the display
    fn locate_plugin_element(&self) -> bool;

    /// Create the player; returns the native handle when one is available
    /// synchronously
    fn instantiate(&mut self) -> Option<Element>;

    /// The live plugin node, if present
    fn player_element(&self) -> Option<&Element>;

    /// Clear per-media state
    fn reset(&mut self);

    fn phase(&self) -> PlayerPhase;

    /// Reset and release every owned timer. Terminal.
    fn destroy(&mut self) {
        self.reset();
        self.base_mut().shutdown();
    }

    fn load(&mut self, file: MediaFile) {
        self.base_mut().load(file);
    }

    /// Media duration in seconds
    fn duration(&mut self) -> f64 {
        self.base().fallback_duration()
    }

    /// Playback position in seconds
    fn current_time(&self) -> f64 {
        self.base().fallback_current_time()
    }

    fn is_ready(&self) -> bool {
        self.player_element().is_some()
    }

    /// Entry point for callbacks fired by the plugin runtime
    fn on_native_signal(&mut self, signal: NativeSignal) {
        log::debug!("{} player ignores {:?}", self.kind(), signal);
    }

    /// Called for each due timer while the clock advances
    fn on_timer(&mut self, _handle: TimerHandle) {}

    /// Insert the markup unless already present, then instantiate
    fn construct(&mut self) -> Option<Element> {
        if !self.locate_plugin_element() {
            if let Some(markup) = self.markup() {
                log::debug!("inserting {} markup into {}", self.kind(), self.base().display().id());
                self.base_mut().display_mut().set_content(markup);
            }
        }
        self.instantiate()
    }

    /// Move the player clock forward, firing due timers in order
    fn advance(&mut self, elapsed: Duration) {
        if self.base().is_destroyed() {
            return;
        }
        let deadline = self.base().timers().now().saturating_add(elapsed);
        while let Some(handle) = self.base_mut().timers_mut().pop_due(deadline) {
            self.on_timer(handle);
        }
        self.base_mut().timers_mut().settle(deadline);
    }

    fn attach_plugin(&mut self, plugin: Arc<dyn NativePlugin>) {
        self.base_mut().attach_plugin(plugin);
    }

    fn events_mut(&mut self) -> &mut EventBus {
        self.base_mut().events_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = PlayerOptions::default();
        assert_eq!(opts.player_type, "flash");
        assert_eq!(opts.wmode, "transparent");
        assert!(opts.flash_vars.is_empty());
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_options_from_json() {
        let opts = PlayerOptions::from_json(
            r#"{"id":"p1","swf":"foo.swf","width":640,"height":"360px","wmode":"opaque","flashvars":{"autostart":"false"},"extra":1}"#,
        )
        .unwrap();
        assert_eq!(opts.id, "p1");
        assert_eq!(opts.width, Dimension::Pixels(640));
        assert_eq!(opts.height, Dimension::Css("360px".into()));
        assert_eq!(opts.flash_vars.get("autostart").map(String::as_str), Some("false"));
        assert_eq!(opts.embed_params().swf, "foo.swf");
    }

    #[test]
    fn test_options_validation() {
        assert!(matches!(
            PlayerOptions::from_json(r#"{"swf":""}"#),
            Err(Error::ConfigError(_))
        ));
        assert!(matches!(
            PlayerOptions::from_json("{"),
            Err(Error::ParseError(_))
        ));
    }
}
