//! Flash fallback player
//!
//! Translates the Flash plugin's discrete callbacks (ready, playing, paused,
//! metadata loaded) and its synchronous number queries into the generic
//! lifecycle-event and getter contract. Two polling timers cover what the
//! plugin does not announce: duration (until it shows up) and playback
//! position (while playing).

use std::time::Duration;

use crate::base::PlayerBase;
use crate::dom::{Display, Element, Query};
use crate::events::LifecycleEvent;
use crate::file::MediaFile;
use crate::markup::{build_embed_markup, EmbedParams};
use crate::plugin::{sanitize_seconds, NativeSignal};
use crate::registry::PlayerKind;
use crate::timer::TimerHandle;
use crate::{MediaPlayerAdapter, PlayerOptions, PlayerPhase};

/// Registry tag of the Flash player
pub const KIND: &str = "flash";

/// Cadence of both polling timers
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Candidate tags for the live plugin node, in preference order
const PLAYER_TAGS: [&str; 2] = ["embed", "object"];

/// Per-media state owned by the adapter
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterState {
    pub ready: bool,
    /// Zero until the ready plugin reports a positive duration
    pub cached_duration: f64,
    pub duration_poll: Option<TimerHandle>,
    pub time_update_poll: Option<TimerHandle>,
    pub phase: PlayerPhase,
    pub metadata_loaded: bool,
}

impl Default for AdapterState {
    fn default() -> Self {
        Self {
            ready: false,
            cached_duration: 0.0,
            duration_poll: None,
            time_update_poll: None,
            phase: PlayerPhase::Uninitialized,
            metadata_loaded: false,
        }
    }
}

#[derive(Debug)]
pub struct FlashPlayerAdapter {
    base: PlayerBase,
    state: AdapterState,
}

impl FlashPlayerAdapter {
    pub fn new(display: Display, options: PlayerOptions, media_file: MediaFile) -> Self {
        Self {
            base: PlayerBase::new(display, options, media_file),
            state: AdapterState::default(),
        }
    }

    /// Selection rank; the lowest, so Flash is only ever the last resort
    pub fn priority() -> i32 {
        0
    }

    /// Flash never claims a file by content type, it is only picked as an
    /// explicit fallback
    pub fn can_handle(_file: &MediaFile) -> bool {
        false
    }

    pub fn build_embed_markup(params: &EmbedParams) -> Element {
        build_embed_markup(params)
    }

    /// Registry entry for this player kind
    pub fn descriptor() -> PlayerKind {
        PlayerKind {
            tag: KIND,
            priority: Self::priority(),
            can_play: Self::can_handle,
            create: create_flash_player,
        }
    }

    pub fn state(&self) -> &AdapterState {
        &self.state
    }

    pub fn metadata_loaded(&self) -> bool {
        self.state.metadata_loaded
    }

    fn accepts_signals(&self, what: &str) -> bool {
        if self.base.is_destroyed() {
            log::warn!("flash player {}: {} after destroy ignored", self.base.options().id, what);
            return false;
        }
        true
    }

    fn cancel(&mut self, handle: Option<TimerHandle>) {
        if let Some(h) = handle {
            self.base.timers_mut().clear_interval(h);
        }
    }

    pub fn on_ready(&mut self) {
        if !self.accepts_signals("ready") {
            return;
        }
        log::debug!("flash player {} ready", self.base.options().id);
        self.state.ready = true;
        if self.state.phase != PlayerPhase::Playing && self.state.phase != PlayerPhase::Paused {
            self.state.phase = PlayerPhase::Ready;
        }
        self.base.trigger(LifecycleEvent::LoadStart);

        let previous = self.state.duration_poll.take();
        self.cancel(previous);
        self.state.duration_poll = Some(self.base.timers_mut().set_interval(POLL_INTERVAL));
    }

    pub fn on_playing(&mut self) {
        if !self.accepts_signals("playing") {
            return;
        }
        self.state.phase = PlayerPhase::Playing;
        self.base.trigger(LifecycleEvent::Playing);

        let previous = self.state.time_update_poll.take();
        self.cancel(previous);
        self.state.time_update_poll = Some(self.base.timers_mut().set_interval(POLL_INTERVAL));
    }

    pub fn on_paused(&mut self) {
        if !self.accepts_signals("paused") {
            return;
        }
        self.state.phase = PlayerPhase::Paused;
        self.base.trigger(LifecycleEvent::Pause);
        let poll = self.state.time_update_poll.take();
        self.cancel(poll);
    }

    pub fn on_metadata_loaded(&mut self) {
        if !self.accepts_signals("metadata") {
            return;
        }
        let poll = self.state.duration_poll.take();
        self.cancel(poll);
        self.state.metadata_loaded = true;
        self.base.trigger(LifecycleEvent::LoadedData);
        self.base.trigger(LifecycleEvent::LoadedMetadata);
        let duration = self.duration();
        self.base.trigger(LifecycleEvent::DurationChange { duration });
    }

    /// Duration as reported by the plugin itself, 0 when unavailable
    pub fn player_reported_duration(&self) -> f64 {
        self.base
            .plugin()
            .map(|p| sanitize_seconds(p.duration()))
            .unwrap_or(0.0)
    }

    fn poll_duration(&mut self) {
        let duration = self.duration();
        log::trace!("duration poll: {}", duration);
        if duration > 0.0 {
            let poll = self.state.duration_poll.take();
            self.cancel(poll);
            self.base.trigger(LifecycleEvent::DurationChange { duration });
        }
    }

    fn poll_time_update(&mut self) {
        let current_time = self.current_time();
        let duration = self.duration();
        self.base.trigger(LifecycleEvent::TimeUpdate {
            current_time,
            duration,
        });
    }
}

fn create_flash_player(
    display: Display,
    options: PlayerOptions,
    file: MediaFile,
) -> Box<dyn MediaPlayerAdapter> {
    Box::new(FlashPlayerAdapter::new(display, options, file))
}

impl MediaPlayerAdapter for FlashPlayerAdapter {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn base(&self) -> &PlayerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PlayerBase {
        &mut self.base
    }

    fn markup(&self) -> Option<Element> {
        Some(build_embed_markup(&self.base.options().embed_params()))
    }

    fn locate_plugin_element(&self) -> bool {
        let query = Query::tag("object").with_attribute("playerType", self.base.options().player_type.as_str());
        self.base.display().contains(&query)
    }

    fn instantiate(&mut self) -> Option<Element> {
        self.reset();
        if !self.base.is_destroyed() {
            self.state.phase = PlayerPhase::Created;
        }
        None
    }

    fn player_element(&self) -> Option<&Element> {
        PLAYER_TAGS
            .iter()
            .find_map(|tag| self.base.display().find(&Query::tag(*tag)))
    }

    fn reset(&mut self) {
        self.state.ready = false;
        self.state.cached_duration = 0.0;
        self.state.metadata_loaded = false;
        if self.state.phase != PlayerPhase::Uninitialized && self.state.phase != PlayerPhase::Destroyed {
            self.state.phase = PlayerPhase::Created;
        }
    }

    fn phase(&self) -> PlayerPhase {
        self.state.phase
    }

    fn destroy(&mut self) {
        log::debug!("destroying flash player {}", self.base.options().id);
        self.reset();
        self.state.duration_poll = None;
        self.state.time_update_poll = None;
        self.base.shutdown();
        self.state.phase = PlayerPhase::Destroyed;
    }

    fn load(&mut self, file: MediaFile) {
        self.state.cached_duration = 0.0;
        self.base.load(file);
    }

    fn duration(&mut self) -> f64 {
        if self.state.cached_duration > 0.0 {
            self.state.cached_duration
        } else if self.is_ready() {
            self.state.cached_duration = self.player_reported_duration();
            self.state.cached_duration
        } else {
            self.base.fallback_duration()
        }
    }

    fn current_time(&self) -> f64 {
        if self.is_ready() {
            self.base.fallback_current_time()
        } else {
            0.0
        }
    }

    fn is_ready(&self) -> bool {
        self.state.ready && self.player_element().is_some()
    }

    fn on_native_signal(&mut self, signal: NativeSignal) {
        match signal {
            NativeSignal::Ready => self.on_ready(),
            NativeSignal::Playing => self.on_playing(),
            NativeSignal::Paused => self.on_paused(),
            NativeSignal::MetadataLoaded => self.on_metadata_loaded(),
        }
    }

    fn on_timer(&mut self, handle: TimerHandle) {
        if self.state.duration_poll == Some(handle) {
            self.poll_duration();
        } else if self.state.time_update_poll == Some(handle) {
            self.poll_time_update();
        }
    }
}
