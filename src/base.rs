//! Shared state and generic behavior every player composes
//!
//! `PlayerBase` is the delegate behind the default methods of
//! `MediaPlayerAdapter`. Concrete players that override a hook call back
//! into it for the generic part (load sequence, duration fallback).

use std::sync::Arc;

use crate::dom::Display;
use crate::events::{EventBus, LifecycleEvent};
use crate::file::MediaFile;
use crate::plugin::{sanitize_seconds, NativePlugin};
use crate::timer::Scheduler;
use crate::PlayerOptions;

pub struct PlayerBase {
    display: Display,
    options: PlayerOptions,
    media_file: MediaFile,
    events: EventBus,
    timers: Scheduler,
    plugin: Option<Arc<dyn NativePlugin>>,
    destroyed: bool,
}

impl PlayerBase {
    pub fn new(display: Display, options: PlayerOptions, media_file: MediaFile) -> Self {
        Self {
            display,
            options,
            media_file,
            events: EventBus::new(),
            timers: Scheduler::new(),
            plugin: None,
            destroyed: false,
        }
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut Display {
        &mut self.display
    }

    pub fn options(&self) -> &PlayerOptions {
        &self.options
    }

    pub fn media_file(&self) -> &MediaFile {
        &self.media_file
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn timers(&self) -> &Scheduler {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut Scheduler {
        &mut self.timers
    }

    pub fn trigger(&self, event: LifecycleEvent) {
        self.events.trigger(&event);
    }

    pub fn attach_plugin(&mut self, plugin: Arc<dyn NativePlugin>) {
        log::debug!("plugin attached to display {}", self.display.id());
        self.plugin = Some(plugin);
    }

    pub fn detach_plugin(&mut self) -> Option<Arc<dyn NativePlugin>> {
        self.plugin.take()
    }

    pub fn plugin(&self) -> Option<&dyn NativePlugin> {
        self.plugin.as_deref()
    }

    /// Generic load sequence: adopt the new media file
    pub fn load(&mut self, file: MediaFile) {
        log::debug!("loading {} ({})", file.url, file.mime_type);
        self.media_file = file;
    }

    /// Generic duration: whatever the media file metadata says
    pub fn fallback_duration(&self) -> f64 {
        self.media_file.duration.map(sanitize_seconds).unwrap_or(0.0)
    }

    /// Generic playback position: plugin report when attached
    pub fn fallback_current_time(&self) -> f64 {
        self.plugin
            .as_deref()
            .map(|p| sanitize_seconds(p.current_time()))
            .unwrap_or(0.0)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Cancel every owned timer and enter the terminal state
    pub fn shutdown(&mut self) {
        self.timers.cancel_all();
        self.destroyed = true;
    }
}

impl std::fmt::Debug for PlayerBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerBase")
            .field("display", &self.display.id())
            .field("media_file", &self.media_file.url)
            .field("plugin", &self.plugin.is_some())
            .field("timers", &self.timers.active_count())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::ScriptedPlugin;

    fn base() -> PlayerBase {
        PlayerBase::new(
            Display::new("display"),
            PlayerOptions::default(),
            MediaFile::new("a.flv", "video/x-flv"),
        )
    }

    #[test]
    fn fallback_duration_uses_metadata() {
        let mut b = base();
        assert_eq!(b.fallback_duration(), 0.0);
        b.load(MediaFile::new("b.flv", "video/x-flv").with_duration(61.0));
        assert_eq!(b.fallback_duration(), 61.0);
        assert_eq!(b.media_file().url, "b.flv");
    }

    #[test]
    fn current_time_follows_plugin() {
        let mut b = base();
        assert_eq!(b.fallback_current_time(), 0.0);
        let p = Arc::new(ScriptedPlugin::new());
        p.set_current_time(9.0);
        b.attach_plugin(p);
        assert_eq!(b.fallback_current_time(), 9.0);
        assert!(b.detach_plugin().is_some());
        assert_eq!(b.fallback_current_time(), 0.0);
    }

    #[test]
    fn shutdown_cancels_timers() {
        let mut b = base();
        b.timers_mut().set_interval(std::time::Duration::from_secs(1));
        b.shutdown();
        assert!(b.is_destroyed());
        assert_eq!(b.timers().active_count(), 0);
    }
}
