//! Lifecycle scenarios for the Flash fallback player

use std::sync::Arc;
use std::time::Duration;

use flash_fallback::flash::POLL_INTERVAL;
use flash_fallback::plugin::{NativeSignal, ScriptedPlugin};
use flash_fallback::{
    Display, EventLog, FlashPlayerAdapter, LifecycleEvent, MediaFile, MediaPlayerAdapter, PlayerOptions,
    PlayerPhase,
};

struct Session {
    player: FlashPlayerAdapter,
    plugin: Arc<ScriptedPlugin>,
    log: EventLog,
}

fn session(file: MediaFile) -> Session {
    let mut player = FlashPlayerAdapter::new(Display::new("display"), PlayerOptions::default(), file);
    player.construct();
    let plugin = Arc::new(ScriptedPlugin::new());
    player.attach_plugin(plugin.clone());
    let log = EventLog::new();
    log.attach(player.events_mut());
    Session { player, plugin, log }
}

#[test]
fn duration_reported_on_next_poll_fires_once() {
    let mut s = session(MediaFile::new("clip.flv", "video/x-flv"));
    s.player.on_native_signal(NativeSignal::Ready);
    s.plugin.set_duration(120.0);

    s.player.advance(POLL_INTERVAL);
    s.player.advance(POLL_INTERVAL * 5);

    let changes: Vec<_> = s
        .log
        .events()
        .into_iter()
        .filter(|e| e.name() == "durationchange")
        .collect();
    assert_eq!(changes, vec![LifecycleEvent::DurationChange { duration: 120.0 }]);
    assert!(s.player.state().duration_poll.is_none());
}

#[test]
fn pause_silences_time_updates_for_two_ticks() {
    let mut s = session(MediaFile::new("clip.flv", "video/x-flv"));
    s.player.on_native_signal(NativeSignal::Ready);
    s.player.on_native_signal(NativeSignal::Playing);
    s.player.advance(POLL_INTERVAL);
    let before = s.log.count("timeupdate");
    assert_eq!(before, 1);

    s.player.on_native_signal(NativeSignal::Paused);
    s.player.advance(POLL_INTERVAL);
    s.player.advance(POLL_INTERVAL);
    assert_eq!(s.log.count("timeupdate"), before);
    assert_eq!(s.log.names().last(), Some(&"pause"));
}

#[test]
fn play_pause_can_alternate() {
    let mut s = session(MediaFile::new("clip.flv", "video/x-flv"));
    s.plugin.set_duration(10.0);
    s.player.on_ready();
    for _ in 0..3 {
        s.player.on_playing();
        s.player.advance(Duration::from_millis(2500));
        s.player.on_paused();
        s.player.advance(Duration::from_secs(3));
    }
    assert_eq!(s.log.count("playing"), 3);
    assert_eq!(s.log.count("pause"), 3);
    assert_eq!(s.log.count("timeupdate"), 6);
    assert_eq!(s.player.phase(), PlayerPhase::Paused);
}

#[test]
fn cached_duration_is_not_requeried() {
    let mut s = session(MediaFile::new("clip.flv", "video/x-flv"));
    s.plugin.set_duration(75.0);
    s.player.on_ready();
    let first = s.player.duration();
    let queries = s.plugin.duration_queries();
    for _ in 0..10 {
        assert_eq!(s.player.duration(), first);
    }
    assert_eq!(s.plugin.duration_queries(), queries);
}

#[test]
fn reset_then_duration_returns_fallback() {
    let mut s = session(MediaFile::new("clip.flv", "video/x-flv").with_duration(33.0));
    s.plugin.set_duration(75.0);
    s.player.on_ready();
    assert_eq!(s.player.duration(), 75.0);
    s.player.reset();
    assert_eq!(s.player.duration(), 33.0);
}

#[test]
fn handle_without_ready_flag_is_not_ready() {
    let s = session(MediaFile::default());
    assert!(s.player.player_element().is_some());
    assert!(!s.player.is_ready());
}

#[test]
fn existing_markup_is_reused() {
    let display = Display::from_html(
        "display",
        r#"<div><object playerType="flash" id="player"><embed id="player" src="old.swf"></object></div>"#,
    );
    let mut player = FlashPlayerAdapter::new(display, PlayerOptions::default(), MediaFile::default());
    assert!(player.locate_plugin_element());
    player.construct();
    let embed = player.player_element().expect("embed present");
    assert_eq!(embed.attribute("src"), Some("old.swf"));
}

#[test]
fn full_session_event_order() {
    let mut s = session(MediaFile::new("clip.flv", "video/x-flv"));
    s.player.on_native_signal(NativeSignal::Ready);
    s.plugin.set_duration(42.0);
    s.player.on_native_signal(NativeSignal::MetadataLoaded);
    s.player.on_native_signal(NativeSignal::Playing);
    s.plugin.set_current_time(1.0);
    s.player.advance(POLL_INTERVAL);
    s.player.on_native_signal(NativeSignal::Paused);
    s.player.destroy();

    assert_eq!(
        s.log.events(),
        vec![
            LifecycleEvent::LoadStart,
            LifecycleEvent::LoadedData,
            LifecycleEvent::LoadedMetadata,
            LifecycleEvent::DurationChange { duration: 42.0 },
            LifecycleEvent::Playing,
            LifecycleEvent::TimeUpdate {
                current_time: 1.0,
                duration: 42.0
            },
            LifecycleEvent::Pause,
        ]
    );
    assert!(!s.player.metadata_loaded());
    assert_eq!(s.player.phase(), PlayerPhase::Destroyed);
}

#[test]
fn huge_clock_jump_does_not_overflow() {
    let mut s = session(MediaFile::new("clip.flv", "video/x-flv"));
    s.player.advance(Duration::MAX);
    assert_eq!(s.player.base().timers().now(), Duration::MAX);

    s.plugin.set_duration(120.0);
    s.player.on_native_signal(NativeSignal::Ready);
    s.player.on_native_signal(NativeSignal::Playing);
    s.player.advance(POLL_INTERVAL);
    s.player.advance(Duration::MAX);

    assert_eq!(s.log.count("durationchange"), 1);
    assert_eq!(s.log.count("timeupdate"), 1);
    assert_eq!(s.player.base().timers().active_count(), 0);
    assert_eq!(s.player.duration(), 120.0);
}
