//! Explicit registry of player kinds
//!
//! Selection logic receives the registry as a value; nothing here is global.

use std::collections::BTreeMap;

use crate::dom::Display;
use crate::file::MediaFile;
use crate::flash::FlashPlayerAdapter;
use crate::{Error, MediaPlayerAdapter, PlayerOptions, Result};

/// Builds a player for a display, its options and the media to play
pub type PlayerFactory = fn(Display, PlayerOptions, MediaFile) -> Box<dyn MediaPlayerAdapter>;

/// Everything the registry knows about one player kind
#[derive(Clone, Copy)]
pub struct PlayerKind {
    pub tag: &'static str,
    /// Higher ranks win when several kinds can play a file
    pub priority: i32,
    pub can_play: fn(&MediaFile) -> bool,
    pub create: PlayerFactory,
}

impl std::fmt::Debug for PlayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerKind")
            .field("tag", &self.tag)
            .field("priority", &self.priority)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct PlayerRegistry {
    kinds: BTreeMap<&'static str, PlayerKind>,
}

impl PlayerRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every player kind this crate ships
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(FlashPlayerAdapter::descriptor());
        registry
    }

    /// Add a kind, replacing any kind registered under the same tag
    pub fn register(&mut self, kind: PlayerKind) -> Option<PlayerKind> {
        log::debug!("registering player kind {} (priority {})", kind.tag, kind.priority);
        self.kinds.insert(kind.tag, kind)
    }

    pub fn get(&self, tag: &str) -> Option<&PlayerKind> {
        self.kinds.get(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.kinds.keys().copied()
    }

    /// The highest-priority kind that claims the file. Ties go to the tag
    /// that sorts first.
    pub fn best_for(&self, file: &MediaFile) -> Option<&PlayerKind> {
        self.kinds
            .values()
            .filter(|k| (k.can_play)(file))
            .fold(None, |best: Option<&PlayerKind>, k| match best {
                Some(b) if b.priority >= k.priority => Some(b),
                _ => Some(k),
            })
    }

    /// Best capable kind, else the explicit fallback kind
    pub fn select(&self, file: &MediaFile, fallback: &str) -> Result<&PlayerKind> {
        if let Some(kind) = self.best_for(file) {
            return Ok(kind);
        }
        match self.get(fallback) {
            Some(kind) => {
                log::debug!("no player claims {}; falling back to {}", file.url, kind.tag);
                Ok(kind)
            }
            None if fallback.is_empty() => Err(Error::NoPlayerAvailable(file.url.clone())),
            None => Err(Error::UnknownPlayer(fallback.to_string())),
        }
    }

    /// Build and construct a player of the given kind
    pub fn create(
        &self,
        tag: &str,
        display: Display,
        options: PlayerOptions,
        file: MediaFile,
    ) -> Result<Box<dyn MediaPlayerAdapter>> {
        let kind = self
            .get(tag)
            .ok_or_else(|| Error::UnknownPlayer(tag.to_string()))?;
        options.validate()?;
        let mut player = (kind.create)(display, options, file);
        player.construct();
        Ok(player)
    }
}
