//! Media file descriptor handed to players

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// The media a player is asked to play
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaFile {
    pub url: String,
    pub mime_type: String,
    /// Duration from file metadata, when the host knows it up front
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl MediaFile {
    pub fn new(url: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mime_type: mime_type.into(),
            duration: None,
        }
    }

    /// Build a descriptor from a URL or relative path, guessing the MIME
    /// type from the extension.
    pub fn from_url(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::ConfigError("empty media url".into()));
        }
        let path = match Url::parse(raw) {
            Ok(u) => u.path().to_string(),
            Err(url::ParseError::RelativeUrlWithoutBase) => raw
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string(),
            Err(e) => return Err(e.into()),
        };
        let mime = extension(&path)
            .and_then(|ext| mime_for_extension(&ext))
            .unwrap_or("");
        Ok(Self::new(raw, mime))
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    /// File extension of the url path, lowercased
    pub fn extension(&self) -> Option<String> {
        extension(&self.url)
    }
}

fn extension(path: &str) -> Option<String> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let name = path.rsplit('/').next()?;
    let (_, ext) = name.rsplit_once('.')?;
    (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

fn mime_for_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext {
        "flv" => "video/x-flv",
        "f4v" | "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "ogg" | "ogv" => "video/ogg",
        "oga" => "audio/ogg",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_mime_from_absolute_url() {
        let f = MediaFile::from_url("http://media.test/clips/intro.FLV?token=1").unwrap();
        assert_eq!(f.mime_type, "video/x-flv");
        assert_eq!(f.extension().as_deref(), Some("flv"));
        assert_eq!(f.duration, None);
    }

    #[test]
    fn relative_paths_are_accepted() {
        let f = MediaFile::from_url("media/song.mp3").unwrap();
        assert_eq!(f.mime_type, "audio/mpeg");
        assert_eq!(f.url, "media/song.mp3");
    }

    #[test]
    fn unknown_extension_leaves_mime_empty() {
        let f = MediaFile::from_url("http://media.test/stream").unwrap();
        assert_eq!(f.mime_type, "");
    }

    #[test]
    fn empty_url_is_rejected() {
        assert!(matches!(MediaFile::from_url("  "), Err(Error::ConfigError(_))));
    }

    #[test]
    fn with_duration_sets_metadata() {
        let f = MediaFile::new("a.mp4", "video/mp4").with_duration(30.0);
        assert_eq!(f.duration, Some(30.0));
    }
}
