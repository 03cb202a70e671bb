//! Classification of feed item links.
//!
//! Every tile on the home page carries a relative link; its prefix decides
//! what kind of item it is. Classification is pure. `browse/` references
//! cannot be finalized here: they need a navigation step to resolve to a
//! playlist id, which the scrape engine performs afterwards.

use crate::error::{FreshetError, Result};

/// A classified item link, before browse references are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkRef {
    Artist {
        channel_id: String,
    },
    Song {
        video_id: String,
        playlist_id: Option<String>,
    },
    Playlist {
        playlist_id: String,
    },
    /// Indirect playlist reference; resolved by navigating to
    /// `browse/<id>` and reading the playlist id off the reached URL.
    Browse {
        browse_id: String,
    },
}

/// Classify a relative item link by its prefix.
///
/// Recognized shapes: `channel/<id>`, `watch?v=<id>[&list=<pid>]`,
/// `playlist?list=<id>` and `browse/<id>`. Anything else fails the whole
/// scrape attempt.
pub fn classify_link(href: &str) -> Result<LinkRef> {
    if let Some(channel_id) = href.strip_prefix("channel/") {
        if channel_id.is_empty() {
            return Err(FreshetError::ParseShape(format!(
                "Channel link without an id: {:?}",
                href
            )));
        }
        return Ok(LinkRef::Artist {
            channel_id: channel_id.to_string(),
        });
    }

    if let Some(query) = href.strip_prefix("watch?") {
        let mut video_id = None;
        let mut playlist_id = None;
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "v" if !value.is_empty() => video_id = Some(value.into_owned()),
                "list" if !value.is_empty() => playlist_id = Some(value.into_owned()),
                _ => {}
            }
        }
        let Some(video_id) = video_id else {
            return Err(FreshetError::ParseShape(format!(
                "Watch link without a video id: {:?}",
                href
            )));
        };
        return Ok(LinkRef::Song {
            video_id,
            playlist_id,
        });
    }

    if let Some(query) = href.strip_prefix("playlist?") {
        let playlist_id = url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, value)| key == "list" && !value.is_empty())
            .map(|(_, value)| value.into_owned());
        let Some(playlist_id) = playlist_id else {
            return Err(FreshetError::ParseShape(format!(
                "Playlist link without a list id: {:?}",
                href
            )));
        };
        return Ok(LinkRef::Playlist { playlist_id });
    }

    if let Some(browse_id) = href.strip_prefix("browse/") {
        if browse_id.is_empty() {
            return Err(FreshetError::ParseShape(format!(
                "Browse link without an id: {:?}",
                href
            )));
        }
        return Ok(LinkRef::Browse {
            browse_id: browse_id.to_string(),
        });
    }

    Err(FreshetError::ParseShape(format!(
        "Unrecognized item link: {:?}",
        href
    )))
}
