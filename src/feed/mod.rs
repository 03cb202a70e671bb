//! Domain model for the scraped home feed.
//!
//! A [`Snapshot`] is one complete scrape result: an ordered list of
//! [`Section`]s, each holding an ordered list of [`FeedItem`]s. Snapshots are
//! immutable once built and serialize to the wire format served by the HTTP
//! layer (a bare JSON array of sections).

mod classify;

pub use classify::{classify_link, LinkRef};

use serde::{Deserialize, Serialize};

/// A single entry in a feed section.
///
/// Serializes as `{"type": "song"|"artist"|"playlist", "id": ..}` with
/// `playlist_id` present only on songs that belong to a playlist context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedItem {
    Song {
        id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        playlist_id: Option<String>,
    },
    Artist {
        id: String,
    },
    Playlist {
        id: String,
    },
}

/// One titled row of the home feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    /// Secondary heading, e.g. "Mixed for you". Serialized as `null` when the
    /// section has no subtitle.
    pub subtitle: Option<String>,
    pub items: Vec<FeedItem>,
}

/// A complete, atomically produced feed result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    pub sections: Vec<Section>,
}

impl Snapshot {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Total number of items across all sections.
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_song_serializes_with_type_tag() {
        let item = FeedItem::Song {
            id: "abc".to_string(),
            playlist_id: None,
        };
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"type": "song", "id": "abc"})
        );
    }

    #[test]
    fn test_song_in_playlist_context_keeps_playlist_id() {
        let item = FeedItem::Song {
            id: "abc".to_string(),
            playlist_id: Some("PL1".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"type": "song", "id": "abc", "playlist_id": "PL1"})
        );
    }

    #[test]
    fn test_artist_and_playlist_serialize() {
        let artist = FeedItem::Artist {
            id: "UC123".to_string(),
        };
        let playlist = FeedItem::Playlist {
            id: "PL2".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&artist).unwrap(),
            json!({"type": "artist", "id": "UC123"})
        );
        assert_eq!(
            serde_json::to_value(&playlist).unwrap(),
            json!({"type": "playlist", "id": "PL2"})
        );
    }

    #[test]
    fn test_section_subtitle_serializes_as_null_when_absent() {
        let section = Section {
            title: "New releases".to_string(),
            subtitle: None,
            items: vec![],
        };
        assert_eq!(
            serde_json::to_value(&section).unwrap(),
            json!({"title": "New releases", "subtitle": null, "items": []})
        );
    }

    #[test]
    fn test_snapshot_serializes_as_bare_array() {
        let snapshot = Snapshot::new(vec![Section {
            title: "Listen again".to_string(),
            subtitle: Some("Mixed for you".to_string()),
            items: vec![FeedItem::Artist {
                id: "UC1".to_string(),
            }],
        }]);
        assert_eq!(
            serde_json::to_value(&snapshot).unwrap(),
            json!([{
                "title": "Listen again",
                "subtitle": "Mixed for you",
                "items": [{"type": "artist", "id": "UC1"}]
            }])
        );
    }

    #[test]
    fn test_snapshot_round_trips() {
        let snapshot = Snapshot::new(vec![Section {
            title: "Quick picks".to_string(),
            subtitle: None,
            items: vec![FeedItem::Song {
                id: "v1".to_string(),
                playlist_id: Some("RDAMVM".to_string()),
            }],
        }]);
        let encoded = serde_json::to_string(&snapshot).unwrap();
        let decoded: Snapshot = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_item_count_spans_sections() {
        let snapshot = Snapshot::new(vec![
            Section {
                title: "A".to_string(),
                subtitle: None,
                items: vec![
                    FeedItem::Artist {
                        id: "a".to_string(),
                    },
                    FeedItem::Playlist {
                        id: "b".to_string(),
                    },
                ],
            },
            Section {
                title: "B".to_string(),
                subtitle: None,
                items: vec![FeedItem::Artist {
                    id: "c".to_string(),
                }],
            },
        ]);
        assert_eq!(snapshot.item_count(), 3);
    }
}
