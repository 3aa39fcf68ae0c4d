//! Library and playback projections

use serde::{Deserialize, Serialize};

use super::media::{MediaType, SeasonMap};

/// Content kind of a library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryKind {
    Movies,
    Shows,
    Music,
    Photos,
    Mixed,
}

/// A library exposed by one instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryDescriptor {
    /// Instance the library belongs to (stamped by the gateway)
    #[serde(default)]
    pub server: String,
    /// Backend-native library id
    pub id: String,
    pub name: String,
    pub kind: LibraryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_count: Option<u64>,
    /// Hidden libraries are only listed on request
    #[serde(default)]
    pub hidden: bool,
    /// Whether the library is covered by the instance's sync list
    #[serde(default)]
    pub synced: bool,
}

/// One item in a library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Backend-native item id
    pub item_id: String,
    pub library_id: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Episodes of one season
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonInfo {
    pub season: u32,
    pub episodes: Vec<u32>,
}

impl SeasonInfo {
    /// Flatten a season map into an ordered list
    pub fn from_season_map(map: &SeasonMap) -> Vec<SeasonInfo> {
        map.seasons()
            .map(|(season, episodes)| SeasonInfo {
                season,
                episodes: episodes.iter().copied().collect(),
            })
            .collect()
    }
}

/// An entry of a resume ("continue watching") or latest list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayItem {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Playback progress (0.0 - 100.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn season_infos_are_ordered() {
        let map: SeasonMap = [(2, 1), (1, 2), (1, 1)].into_iter().collect();
        assert_eq!(
            SeasonInfo::from_season_map(&map),
            vec![
                SeasonInfo {
                    season: 1,
                    episodes: vec![1, 2]
                },
                SeasonInfo {
                    season: 2,
                    episodes: vec![1]
                },
            ]
        );
    }

    #[test]
    fn library_descriptor_defaults() {
        let lib: LibraryDescriptor =
            serde_json::from_str(r#"{"id":"1","name":"Films","kind":"movies"}"#).unwrap();
        assert_eq!(lib.kind, LibraryKind::Movies);
        assert!(!lib.hidden);
        assert!(lib.server.is_empty());
    }
}
