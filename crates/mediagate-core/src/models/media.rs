//! Media identity and existence models

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of media being resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Movie => f.write_str("movie"),
            MediaType::Tv => f.write_str("tv"),
        }
    }
}

/// Recognised media supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Media type
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Localised title
    pub title: String,
    /// Title in the original language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    /// Release year (first air year for shows)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    /// TMDB identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<u64>,
}

impl MediaInfo {
    pub fn movie(title: impl Into<String>) -> Self {
        Self {
            media_type: MediaType::Movie,
            title: title.into(),
            original_title: None,
            year: None,
            tmdb_id: None,
        }
    }

    pub fn tv(title: impl Into<String>) -> Self {
        Self {
            media_type: MediaType::Tv,
            ..Self::movie(title)
        }
    }

    pub fn with_year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_tmdb_id(mut self, tmdb_id: u64) -> Self {
        self.tmdb_id = Some(tmdb_id);
        self
    }

    pub fn with_original_title(mut self, original_title: impl Into<String>) -> Self {
        self.original_title = Some(original_title.into());
        self
    }

    /// Borrowed identity fields passed to backend lookups
    pub fn query(&self) -> MediaQuery<'_> {
        MediaQuery {
            title: &self.title,
            original_title: self.original_title.as_deref(),
            year: self.year,
            tmdb_id: self.tmdb_id,
        }
    }

    /// "Title (Year)" for log lines
    pub fn title_year(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }
}

/// Identity fields a backend matches against its own library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaQuery<'a> {
    pub title: &'a str,
    pub original_title: Option<&'a str>,
    pub year: Option<u16>,
    pub tmdb_id: Option<u64>,
}

/// Per-season set of episode numbers known to exist for a show.
///
/// Seasons and episodes are kept ordered and an episode number can only
/// appear once per season.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeasonMap(BTreeMap<u32, BTreeSet<u32>>);

impl SeasonMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one episode; returns false if it was already present
    pub fn insert(&mut self, season: u32, episode: u32) -> bool {
        self.0.entry(season).or_default().insert(episode)
    }

    pub fn contains(&self, season: u32, episode: u32) -> bool {
        self.0
            .get(&season)
            .is_some_and(|episodes| episodes.contains(&episode))
    }

    /// Episodes recorded for one season
    pub fn episodes(&self, season: u32) -> Option<&BTreeSet<u32>> {
        self.0.get(&season)
    }

    pub fn seasons(&self) -> impl Iterator<Item = (u32, &BTreeSet<u32>)> {
        self.0.iter().map(|(season, episodes)| (*season, episodes))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of distinct episodes across all seasons
    pub fn episode_count(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }
}

impl FromIterator<(u32, u32)> for SeasonMap {
    fn from_iter<I: IntoIterator<Item = (u32, u32)>>(iter: I) -> Self {
        let mut map = SeasonMap::new();
        map.extend(iter);
        map
    }
}

impl Extend<(u32, u32)> for SeasonMap {
    fn extend<I: IntoIterator<Item = (u32, u32)>>(&mut self, iter: I) {
        for (season, episode) in iter {
            self.insert(season, episode);
        }
    }
}

/// Episodes a backend holds for one show
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TvEpisodes {
    /// Backend-native id of the show
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    pub seasons: SeasonMap,
}

/// Where a media item already exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistMediaInfo {
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Name of the instance holding the item
    pub server: String,
    /// Backend-native item id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    /// Episodes present per season (TV only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasons: Option<SeasonMap>,
}

impl ExistMediaInfo {
    pub fn movie(server: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            media_type: MediaType::Movie,
            server: server.into(),
            item_id: Some(item_id.into()),
            seasons: None,
        }
    }

    pub fn tv(server: impl Into<String>, item_id: Option<String>, seasons: SeasonMap) -> Self {
        Self {
            media_type: MediaType::Tv,
            server: server.into(),
            item_id,
            seasons: Some(seasons),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn season_map_ignores_duplicates() {
        let mut map = SeasonMap::new();
        assert!(map.insert(1, 1));
        assert!(map.insert(1, 2));
        assert!(!map.insert(1, 2));
        map.extend([(2, 1), (1, 1), (2, 1)]);

        assert_eq!(map.episode_count(), 3);
        assert_eq!(
            map.seasons()
                .map(|(s, eps)| (s, eps.iter().copied().collect::<Vec<_>>()))
                .collect::<Vec<_>>(),
            vec![(1, vec![1, 2]), (2, vec![1])]
        );
        assert!(map.contains(2, 1));
        assert!(!map.contains(2, 2));
        assert!(!map.contains(3, 1));
        assert_eq!(map.episodes(1).map(|eps| eps.len()), Some(2));
        assert!(map.episodes(3).is_none());
    }

    #[test]
    fn season_map_serializes_as_plain_map() {
        let map: SeasonMap = [(2, 3), (1, 2), (1, 1)].into_iter().collect();
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, serde_json::json!({ "1": [1, 2], "2": [3] }));
    }

    #[test]
    fn media_info_query_borrows_fields() {
        let info = MediaInfo::movie("Nightfall")
            .with_year(2021)
            .with_tmdb_id(555)
            .with_original_title("La Nuit");
        let query = info.query();

        assert_eq!(query.title, "Nightfall");
        assert_eq!(query.original_title, Some("La Nuit"));
        assert_eq!(query.year, Some(2021));
        assert_eq!(query.tmdb_id, Some(555));
        assert_eq!(info.title_year(), "Nightfall (2021)");
    }

    #[test]
    fn exist_media_info_shape() {
        let movie = ExistMediaInfo::movie("den", "42");
        let json = serde_json::to_value(&movie).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "movie", "server": "den", "item_id": "42" })
        );
    }
}
