use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the authenticated end user a cache entry is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Every browsable list the card knows about.
///
/// The slug is the stable cache key component; the service name is what the
/// backend exposes for fetching the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListKind {
    AlbumFavorites,
    ArtistFavorites,
    ArtistsFollowed,
    AudiobookFavorites,
    Categories,
    CategoryPlaylists,
    Devices,
    EpisodeFavorites,
    PlaylistFavorites,
    RecentlyPlayed,
    ShowFavorites,
    TrackFavorites,
}

impl ListKind {
    pub const ALL: [ListKind; 12] = [
        Self::AlbumFavorites,
        Self::ArtistFavorites,
        Self::ArtistsFollowed,
        Self::AudiobookFavorites,
        Self::Categories,
        Self::CategoryPlaylists,
        Self::Devices,
        Self::EpisodeFavorites,
        Self::PlaylistFavorites,
        Self::RecentlyPlayed,
        Self::ShowFavorites,
        Self::TrackFavorites,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Self::AlbumFavorites => "album-favorites",
            Self::ArtistFavorites => "artist-favorites",
            Self::ArtistsFollowed => "artists-followed",
            Self::AudiobookFavorites => "audiobook-favorites",
            Self::Categories => "categories",
            Self::CategoryPlaylists => "category-playlists",
            Self::Devices => "devices",
            Self::EpisodeFavorites => "episode-favorites",
            Self::PlaylistFavorites => "playlist-favorites",
            Self::RecentlyPlayed => "recently-played",
            Self::ShowFavorites => "show-favorites",
            Self::TrackFavorites => "track-favorites",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }

    /// Backend service that returns this list.
    pub fn service(self) -> &'static str {
        match self {
            Self::AlbumFavorites => "get_album_favorites",
            Self::ArtistFavorites => "get_artist_favorites",
            Self::ArtistsFollowed => "get_artists_followed",
            Self::AudiobookFavorites => "get_audiobook_favorites",
            Self::Categories => "get_browse_categorys_list",
            Self::CategoryPlaylists => "get_category_playlists",
            Self::Devices => "get_spotify_connect_devices",
            Self::EpisodeFavorites => "get_episode_favorites",
            Self::PlaylistFavorites => "get_playlist_favorites",
            Self::RecentlyPlayed => "get_player_recent_tracks",
            Self::ShowFavorites => "get_show_favorites",
            Self::TrackFavorites => "get_track_favorites",
        }
    }

    /// Human label used in notices.
    pub fn label(self) -> &'static str {
        match self {
            Self::AlbumFavorites => "Album Favorites",
            Self::ArtistFavorites => "Artist Favorites",
            Self::ArtistsFollowed => "Followed Artists",
            Self::AudiobookFavorites => "Audiobook Favorites",
            Self::Categories => "Categories",
            Self::CategoryPlaylists => "Category Playlists",
            Self::Devices => "Devices",
            Self::EpisodeFavorites => "Episode Favorites",
            Self::PlaylistFavorites => "Playlist Favorites",
            Self::RecentlyPlayed => "Recently Played",
            Self::ShowFavorites => "Show Favorites",
            Self::TrackFavorites => "Track Favorites",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Fields every media-service object carries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaMeta {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A browsable item, tagged by the service's `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MediaItem {
    Album {
        #[serde(flatten)]
        meta: MediaMeta,
        #[serde(default)]
        artists: Vec<String>,
        #[serde(default)]
        release_date: Option<String>,
    },
    Artist {
        #[serde(flatten)]
        meta: MediaMeta,
        #[serde(default)]
        genres: Vec<String>,
    },
    Audiobook {
        #[serde(flatten)]
        meta: MediaMeta,
        #[serde(default)]
        authors: Vec<String>,
    },
    Category {
        #[serde(flatten)]
        meta: MediaMeta,
    },
    Chapter {
        #[serde(flatten)]
        meta: MediaMeta,
        #[serde(default)]
        audiobook: Option<String>,
    },
    Device {
        #[serde(flatten)]
        meta: MediaMeta,
        #[serde(default)]
        device_type: String,
        #[serde(default)]
        is_active: bool,
    },
    Episode {
        #[serde(flatten)]
        meta: MediaMeta,
        #[serde(default)]
        show: Option<String>,
        #[serde(default)]
        duration_ms: u64,
    },
    Playlist {
        #[serde(flatten)]
        meta: MediaMeta,
        #[serde(default)]
        owner: Option<String>,
        #[serde(default)]
        track_count: u32,
    },
    Show {
        #[serde(flatten)]
        meta: MediaMeta,
        #[serde(default)]
        publisher: Option<String>,
    },
    Track {
        #[serde(flatten)]
        meta: MediaMeta,
        #[serde(default)]
        artists: Vec<String>,
        #[serde(default)]
        album: Option<String>,
        #[serde(default)]
        duration_ms: u64,
    },
}

impl MediaItem {
    pub fn meta(&self) -> &MediaMeta {
        match self {
            Self::Album { meta, .. }
            | Self::Artist { meta, .. }
            | Self::Audiobook { meta, .. }
            | Self::Category { meta }
            | Self::Chapter { meta, .. }
            | Self::Device { meta, .. }
            | Self::Episode { meta, .. }
            | Self::Playlist { meta, .. }
            | Self::Show { meta, .. }
            | Self::Track { meta, .. } => meta,
        }
    }

    pub fn name(&self) -> &str {
        &self.meta().name
    }

    pub fn uri(&self) -> &str {
        &self.meta().uri
    }

    /// The type tag as the service spells it.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Album { .. } => "album",
            Self::Artist { .. } => "artist",
            Self::Audiobook { .. } => "audiobook",
            Self::Category { .. } => "category",
            Self::Chapter { .. } => "chapter",
            Self::Device { .. } => "device",
            Self::Episode { .. } => "episode",
            Self::Playlist { .. } => "playlist",
            Self::Show { .. } => "show",
            Self::Track { .. } => "track",
        }
    }

    /// Text shown for the item in a list row (title plus subtitle fields).
    /// Filtering matches against these.
    pub fn display_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name()];
        match self {
            Self::Album { artists, .. } | Self::Track { artists, .. } => {
                fields.extend(artists.iter().map(String::as_str));
                if let Self::Track {
                    album: Some(album), ..
                } = self
                {
                    fields.push(album);
                }
            }
            Self::Artist { genres, .. } => fields.extend(genres.iter().map(String::as_str)),
            Self::Audiobook { authors, .. } => fields.extend(authors.iter().map(String::as_str)),
            Self::Chapter { audiobook, .. } => fields.extend(audiobook.as_deref()),
            Self::Device { device_type, .. } => fields.push(device_type),
            Self::Episode { show, .. } => fields.extend(show.as_deref()),
            Self::Playlist { owner, .. } => fields.extend(owner.as_deref()),
            Self::Show { publisher, .. } => fields.extend(publisher.as_deref()),
            Self::Category { .. } => {}
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_tag_roundtrips_through_type_field() {
        let json = r#"{"type":"playlist","id":"p1","name":"Morning","uri":"spotify:playlist:p1","owner":"alice","track_count":12}"#;
        let item: MediaItem = serde_json::from_str(json).unwrap();
        match &item {
            MediaItem::Playlist {
                meta,
                owner,
                track_count,
            } => {
                assert_eq!(meta.name, "Morning");
                assert_eq!(owner.as_deref(), Some("alice"));
                assert_eq!(*track_count, 12);
            }
            other => panic!("unexpected variant: {:?}", other),
        }
        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["type"], "playlist");
    }

    #[test]
    fn test_display_fields_include_subtitles() {
        let item = MediaItem::Track {
            meta: MediaMeta {
                id: "t1".into(),
                name: "Windowlicker".into(),
                ..MediaMeta::default()
            },
            artists: vec!["Aphex Twin".into()],
            album: Some("Windowlicker EP".into()),
            duration_ms: 367_000,
        };
        assert_eq!(
            item.display_fields(),
            vec!["Windowlicker", "Aphex Twin", "Windowlicker EP"]
        );
    }

    #[test]
    fn test_list_kind_slugs_are_unique_and_parse_back() {
        for kind in ListKind::ALL {
            assert_eq!(ListKind::from_slug(kind.slug()), Some(kind));
        }
        assert_eq!(ListKind::from_slug("nope"), None);
    }
}
