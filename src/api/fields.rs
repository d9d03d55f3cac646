use serde::Serialize;
use crate::average::engine::{Algorithm, AverageDifficulty};
use crate::core::types::{Song, SongId};

/// Public shape of a song. Field order is the wire order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongView {
    pub id: String,
    pub artist: String,
    pub title: String,
    pub difficulty: f64,
    pub level: String,
    pub released: String,
    pub rating: Option<u8>,
    pub rating_url: String,
}

impl From<Song> for SongView {
    fn from(song: Song) -> Self {
        SongView {
            id: song.id.to_string(),
            rating_url: rating_url(song.id),
            artist: song.artist,
            title: song.title,
            difficulty: song.difficulty,
            level: song.level.to_string(),
            released: song.released,
            rating: song.rating,
        }
    }
}

pub fn rating_url(id: SongId) -> String {
    format!("/songs/rating/{}", id)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongList {
    pub data: Vec<SongView>,
    pub next: Option<String>,
}

/// Average difficulty, or `{}` when nothing was averaged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AverageView {
    Found {
        average_difficulty: f64,
        level: Option<i64>,
        algorithm: Algorithm,
    },
    Empty {},
}

impl From<Option<AverageDifficulty>> for AverageView {
    fn from(average: Option<AverageDifficulty>) -> Self {
        match average {
            Some(average) => AverageView::Found {
                average_difficulty: round2(average.average_difficulty),
                level: average.level,
                algorithm: average.algorithm,
            },
            None => AverageView::Empty {},
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingView {
    pub id: String,
    pub rating: Option<u8>,
}
