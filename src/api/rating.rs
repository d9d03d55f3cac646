use std::collections::HashMap;
use axum::{
    Form, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::info;
use crate::api::AppState;
use crate::api::fields::RatingView;
use crate::core::error::{Error, Result};
use crate::core::types::{fields, FieldValue, Song, SongId};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

#[derive(Debug, Deserialize, Default)]
pub struct RatingForm {
    #[serde(default)]
    pub rating: Option<String>,
}

/// Ratings are whole numbers from 1 to 5.
pub fn parse_rating(raw: Option<&str>) -> Result<u8> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::validation("rating is required"))?;

    match raw.parse::<i64>() {
        Ok(rating) if (MIN_RATING..=MAX_RATING).contains(&rating) => Ok(rating as u8),
        _ => Err(Error::validation(format!(
            "Expected rating between {} and {}, but got {}",
            MIN_RATING, MAX_RATING, raw
        ))),
    }
}

pub async fn get_rating(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RatingView>> {
    let id: SongId = id.parse()?;
    let doc = state.songs.find_one(id)?
        .ok_or_else(|| Error::not_found(format!("song {} not found", id)))?;
    let song = Song::from_document(&doc)?;

    Ok(Json(RatingView {
        id: id.to_string(),
        rating: song.rating,
    }))
}

pub async fn post_rating(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<RatingForm>,
) -> Result<Json<RatingView>> {
    let id: SongId = id.parse()?;
    let rating = parse_rating(form.rating.as_deref())?;

    let update = HashMap::from([(fields::RATING.to_string(), FieldValue::Integer(i64::from(rating)))]);
    if !state.songs.update_fields(id, update)? {
        return Err(Error::not_found(format!("song {} not found", id)));
    }
    info!(%id, rating, "rated song");

    Ok(Json(RatingView {
        id: id.to_string(),
        rating: Some(rating),
    }))
}
