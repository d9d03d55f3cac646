use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use crate::api::AppState;
use crate::api::fields::AverageView;
use crate::average::engine::Algorithm;
use crate::core::error::{Error, Result};

#[derive(Debug, Deserialize, Default)]
pub struct AverageParams {
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub algorithm: Option<String>,
}

fn parse_level(raw: Option<&str>) -> Result<Option<i64>> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| Error::validation(format!("level must be an integer, got '{}'", s)))
        })
        .transpose()
}

pub async fn average_difficulty(
    State(state): State<AppState>,
    Query(params): Query<AverageParams>,
) -> Result<Json<AverageView>> {
    let level = parse_level(params.level.as_deref())?;
    let algorithm = Algorithm::parse(params.algorithm.as_deref());
    let average = state.averages.average(level, algorithm)?;
    Ok(Json(AverageView::from(average)))
}
