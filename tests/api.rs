mod common;

use std::sync::Arc;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;
use anthology::api::{AppState, router};
use anthology::core::config::Config;
use anthology::storage::aggregates::LevelTotals;

fn app(text_index: bool) -> Router {
    let state = AppState::new(
        &Config::in_memory(),
        common::catalog(text_index),
        Arc::new(LevelTotals::in_memory()),
    );
    router(state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn post_rating(app: &Router, id: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(format!("/songs/rating/{}", id))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn listing_uses_the_default_page_size_and_schema() {
    let app = app(true);
    let (status, body) = get(&app, "/songs").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 10);
    assert_eq!(body["next"], json!("/songs?previous_id=000000000000000a&limit=10"));
    assert_eq!(
        body["data"][0],
        json!({
            "id": "0000000000000001",
            "artist": "The Yousicians",
            "title": "Lycanthropic Metamorphosis",
            "difficulty": 14.6,
            "level": "13",
            "released": "2016-10-26",
            "rating": null,
            "rating_url": "/songs/rating/0000000000000001"
        })
    );
}

#[tokio::test]
async fn following_next_links_reaches_the_end() {
    let app = app(true);
    let mut uri = "/songs?limit=4".to_string();
    let mut seen = 0;

    for _ in 0..10 {
        let (status, body) = get(&app, &uri).await;
        assert_eq!(status, StatusCode::OK);
        seen += body["data"].as_array().unwrap().len();
        match body["next"].as_str() {
            Some(next) => uri = next.to_string(),
            None => {
                assert_eq!(seen, 14);
                return;
            }
        }
    }
    panic!("next links never ran out");
}

#[tokio::test]
async fn search_route_links_back_to_itself_with_filters() {
    let app = app(true);
    let (status, body) = get(&app, "/songs/search?message=waki&limit=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["title"], json!("Awaki-Waki"));
    assert_eq!(
        body["next"],
        json!("/songs/search?previous_id=000000000000000b&limit=1&message=waki")
    );

    let (_, body) = get(&app, "/songs/search?word=waki").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn bad_listing_parameters_are_client_errors() {
    let app = app(true);

    for uri in ["/songs?limit=-1", "/songs?limit=lots", "/songs?previous_id=abc"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["message"].is_string());
    }

    let (status, body) = get(&app, "/songs?limit=500").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 14);
}

#[tokio::test]
async fn word_search_without_text_index_is_rejected() {
    let (status, body) = get(&app(false), "/songs/search?word=the").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("text index"));
}

#[tokio::test]
async fn average_endpoint_rounds_and_reports_empty_as_object() {
    let app = app(true);

    let (status, body) = get(&app, "/songs/avg?level=13").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"average_difficulty": 14.1, "level": 13, "algorithm": "trivial"}));

    let (_, body) = get(&app, "/songs/avg?level=999").await;
    assert_eq!(body, json!({}));

    // Nothing aggregated yet
    let (_, body) = get(&app, "/songs/avg?algorithm=fun").await;
    assert_eq!(body, json!({}));

    let (_, body) = get(&app, "/songs/avg?algorithm=bogus").await;
    assert_eq!(body["algorithm"], json!("trivial"));
    assert_eq!(body["level"], Value::Null);

    let (status, _) = get(&app, "/songs/avg?level=high").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ratings_are_validated_stored_and_listed() {
    let app = app(true);
    let id = common::token(3);

    for bad in ["rating=0", "rating=6", "rating=x"] {
        let (status, body) = post_rating(&app, &id, bad).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("between 1 and 5"), "{}", body);
    }

    let (status, body) = post_rating(&app, &id, "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("rating is required"));

    let (status, body) = post_rating(&app, &id, "rating=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": id, "rating": 3}));

    let (_, body) = get(&app, &format!("/songs/rating/{}", id)).await;
    assert_eq!(body, json!({"id": id, "rating": 3}));

    let (_, body) = get(&app, "/songs?limit=3").await;
    assert_eq!(body["data"][2]["rating"], json!(3));
    assert_eq!(body["data"][1]["rating"], Value::Null);
}

#[tokio::test]
async fn unknown_songs_are_not_found() {
    let app = app(true);
    let missing = common::token(999);

    let (status, body) = get(&app, &format!("/songs/rating/{}", missing)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains(&missing));

    let (status, _) = post_rating(&app, &missing, "rating=4").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
