use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;

use whatsyourmovie_api::{
    db::MemoryStore,
    models::{GenreSet, LimitPolicy, Movie},
    routes::{create_router, AppState},
};

const SAMPLE_MOVIES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/sample_movies.json");

fn movie(id: i64, title: &str, genres: &str, rating: f64, popularity: f64) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        year: Some(2000),
        genres: GenreSet::from_delimited(genres),
        poster: None,
        description: None,
        rating: Some(rating),
        popularity: Some(popularity),
        vote_count: 10,
    }
}

fn create_test_server(store: MemoryStore) -> TestServer {
    let state = AppState::new(Arc::new(store), LimitPolicy::new(20, 100))
        .with_sample_movies_path(SAMPLE_MOVIES);
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

/// Ten Drama movies (ids 1..=10), two Action (11, 12) and two Comedy (13, 14)
fn seeded_store() -> MemoryStore {
    let mut movies: Vec<Movie> = (1..=10)
        .map(|id| movie(id, &format!("Drama {}", id), "18", 7.0, id as f64))
        .collect();
    movies.push(movie(11, "Action One", "28", 6.0, 30.0));
    movies.push(movie(12, "Action Two", "28", 6.0, 20.0));
    movies.push(movie(13, "Comedy One", "35", 6.0, 90.0));
    movies.push(movie(14, "Comedy Two", "35", 6.0, 80.0));
    MemoryStore::with_movies(movies)
}

fn movie_ids(body: &Value) -> Vec<i64> {
    body["movies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(MemoryStore::new());
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_cold_start_recommendations() {
    let server = create_test_server(seeded_store());

    let response = server
        .get("/api/v1/users/1/recommendations")
        .add_query_param("limit", "3")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["algorithm"], "popular");
    assert!(body.get("genre_preferences").is_none());
    assert_eq!(movie_ids(&body), vec![13, 14, 11]);
}

#[tokio::test]
async fn test_invalid_limit_falls_back_to_default() {
    let server = create_test_server(seeded_store());

    for raw in ["abc", "0", "-5"] {
        let response = server
            .get("/api/v1/users/1/recommendations")
            .add_query_param("limit", raw)
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(movie_ids(&body).len(), 14, "limit {}", raw);
    }
}

#[tokio::test]
async fn test_personalized_flow() {
    let server = create_test_server(seeded_store());

    server
        .put("/api/v1/users/7/top10")
        .json(&json!({ "movies": (1..=10).collect::<Vec<i64>>() }))
        .await
        .assert_status_ok();

    let status: Value = server.get("/api/v1/users/7/top10/status").await.json();
    assert_eq!(status["has_top10"], true);

    server
        .post("/api/v1/users/7/swipes")
        .json(&json!({ "movie_id": 11, "action": "like" }))
        .await
        .assert_status_ok();
    server
        .post("/api/v1/users/7/swipes")
        .json(&json!({ "movie_id": 13, "action": "dislike" }))
        .await
        .assert_status_ok();

    let response = server.get("/api/v1/users/7/recommendations").await;
    response.assert_status_ok();
    let body: Value = response.json();

    assert_eq!(body["algorithm"], "personalized");
    // Action 12 gets the liked-genre boost, Comedy 14 does not
    assert_eq!(movie_ids(&body), vec![12, 14]);
    assert!(body["movies"][0]["recommendation_score"].as_f64().unwrap() > 0.0);

    let genres = body["genre_preferences"].as_array().unwrap();
    assert_eq!(genres[0]["genre"], "Drama");
    assert_eq!(genres[0]["score"], 20);
    assert_eq!(genres[1]["genre"], "Action");
    assert_eq!(genres[1]["score"], 1);
}

#[tokio::test]
async fn test_recommendations_never_include_swiped_or_top_ten() {
    let server = create_test_server(seeded_store());

    server
        .put("/api/v1/users/3/top10")
        .json(&json!({ "movies": [14, 13, 12, 1, 2, 3, 4, 5, 6, 7] }))
        .await
        .assert_status_ok();
    server
        .post("/api/v1/users/3/swipes")
        .json(&json!({ "movie_id": 8, "action": "dislike" }))
        .await
        .assert_status_ok();

    let body: Value = server
        .get("/api/v1/users/3/recommendations")
        .add_query_param("limit", "50")
        .await
        .json();

    let returned: HashSet<i64> = movie_ids(&body).into_iter().collect();
    assert_eq!(returned, HashSet::from([9, 10, 11]));
}

#[tokio::test]
async fn test_top_ten_validation() {
    let server = create_test_server(seeded_store());

    let response = server
        .put("/api/v1/users/7/top10")
        .json(&json!({ "movies": [1, 2, 3] }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Must provide exactly 10 movies");

    server
        .put("/api/v1/users/7/top10")
        .json(&json!({ "movies": [1, 2, 3, 4, 5, 6, 7, 8, 9, 99] }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let status: Value = server.get("/api/v1/users/7/top10/status").await.json();
    assert_eq!(status["has_top10"], false);
}

#[tokio::test]
async fn test_top_ten_returned_in_rank_order() {
    let server = create_test_server(seeded_store());
    let order: Vec<i64> = vec![5, 3, 1, 2, 4, 6, 8, 7, 10, 9];

    server
        .put("/api/v1/users/2/top10")
        .json(&json!({ "movies": order }))
        .await
        .assert_status_ok();

    let top_ten: Vec<Value> = server.get("/api/v1/users/2/top10").await.json();
    let ids: Vec<i64> = top_ten.iter().map(|m| m["id"].as_i64().unwrap()).collect();
    let ranks: Vec<i64> = top_ten.iter().map(|m| m["rank"].as_i64().unwrap()).collect();
    assert_eq!(ids, order);
    assert_eq!(ranks, (1..=10).collect::<Vec<i64>>());
}

#[tokio::test]
async fn test_swipe_history_and_stats() {
    let server = create_test_server(seeded_store());

    for (movie_id, action) in [(1, "like"), (2, "dislike"), (1, "dislike")] {
        server
            .post("/api/v1/users/4/swipes")
            .json(&json!({ "movie_id": movie_id, "action": action }))
            .await
            .assert_status_ok();
    }

    let stats: Value = server.get("/api/v1/users/4/swipes/stats").await.json();
    assert_eq!(stats, json!({ "total": 2, "likes": 0, "dislikes": 2 }));

    let history: Vec<Value> = server.get("/api/v1/users/4/swipes/history").await.json();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["id"], 1);
    assert_eq!(history[0]["action"], "dislike");
}

#[tokio::test]
async fn test_swipe_rejects_unknown_movie_and_action() {
    let server = create_test_server(seeded_store());

    server
        .post("/api/v1/users/4/swipes")
        .json(&json!({ "movie_id": 999, "action": "like" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = server
        .post("/api/v1/users/4/swipes")
        .json(&json!({ "movie_id": 1, "action": "superlike" }))
        .await;
    assert!(response.status_code().is_client_error());
}

#[tokio::test]
async fn test_movie_search_and_listing() {
    let server = create_test_server(seeded_store());

    let results: Vec<Value> = server
        .get("/api/v1/movies/search")
        .add_query_param("q", "comedy")
        .await
        .json();
    let ids: Vec<i64> = results.iter().map(|m| m["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![13, 14]);

    server
        .get("/api/v1/movies/search")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let page: Value = server
        .get("/api/v1/movies")
        .add_query_param("page", "2")
        .add_query_param("limit", "5")
        .await
        .json();
    assert_eq!(page["pagination"], json!({ "page": 2, "limit": 5, "total": 14, "pages": 3 }));
    assert_eq!(page["movies"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_swipe_deck_excludes_swiped() {
    let server = create_test_server(seeded_store());

    server
        .post("/api/v1/users/5/swipes")
        .json(&json!({ "movie_id": 13, "action": "like" }))
        .await
        .assert_status_ok();

    let deck: Vec<Value> = server.get("/api/v1/users/5/movies/random").await.json();
    assert_eq!(deck.len(), 13);
    assert!(deck.iter().all(|m| m["id"] != 13));
}

#[tokio::test]
async fn test_sample_import_then_recommend() {
    let server = create_test_server(MemoryStore::new());

    let summary: Value = server.post("/api/v1/catalogue/import/sample").await.json();
    assert_eq!(summary["count"], 15);

    let again: Value = server.post("/api/v1/catalogue/import/sample").await.json();
    assert_eq!(again["message"], "Movies already populated");

    let body: Value = server.get("/api/v1/users/1/recommendations").await.json();
    assert_eq!(body["algorithm"], "popular");
    assert_eq!(movie_ids(&body)[0], 19995);
}

#[tokio::test]
async fn test_tmdb_import_requires_api_key() {
    let server = create_test_server(MemoryStore::new());
    server
        .post("/api/v1/catalogue/import/tmdb")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
