//! HTTP surface over the video list.

pub mod common;
pub mod videos;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::system::create_system_router;
use crate::InnerState;

#[tracing::instrument(name = "create_api_router", skip(state))]
pub fn create_router(state: InnerState) -> Router {
    tracing::info!("Creating API router");

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(common::tracing::make_request_span)
        .on_request(common::tracing::on_request)
        .on_response(common::tracing::on_response)
        .on_failure(common::tracing::on_failure);

    Router::new()
        .merge(create_system_router())
        .route("/videos", get(videos::list_videos))
        .route("/videos/long", post(videos::submit_long_video))
        .route("/videos/short", post(videos::submit_short_video))
        .route("/videos/by-date", get(videos::videos_by_date))
        .route("/videos/by-channel", get(videos::videos_by_channel))
        .layer(CorsLayer::permissive())
        .layer(trace_layer)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::videos::record::{Category, NewVideo};
    use crate::videos::store::memory::MemoryVideoStore;
    use crate::videos::store::VideoStore;
    use crate::videos::submission::tests::{FakeFetcher, LONG_LINK, SHARE_LINK};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(store: Arc<MemoryVideoStore>, fetcher: FakeFetcher) -> Router {
        create_router(InnerState {
            store,
            fetcher: Arc::new(fetcher),
            token_key: None,
        })
    }

    fn form_post(uri: &str, link: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("link={}", encode(link))))
            .unwrap()
    }

    fn encode(value: &str) -> String {
        url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_check_responds() {
        let response = app(Arc::new(MemoryVideoStore::new()), FakeFetcher::default())
            .oneshot(get_request("/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn invalid_link_is_bad_request() {
        let store = Arc::new(MemoryVideoStore::new());
        let response = app(store.clone(), FakeFetcher::default())
            .oneshot(form_post("/videos/long", "https://vimeo.com/12345678901234"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Invalid Youtube video link. Enter a valid one.");
        assert_eq!(body["status"], 400);
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn trailing_whitespace_counts_toward_link_length() {
        let store = Arc::new(MemoryVideoStore::new());
        let fetcher = FakeFetcher::default().with_video("dQw4w9WgXcQ", "Rick Astley", 213);
        let longest = format!("https://youtu.be/dQw4w9WgXcQ?si={}", "a".repeat(32));
        assert_eq!(longest.chars().count(), 64);

        let response = app(store.clone(), fetcher)
            .oneshot(form_post("/videos/short", &format!("{} ", longest)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn long_submission_is_created() {
        let store = Arc::new(MemoryVideoStore::new());
        let fetcher = FakeFetcher::default().with_video("dQw4w9WgXcQ", "Rick Astley", 10_000);

        let response = app(store.clone(), fetcher)
            .oneshot(form_post("/videos/long", LONG_LINK))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["video"]["videoId"], "dQw4w9WgXcQ");
        assert_eq!(body["video"]["category"], "long");
        assert_eq!(body["video"]["durationHuman"], "2h 46m 40s");
        assert!(body.get("channelStats").is_none());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_submission_is_conflict() {
        let store = Arc::new(MemoryVideoStore::new());
        let existing = NewVideo::new(
            LONG_LINK.to_string(),
            "dQw4w9WgXcQ".to_string(),
            "Rick Astley".to_string(),
            "Never Gonna Give You Up".to_string(),
            None,
            Category::Short,
            213,
            None,
        )
        .unwrap();
        store.insert(existing).await.unwrap();

        let fetcher = FakeFetcher::default().with_video("dQw4w9WgXcQ", "Rick Astley", 213);
        let response = app(store.clone(), fetcher)
            .oneshot(form_post("/videos/short", SHARE_LINK))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn short_submission_reports_channel_stats() {
        let store = Arc::new(MemoryVideoStore::new());
        let fetcher = FakeFetcher::default().with_video("dQw4w9WgXcQ", "Rick Astley", 213);

        let response = app(store, fetcher)
            .oneshot(form_post("/videos/short", SHARE_LINK))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["channelStats"]["videoCount"], 1);
        assert_eq!(body["channelStats"]["totalDurationHuman"], "3m 33s");
    }

    #[tokio::test]
    async fn by_channel_listing_on_empty_store_is_empty() {
        let response = app(Arc::new(MemoryVideoStore::new()), FakeFetcher::default())
            .oneshot(get_request("/videos/by-channel"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["empty"], true);
        assert_eq!(body["groups"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn listings_split_by_category() {
        let store = Arc::new(MemoryVideoStore::new());
        let fetcher = FakeFetcher::default().with_video("dQw4w9WgXcQ", "Rick Astley", 9_000);
        let router = app(store.clone(), fetcher);

        let response = router
            .clone()
            .oneshot(form_post("/videos/long", LONG_LINK))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = router
            .clone()
            .oneshot(get_request("/videos/by-date"))
            .await
            .unwrap();
        let by_date = json_body(response).await;
        assert_eq!(by_date["empty"], false);
        assert_eq!(by_date["groups"][0]["videos"][0]["videoId"], "dQw4w9WgXcQ");

        let response = router
            .clone()
            .oneshot(get_request("/videos/by-channel"))
            .await
            .unwrap();
        let by_channel = json_body(response).await;
        assert_eq!(by_channel["empty"], true);

        let all = json_body(router.oneshot(get_request("/videos")).await.unwrap()).await;
        assert_eq!(all["totalDurationHuman"], "2h 30m");
        assert_eq!(all["videos"].as_array().unwrap().len(), 1);
    }
}
