use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use serde_json::json;
use tower::ServiceExt; // for `oneshot`
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vidbundle::api::models::HealthResponse;
use vidbundle::api::router;
use vidbundle::api::state::AppState;
use vidbundle::config::{Config, Secret};
use vidbundle::pipeline::Pipeline;

const ACCESS_KEY: &str = "letmein";
const FORM: &str = "application/x-www-form-urlencoded";

fn test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api.endpoint = format!("{}/api/videos/", server.uri());
    config.api.api_key = Some(Secret::new("test-key"));
    config.auth.access_key = Some(Secret::new(ACCESS_KEY));
    config
}

/// Builds the router against a mock video API
fn build_test_app(server: &MockServer) -> (Router, AppState) {
    let config = test_config(server);
    let pipeline = Pipeline::from_config(&config).expect("pipeline");
    let state = AppState::new(config, pipeline).expect("state");

    (router(state.clone()), state)
}

async fn body_string(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, FORM);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Logs in and returns the `name=value` cookie pair
async fn login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(post_form("/login", &format!("access_key={ACCESS_KEY}"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .unwrap();
    assert!(set_cookie.contains("HttpOnly"));

    set_cookie.split(';').next().unwrap().to_string()
}

async fn mount_single_hit(server: &MockServer) {
    let body = json!({
        "total": 1,
        "totalHits": 1,
        "hits": [{
            "id": 42,
            "duration": 20,
            "videos": {
                "medium": { "url": format!("{}/videos/42.mp4", server.uri()) }
            }
        }]
    });

    Mock::given(method("GET"))
        .and(path("/api/videos/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/videos/42.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"video-42".to_vec()))
        .mount(server)
        .await;
}

fn archive_link(page: &str) -> String {
    let start = page.find("/runs/").expect("archive link");
    let end = page[start..].find('"').expect("link end") + start;
    page[start..end].to_string()
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start().await;
    let (app, _) = build_test_app(&server);

    let response = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health: HealthResponse = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.runs.runs_started, 0);
}

#[tokio::test]
async fn test_index_shows_login_without_session() {
    let server = MockServer::start().await;
    let (app, _) = build_test_app(&server);

    let response = app.oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let page = body_string(response).await;
    assert!(page.contains("name=\"access_key\""));
    assert!(!page.contains("name=\"keyword\""));
}

#[tokio::test]
async fn test_wrong_access_key_is_rejected() {
    let server = MockServer::start().await;
    let (app, _) = build_test_app(&server);

    let response = app
        .oneshot(post_form("/login", "access_key=wrong", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(body_string(response).await.contains("Invalid access key"));
}

#[tokio::test]
async fn test_access_key_is_compared_exactly() {
    let server = MockServer::start().await;
    let (app, _) = build_test_app(&server);

    for submitted in ["%20letmein", "letmein%20", "LETMEIN"] {
        let response = app
            .clone()
            .oneshot(post_form("/login", &format!("access_key={submitted}"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{submitted}");
    }
}

#[tokio::test]
async fn test_access_key_with_surrounding_spaces_can_log_in() {
    let server = MockServer::start().await;
    let mut config = test_config(&server);
    config.auth.access_key = Some(Secret::new(" padded key "));
    let pipeline = Pipeline::from_config(&config).unwrap();
    let app = router(AppState::new(config, pipeline).unwrap());

    let response = app
        .oneshot(post_form("/login", "access_key=%20padded%20key%20", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(response.headers().get(header::SET_COOKIE).is_some());
}

#[tokio::test]
async fn test_login_shows_search_form() {
    let server = MockServer::start().await;
    let (app, _) = build_test_app(&server);

    let cookie = login(&app).await;
    let response = app.oneshot(get("/", Some(&cookie))).await.unwrap();

    let page = body_string(response).await;
    assert!(page.contains("name=\"keyword\""));
    assert!(page.contains("value=\"nature\""));
}

#[tokio::test]
async fn test_runs_require_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let (app, _) = build_test_app(&server);

    let form = "keyword=cats&min_duration=10&max_duration=30&quality=medium&count=1";
    let response = app
        .clone()
        .oneshot(post_form("/runs", form, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(post_form("/runs", form, Some("vidbundle_session=forged")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_form_makes_no_network_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let (app, state) = build_test_app(&server);
    let cookie = login(&app).await;

    let response = app
        .oneshot(post_form(
            "/runs",
            "keyword=cats&min_duration=30&max_duration=10&quality=medium&count=5",
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains("must be less than maximum duration"));
    assert_eq!(state.metrics.snapshot().runs_started, 0);
}

#[tokio::test]
async fn test_archive_downloads_exactly_once() {
    let server = MockServer::start().await;
    mount_single_hit(&server).await;
    let (app, state) = build_test_app(&server);
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(post_form(
            "/runs",
            "keyword=cats&min_duration=10&max_duration=30&quality=medium&count=1",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let page = body_string(response).await;
    assert!(page.contains("pixabay_video_42.mp4"));
    let link = archive_link(&page);

    let response = app.clone().oneshot(get(&link, Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/zip"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"pixabay_videos.zip\""
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.starts_with(b"PK"));

    let response = app.oneshot(get(&link, Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let metrics = state.metrics.snapshot();
    assert_eq!(metrics.runs_started, 1);
    assert_eq!(metrics.runs_ready, 1);
    assert_eq!(metrics.videos_archived, 1);
    assert_eq!(metrics.archives_delivered, 1);
}

#[tokio::test]
async fn test_archive_is_private_to_its_session() {
    let server = MockServer::start().await;
    mount_single_hit(&server).await;
    let (app, _) = build_test_app(&server);
    let owner = login(&app).await;
    let other = login(&app).await;

    let response = app
        .clone()
        .oneshot(post_form(
            "/runs",
            "keyword=cats&min_duration=10&max_duration=30&quality=medium&count=1",
            Some(&owner),
        ))
        .await
        .unwrap();
    let link = archive_link(&body_string(response).await);

    let response = app.clone().oneshot(get(&link, Some(&other))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get(&link, Some(&owner))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_search_failure_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/videos/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let (app, state) = build_test_app(&server);
    let cookie = login(&app).await;

    let response = app
        .oneshot(post_form(
            "/runs",
            "keyword=cats&min_duration=10&max_duration=30&quality=medium&count=1",
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let page = body_string(response).await;
    assert!(page.contains("HTTP 500"));
    assert!(!page.contains("test-key"));
    assert_eq!(state.metrics.snapshot().runs_failed, 1);
}

#[tokio::test]
async fn test_no_results_page_has_no_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/videos/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "total": 0, "totalHits": 0, "hits": [] })),
        )
        .mount(&server)
        .await;
    let (app, _) = build_test_app(&server);
    let cookie = login(&app).await;

    let response = app
        .oneshot(post_form(
            "/runs",
            "keyword=zzzz&min_duration=10&max_duration=30&quality=medium&count=1",
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_string(response).await;
    assert!(page.contains("No videos found matching your criteria."));
    assert!(!page.contains("/archive"));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let server = MockServer::start().await;
    let (app, _) = build_test_app(&server);
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(post_form("/logout", "", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app
        .oneshot(post_form("/runs", "count=1", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_state_requires_access_key() {
    let server = MockServer::start().await;
    let mut config = test_config(&server);
    config.auth.access_key = None;
    let pipeline = Pipeline::from_config(&config).unwrap();

    assert!(AppState::new(config, pipeline).is_err());
}
