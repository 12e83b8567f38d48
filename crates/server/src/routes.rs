//! Router, handlers and the API-key gate.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use senti_core::api::{
    HealthResponse, PredictRequest, PredictResponse, RootResponse, API_KEY_HEADER,
    STATUS_HEALTHY,
};
use senti_core::{redact, Config};
use senti_ml::Classifier;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::error::ApiError;

/// Shared, read-only request state.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    classifier: Arc<dyn Classifier>,
}

impl AppState {
    #[must_use]
    pub fn new(config: Arc<Config>, classifier: Arc<dyn Classifier>) -> Self {
        Self { config, classifier }
    }
}

/// `GET /`, `GET /health`, and the key-gated `POST /predict`.
pub fn router(state: AppState) -> Router {
    let predict = Router::new()
        .route("/predict", post(predict))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(predict)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        status: STATUS_HEALTHY.to_string(),
        environment: state.config.environment.clone(),
        model: state.config.model_name.clone(),
    })
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: STATUS_HEALTHY.to_string(),
        environment: state.config.environment.clone(),
        model: state.config.model_name.clone(),
        api_key_configured: state.config.api_key.is_configured(),
    })
}

/// Runs before the body is read, so unauthorized callers never reach the model.
async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req.headers().get(API_KEY_HEADER);
    if header.is_some_and(|v| state.config.api_key.matches(v.as_bytes())) {
        return Ok(next.run(req).await);
    }

    if state.config.debug {
        let attempt = header.map_or_else(
            || "<missing>".to_string(),
            |v| redact::secret_preview(&String::from_utf8_lossy(v.as_bytes())),
        );
        warn!(key = %attempt, "invalid API key attempt");
    }
    Err(ApiError::Unauthorized)
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        debug!(status = %rejection.status(), "request body rejected");
        ApiError::from(rejection)
    })?;
    let classifier = Arc::clone(&state.classifier);
    let max_length = state.config.max_length;
    let text = req.text;
    debug!(text_len = text.len(), "handling prediction");

    let (text, result) = tokio::task::spawn_blocking(move || {
        let result = classifier.classify(&text, max_length);
        (text, result)
    })
    .await
    .map_err(|e| {
        error!(%e, "prediction task failed");
        ApiError::Prediction(e.to_string())
    })?;

    let probs = result.map_err(|e| {
        error!(error = %format!("{e:#}"), "prediction failed");
        ApiError::Prediction(format!("{e:#}"))
    })?;

    if state.config.debug {
        info!(text = %redact::text_preview(&text), "prediction made");
    }
    Ok(Json(PredictResponse::new(probs, &text)))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::body::Body;
    use axum::http::{header, Method, StatusCode};
    use http_body_util::BodyExt;
    use senti_core::{Probabilities, Result};
    use tower::ServiceExt;

    use super::*;

    const KEY: &str = "Test-Key-0123456789";

    /// Deterministic stand-in: more `!` means more positive.
    #[derive(Default)]
    struct FakeClassifier {
        calls: AtomicUsize,
    }

    impl Classifier for FakeClassifier {
        fn classify(&self, text: &str, _max_length: usize) -> Result<Probabilities> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let bangs = text.matches('!').count() as f32;
            Ok(Probabilities::from_logits(&[0.5, bangs])?)
        }
    }

    struct FailingClassifier;

    impl Classifier for FailingClassifier {
        fn classify(&self, _: &str, _: usize) -> Result<Probabilities> {
            Err(eyre::eyre!("tensor shape mismatch"))
        }
    }

    struct PanickingClassifier;

    impl Classifier for PanickingClassifier {
        fn classify(&self, _: &str, _: usize) -> Result<Probabilities> {
            panic!("backend exploded")
        }
    }

    fn app_with(classifier: Arc<dyn Classifier>) -> Router {
        let mut config = Config::with_api_key(KEY);
        config.environment = "test".to_string();
        router(AppState::new(Arc::new(config), classifier))
    }

    fn predict_request(key: Option<&str>, body: &str) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/predict")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(key) = key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn json_body(resp: Response) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn text_body(text: &str) -> String {
        serde_json::json!({ "text": text }).to_string()
    }

    #[tokio::test]
    async fn root_reports_environment_and_model() {
        let app = app_with(Arc::new(FakeClassifier::default()));
        let req = axum::http::Request::builder()
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            json_body(resp).await,
            serde_json::json!({
                "status": "healthy",
                "environment": "test",
                "model": senti_core::config::DEFAULT_MODEL,
            })
        );
    }

    #[tokio::test]
    async fn health_reports_key_configured_without_value() {
        let app = app_with(Arc::new(FakeClassifier::default()));
        let req = axum::http::Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["api_key_configured"], true);
        assert_eq!(body["status"], "healthy");
        assert!(!body.to_string().contains(KEY));
    }

    #[tokio::test]
    async fn predict_with_valid_key() {
        let fake = Arc::new(FakeClassifier::default());
        let app = app_with(fake.clone());
        let text = "Bugün hava çok güzel, kendimi harika hissediyorum!";

        let resp = app.oneshot(predict_request(Some(KEY), &text_body(text))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body: PredictResponse = serde_json::from_value(json_body(resp).await).unwrap();
        assert!(body.positive > body.negative);
        assert!((body.positive + body.negative - 1.0).abs() < 1e-6);
        assert_eq!(body.text_length, text.chars().count());
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn wrong_key_is_unauthorized_and_skips_model() {
        let fake = Arc::new(FakeClassifier::default());
        let app = app_with(fake.clone());

        let resp = app
            .oneshot(predict_request(Some("wrong"), &text_body("hello")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(resp).await;
        assert_eq!(body, serde_json::json!({ "detail": "Unauthorized" }));
        assert!(body.get("positive").is_none());
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn key_comparison_is_case_sensitive() {
        let fake = Arc::new(FakeClassifier::default());
        let app = app_with(fake.clone());
        let resp = app
            .oneshot(predict_request(Some(&KEY.to_lowercase()), &text_body("hi")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_key_is_unauthorized() {
        let fake = Arc::new(FakeClassifier::default());
        let app = app_with(fake.clone());
        let resp = app
            .oneshot(predict_request(None, &text_body("hello")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn auth_checked_before_body() {
        let app = app_with(Arc::new(FakeClassifier::default()));
        let resp = app
            .oneshot(predict_request(Some("wrong"), "{not json"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_text_field_is_unprocessable_with_detail() {
        let fake = Arc::new(FakeClassifier::default());
        let app = app_with(fake.clone());
        let resp = app
            .oneshot(predict_request(Some(KEY), "{\"txt\": 1}"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let detail = json_body(resp).await["detail"].as_str().unwrap().to_string();
        assert!(detail.contains("text"), "got {detail:?}");
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn broken_json_is_bad_request_with_detail() {
        let fake = Arc::new(FakeClassifier::default());
        let app = app_with(fake.clone());
        let resp = app
            .oneshot(predict_request(Some(KEY), "{not json"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(resp).await["detail"].is_string());
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn debug_mode_leaves_responses_unchanged() {
        let fake = Arc::new(FakeClassifier::default());
        let mut config = Config::with_api_key(KEY);
        config.debug = true;
        let app = router(AppState::new(Arc::new(config), fake.clone()));

        let resp = app
            .clone()
            .oneshot(predict_request(Some("wrong-key"), &text_body("hello")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(resp).await,
            serde_json::json!({ "detail": "Unauthorized" })
        );

        let resp = app
            .clone()
            .oneshot(predict_request(None, &text_body("hello")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);

        let text = "Bugün hava çok güzel, kendimi harika hissediyorum! ".repeat(3);
        let resp = app
            .oneshot(predict_request(Some(KEY), &text_body(&text)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: PredictResponse = serde_json::from_value(json_body(resp).await).unwrap();
        assert_eq!(body.text_length, text.chars().count());
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn classifier_error_is_prediction_error() {
        let app = app_with(Arc::new(FailingClassifier));
        let resp = app
            .oneshot(predict_request(Some(KEY), &text_body("hello")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(resp).await["detail"],
            "Prediction error: tensor shape mismatch"
        );
    }

    #[tokio::test]
    async fn classifier_panic_does_not_take_down_service() {
        let app = app_with(Arc::new(PanickingClassifier));
        let resp = app
            .clone()
            .oneshot(predict_request(Some(KEY), &text_body("hello")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = json_body(resp).await["detail"].as_str().unwrap().to_string();
        assert!(detail.starts_with("Prediction error: "));

        let req = axum::http::Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        assert_eq!(app.oneshot(req).await.unwrap().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn empty_text_is_accepted() {
        let fake = Arc::new(FakeClassifier::default());
        let app = app_with(fake.clone());
        let resp = app
            .oneshot(predict_request(Some(KEY), &text_body("")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: PredictResponse = serde_json::from_value(json_body(resp).await).unwrap();
        assert_eq!(body.text_length, 0);
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn repeated_prediction_is_deterministic() {
        let app = app_with(Arc::new(FakeClassifier::default()));
        let body = text_body("Harika bir gün! Her şey mükemmel.");

        let first = app
            .clone()
            .oneshot(predict_request(Some(KEY), &body))
            .await
            .unwrap();
        let second = app
            .oneshot(predict_request(Some(KEY), &body))
            .await
            .unwrap();
        assert_eq!(json_body(first).await, json_body(second).await);
    }
}
