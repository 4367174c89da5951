use super::*;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use shared::domain::Verdict;
use tokio::net::TcpListener;

#[derive(Clone)]
struct ServerState {
    status: StatusCode,
    body: &'static str,
    hits: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<(Option<String>, serde_json::Value)>>>,
}

async fn handle_predict(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    state.seen.lock().expect("seen lock").push((content_type, json));
    (state.status, state.body).into_response()
}

async fn spawn_predict_server(status: StatusCode, body: &'static str) -> (Url, ServerState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = ServerState {
        status,
        body,
        hits: Arc::new(AtomicUsize::new(0)),
        seen: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/api/predict", post(handle_predict))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    let base = Url::parse(&format!("http://{addr}")).expect("base url");
    (base, state)
}

fn sample_request() -> PredictionRequest {
    PredictionRequest {
        inbound_rate: 100.0,
        outbound_rate: 50.0,
        inbound_util: 0.8,
        outbound_util: 0.3,
    }
}

#[tokio::test]
async fn posts_json_body_once_and_decodes_anomaly() {
    let (base, state) = spawn_predict_server(
        StatusCode::OK,
        r#"{"prediction":1,"label":"High anomaly risk"}"#,
    )
    .await;
    let client = HttpPredictionClient::new(&base);

    let prediction = client.predict(&sample_request()).await.expect("predict");

    assert_eq!(prediction.label, "High anomaly risk");
    assert_eq!(prediction.verdict, Verdict::Anomaly);
    assert_eq!(state.hits.load(Ordering::SeqCst), 1);

    let seen = state.seen.lock().expect("seen lock").clone();
    let (content_type, body) = &seen[0];
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(
        body,
        &serde_json::json!({
            "inbound_rate": 100.0,
            "outbound_rate": 50.0,
            "inbound_util": 0.8,
            "outbound_util": 0.3,
        })
    );
}

#[tokio::test]
async fn zero_prediction_is_normal_and_missing_label_uses_verdict_name() {
    let (base, _state) = spawn_predict_server(StatusCode::OK, r#"{"prediction":0}"#).await;
    let client = HttpPredictionClient::new(&base);

    let prediction = client.predict(&sample_request()).await.expect("predict");

    assert_eq!(
        prediction,
        Prediction {
            label: "Normal".to_string(),
            verdict: Verdict::Normal,
            prediction: 0.0,
        }
    );
}

#[tokio::test]
async fn integral_float_prediction_is_an_anomaly() {
    let (base, _state) =
        spawn_predict_server(StatusCode::OK, r#"{"prediction":1.0,"label":"Anomaly"}"#).await;
    let client = HttpPredictionClient::new(&base);

    let prediction = client.predict(&sample_request()).await.expect("predict");

    assert_eq!(prediction.verdict, Verdict::Anomaly);
    assert_eq!(prediction.label, "Anomaly");
}

#[tokio::test]
async fn server_error_prefers_error_field() {
    let (base, _state) = spawn_predict_server(
        StatusCode::BAD_REQUEST,
        r#"{"error":"Invalid input.","detail":"could not convert string to float"}"#,
    )
    .await;
    let client = HttpPredictionClient::new(&base);

    let err = client.predict(&sample_request()).await.expect_err("400");

    assert_eq!(
        err,
        SubmitError::Server {
            status: 400,
            message: "Invalid input.".to_string(),
        }
    );
}

#[tokio::test]
async fn server_error_falls_back_to_detail() {
    let (base, _state) = spawn_predict_server(
        StatusCode::UNPROCESSABLE_ENTITY,
        r#"{"detail":"outbound_util is required"}"#,
    )
    .await;
    let client = HttpPredictionClient::new(&base);

    let err = client.predict(&sample_request()).await.expect_err("422");

    assert_eq!(err.to_string(), "outbound_util is required");
}

#[tokio::test]
async fn unreadable_error_body_uses_generic_phrase() {
    let (base, _state) =
        spawn_predict_server(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").await;
    let client = HttpPredictionClient::new(&base);

    let err = client.predict(&sample_request()).await.expect_err("502");

    assert_eq!(err.to_string(), "Request failed.");
    assert_eq!(err.kind(), "server");
}

#[tokio::test]
async fn undecodable_success_body_is_a_transport_error() {
    let (base, _state) = spawn_predict_server(StatusCode::OK, "not json").await;
    let client = HttpPredictionClient::new(&base);

    let err = client.predict(&sample_request()).await.expect_err("bad body");

    assert_eq!(err.kind(), "transport");
    assert!(
        err.to_string().starts_with("Network error: invalid response body"),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let base = Url::parse(&format!("http://{addr}")).expect("base url");
    let client = HttpPredictionClient::new(&base);

    let err = client.predict(&sample_request()).await.expect_err("refused");

    match &err {
        SubmitError::Transport { message } => assert!(!message.is_empty()),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().starts_with("Network error: "));
}

#[tokio::test]
async fn request_timeout_surfaces_as_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new().route(
        "/api/predict",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            r#"{"prediction":0}"#
        }),
    );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let base = Url::parse(&format!("http://{addr}")).expect("base url");
    let client = HttpPredictionClient::with_request_timeout(&base, Duration::from_millis(200))
        .expect("client");

    let started = std::time::Instant::now();
    let err = client.predict(&sample_request()).await.expect_err("timeout");

    assert_eq!(err.kind(), "transport");
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[test]
fn endpoint_keeps_base_path_prefix() {
    let base = Url::parse("http://10.0.0.5:8080/anomaly/").expect("url");
    assert_eq!(
        predict_endpoint(&base).as_str(),
        "http://10.0.0.5:8080/anomaly/api/predict"
    );

    let bare = Url::parse("http://localhost:5000").expect("url");
    assert_eq!(
        predict_endpoint(&bare).as_str(),
        "http://localhost:5000/api/predict"
    );
}

#[tokio::test]
async fn controller_submits_through_http_client() {
    let (base, state) = spawn_predict_server(
        StatusCode::OK,
        r#"{"prediction":1,"label":"High anomaly risk"}"#,
    )
    .await;
    let mut frames = Vec::new();
    let mut controller = FormController::new(HttpPredictionClient::new(&base), |frame: &FormState| {
        frames.push(frame.clone())
    });

    controller
        .submit(&FormInput::new("100", "50", "0.8", "0.3"))
        .await
        .expect("prediction");
    let final_state = controller.state().clone();
    drop(controller);

    assert_eq!(state.hits.load(Ordering::SeqCst), 1);
    assert_eq!(
        final_state.ui,
        UiState::ShowingResult {
            label: "High anomaly risk".to_string(),
            verdict: Verdict::Anomaly,
        }
    );
    assert_eq!(frames.len(), 3);
    assert!(frames.iter().all(|frame| !frame.ui.error_panel_visible()));
}
