use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use floorplan_ai::{
    AnalysisOutcome, ChatTurn, EditOutcome, ImageAttachment, InferenceProvider, LayoutError,
    analyze_images, apply_instruction,
};
use floorplan_scene::{Scene, SceneStore};
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

/// Shared handler state: the configured model backend plus the scene
/// document store. The server keeps no per-session scene; scenes travel
/// in the requests themselves.
pub struct AppState<P> {
    provider: Arc<P>,
    store: Arc<SceneStore>,
}

impl<P> AppState<P> {
    pub fn new(provider: P, store: SceneStore) -> Self {
        Self {
            provider: Arc::new(provider),
            store: Arc::new(store),
        }
    }
}

impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            store: Arc::clone(&self.store),
        }
    }
}

pub fn app<P>(state: AppState<P>) -> Router
where
    P: InferenceProvider + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze::<P>))
        .route("/chat", post(chat::<P>))
        .route("/save-scene", post(save_scene::<P>))
        .route("/scene", get(scene::<P>))
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    images: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    instruction: String,
    #[serde(default)]
    scene: Scene,
    #[serde(default)]
    history: Vec<ChatTurn>,
}

#[derive(Debug, Deserialize)]
struct SaveSceneRequest {
    #[serde(rename = "sceneData")]
    scene_data: Scene,
}

#[derive(Debug, Serialize, Deserialize)]
struct HealthResponse {
    status: &'static str,
}

/// Shared response shape for the two model-driven routes: `scene` is the
/// full replacement when the model produced one, null when the reply is
/// conversation only.
#[derive(Debug, Serialize, Deserialize)]
struct SceneResponse {
    scene: Option<Scene>,
    reply: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SaveSceneResponse {
    success: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
    code: &'static str,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            code: "input",
        }
    }

    fn storage(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            code: "storage",
        }
    }
}

impl From<LayoutError> for ApiError {
    fn from(error: LayoutError) -> Self {
        let status = match &error {
            LayoutError::Input(_) => StatusCode::BAD_REQUEST,
            LayoutError::Transport(_)
            | LayoutError::Provider { .. }
            | LayoutError::EmptyResponse => StatusCode::BAD_GATEWAY,
            LayoutError::Parse { .. } | LayoutError::Validation { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        };
        Self {
            status,
            message: error.to_string(),
            code: error.code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            log::warn!("request failed ({}): {}", self.code, self.message);
        }
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
                code: self.code,
            }),
        )
            .into_response()
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn analyze<P>(
    State(state): State<AppState<P>>,
    body: Bytes,
) -> Result<Json<SceneResponse>, ApiError>
where
    P: InferenceProvider + Send + Sync + 'static,
{
    let request: AnalyzeRequest = parse_json(&body)?;
    let images = request
        .images
        .iter()
        .map(|raw| ImageAttachment::from_base64(raw))
        .collect::<Vec<_>>();

    let outcome = analyze_images(state.provider.as_ref(), &images).await?;
    Ok(Json(match outcome {
        AnalysisOutcome::Scene { scene, reply } => SceneResponse {
            scene: Some(scene),
            reply,
        },
        AnalysisOutcome::Message(reply) => SceneResponse { scene: None, reply },
    }))
}

async fn chat<P>(
    State(state): State<AppState<P>>,
    body: Bytes,
) -> Result<Json<SceneResponse>, ApiError>
where
    P: InferenceProvider + Send + Sync + 'static,
{
    let request: ChatRequest = parse_json(&body)?;
    if request.instruction.trim().is_empty() {
        return Err(ApiError::bad_request("instruction must not be blank"));
    }

    let outcome = apply_instruction(
        state.provider.as_ref(),
        &request.scene,
        &request.history,
        &request.instruction,
    )
    .await?;
    Ok(Json(match outcome {
        EditOutcome::Replaced { scene, reply } => SceneResponse {
            scene: Some(scene),
            reply,
        },
        EditOutcome::Message(reply) => SceneResponse { scene: None, reply },
    }))
}

async fn save_scene<P>(
    State(state): State<AppState<P>>,
    body: Bytes,
) -> Result<Json<SaveSceneResponse>, ApiError>
where
    P: Send + Sync + 'static,
{
    let request: SaveSceneRequest = parse_json(&body)?;
    state
        .store
        .save(&request.scene_data)
        .map_err(|err| ApiError::storage(format!("failed to save scene: {err}")))?;
    Ok(Json(SaveSceneResponse { success: true }))
}

async fn scene<P>(State(state): State<AppState<P>>) -> Result<Json<Scene>, ApiError>
where
    P: Send + Sync + 'static,
{
    let scene = state
        .store
        .load_or_default()
        .map_err(|err| ApiError::storage(format!("failed to load scene: {err}")))?;
    Ok(Json(scene))
}

fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    if body.is_empty() {
        return Err(ApiError::bad_request("request body is required"));
    }

    serde_json::from_slice(body)
        .map_err(|err| ApiError::bad_request(format!("invalid JSON body: {err}")))
}
