use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    middleware,
    routing::{get, post},
};
use redakto_config::AppConfig;
use redakto_core::{
    DetectEntitiesRequest, DetectEntitiesResponse, EntitySetDetails, EntitySetQuery, ModelQuery,
    RedactTextsRequest, RedactTextsResponse, SupportedModelDetails,
};
use redakto_engine::{AppInfoService, PredictionService, SharedRegistry};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use utoipa::ToSchema;

use crate::docs;
use crate::error::{ApiError, ErrorEnvelope, error_envelope, panic_response};
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::openapi::openapi_document;

#[derive(Clone)]
pub struct AppState {
    pub prediction: Arc<PredictionService>,
    pub app_info: Arc<AppInfoService>,
    pub app: Arc<AppConfig>,
}

impl AppState {
    pub fn new(app: AppConfig, registry: SharedRegistry) -> Self {
        Self {
            prediction: Arc::new(PredictionService::new(registry.clone())),
            app_info: Arc::new(AppInfoService::new(registry)),
            app: Arc::new(app),
        }
    }
}

pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    pub fn new(app: AppConfig, registry: SharedRegistry) -> Self {
        Self {
            state: AppState::new(app, registry),
        }
    }

    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    pub async fn serve(self, host: &str, port: u16) -> anyhow::Result<()> {
        #[cfg(unix)]
        spawn_reload_on_hangup(self.state.prediction.clone());

        let app = self.router();
        let addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&addr).await?;

        info!("{} listening on http://{}", self.state.app.name, addr);
        info!("API docs at http://{}/api/docs", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

pub fn router(state: AppState) -> Router {
    let app_info = Router::new()
        .route("/get_entity_set_ids", get(get_entity_set_ids))
        .route("/get_supported_model_ids", get(get_supported_model_ids))
        .route("/get_entity_set_details", get(get_entity_set_details))
        .route("/get_supported_model_details", get(get_supported_model_details));

    let predict = Router::new()
        .route("/detect_entities", post(detect_entities))
        .route("/redact", post(redact));

    let routes = Router::new()
        .nest("/api/app_info", app_info)
        .nest("/api/predict", predict)
        .route("/api/health", get(health))
        .route("/api/openapi.json", get(openapi))
        .route("/api/docs", get(docs::swagger_ui))
        .route("/api/redoc", get(docs::redoc));

    with_error_handling(routes).with_state(state)
}

/// Panic catching, the error envelope and permissive CORS, innermost first.
pub fn with_error_handling<S>(routes: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    // Allow connections from any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn(error_envelope))
        .layer(cors)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// SIGHUP rebuilds the model registry from the catalog file.
#[cfg(unix)]
fn spawn_reload_on_hangup(prediction: Arc<PredictionService>) {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("Catalog reload on SIGHUP unavailable: {}", e);
            return;
        }
    };
    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            match prediction.reload().await {
                Ok(()) => info!("Catalog reloaded"),
                Err(e) => tracing::error!("Catalog reload failed, keeping current models: {}", e),
            }
        }
    });
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub name: String,
    pub version: String,
    /// At least one model passed its requirement checks
    pub ready: bool,
}

/// Service name, version and readiness.
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service status", body = HealthStatus)),
    tag = "health"
)]
pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    let ready = state.prediction.registry().read().await.available_models() > 0;
    Json(HealthStatus {
        name: state.app.name.clone(),
        version: state.app.version.clone(),
        ready,
    })
}

/// This document.
#[utoipa::path(
    get,
    path = "/api/openapi.json",
    responses((status = 200, description = "OpenAPI 3 document")),
    tag = "health"
)]
pub(crate) async fn openapi(State(state): State<AppState>) -> Json<utoipa::openapi::OpenApi> {
    Json(openapi_document(&state.app))
}

/// Ids of all configured entity sets.
#[utoipa::path(
    get,
    path = "/api/app_info/get_entity_set_ids",
    responses((status = 200, description = "Entity set ids", body = Vec<String>)),
    tag = "app_info"
)]
pub(crate) async fn get_entity_set_ids(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.app_info.entity_set_ids().await)
}

/// Ids of the usable models of an entity set.
#[utoipa::path(
    get,
    path = "/api/app_info/get_supported_model_ids",
    params(EntitySetQuery),
    responses(
        (status = 200, description = "Model ids", body = Vec<String>),
        (status = 404, description = "Unknown entity set", body = ErrorEnvelope),
        (status = 422, description = "Invalid query", body = ErrorEnvelope)
    ),
    tag = "app_info"
)]
pub(crate) async fn get_supported_model_ids(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<EntitySetQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(
        state
            .app_info
            .supported_model_ids(&query.entity_set_id)
            .await?,
    ))
}

/// Corpus metadata, labels and models of an entity set.
#[utoipa::path(
    get,
    path = "/api/app_info/get_entity_set_details",
    params(EntitySetQuery),
    responses(
        (status = 200, description = "Entity set details", body = EntitySetDetails),
        (status = 404, description = "Unknown entity set", body = ErrorEnvelope),
        (status = 422, description = "Invalid query", body = ErrorEnvelope)
    ),
    tag = "app_info"
)]
pub(crate) async fn get_entity_set_details(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<EntitySetQuery>,
) -> Result<Json<EntitySetDetails>, ApiError> {
    Ok(Json(
        state
            .app_info
            .entity_set_details(&query.entity_set_id)
            .await?,
    ))
}

/// Metadata of one model of an entity set.
#[utoipa::path(
    get,
    path = "/api/app_info/get_supported_model_details",
    params(ModelQuery),
    responses(
        (status = 200, description = "Model details", body = SupportedModelDetails),
        (status = 404, description = "Unknown entity set or model", body = ErrorEnvelope),
        (status = 422, description = "Invalid query", body = ErrorEnvelope)
    ),
    tag = "app_info"
)]
pub(crate) async fn get_supported_model_details(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ModelQuery>,
) -> Result<Json<SupportedModelDetails>, ApiError> {
    Ok(Json(
        state
            .app_info
            .supported_model_details(&query.entity_set_id, &query.model_id)
            .await?,
    ))
}

/// Detect sensitive entities in each input text.
#[utoipa::path(
    post,
    path = "/api/predict/detect_entities",
    request_body = DetectEntitiesRequest,
    responses(
        (status = 200, description = "Entities per input text", body = DetectEntitiesResponse),
        (status = 404, description = "Unknown entity set or model", body = ErrorEnvelope),
        (status = 422, description = "Invalid request", body = ErrorEnvelope),
        (status = 500, description = "Model failed to load or predict", body = ErrorEnvelope)
    ),
    tag = "predict"
)]
pub(crate) async fn detect_entities(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<DetectEntitiesRequest>,
) -> Result<Json<DetectEntitiesResponse>, ApiError> {
    Ok(Json(state.prediction.detect_entities(&request).await?))
}

/// Replace detected entities in each input text.
#[utoipa::path(
    post,
    path = "/api/predict/redact",
    request_body = RedactTextsRequest,
    responses(
        (status = 200, description = "Redacted texts", body = RedactTextsResponse),
        (status = 404, description = "Unknown entity set or model", body = ErrorEnvelope),
        (status = 422, description = "Invalid request", body = ErrorEnvelope),
        (status = 500, description = "Model failed to load or predict", body = ErrorEnvelope)
    ),
    tag = "predict"
)]
pub(crate) async fn redact(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RedactTextsRequest>,
) -> Result<Json<RedactTextsResponse>, ApiError> {
    Ok(Json(state.prediction.redact_texts(&request).await?))
}
