// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP surface.
//!
//! Thin layer over the issuance pipeline: one generation endpoint returning
//! the bundle bytes with pkpass media type metadata, plus an unauthenticated
//! health probe. Errors map to structured JSON bodies carrying the error
//! taxonomy kind and a message.

use {
    crate::{
        assets::StaticAssets, config::IssuerConfig, error::PassIssuerError, issuer::issue_pass,
        pass::PassFields,
    },
    axum::{
        extract::State,
        http::{header, StatusCode},
        response::{IntoResponse, Response},
        routing::{get, post},
        Json, Router,
    },
    log::error,
    std::sync::Arc,
    tower_http::trace::TraceLayer,
};

/// Shared state for route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<IssuerConfig>,
    pub assets: Arc<StaticAssets>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: IssuerConfig, assets: StaticAssets) -> Self {
        Self {
            config: Arc::new(config),
            assets: Arc::new(assets),
            http: reqwest::Client::new(),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/passes", post(generate_pass))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

async fn generate_pass(
    State(state): State<AppState>,
    Json(fields): Json<PassFields>,
) -> Result<impl IntoResponse, AppError> {
    let pass = issue_pass(&state.config, &state.assets, &state.http, &fields).await?;

    let headers = [
        (header::CONTENT_TYPE, pass.media_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", pass.filename()),
        ),
    ];

    Ok((headers, pass.data))
}

/// Pipeline error adapted to an HTTP response.
pub struct AppError(pub PassIssuerError);

impl From<PassIssuerError> for AppError {
    fn from(err: PassIssuerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            "input" => StatusCode::UNPROCESSABLE_ENTITY,
            "asset" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error!("pass generation failed: {}", self.0);

        let body = serde_json::json!({
            "error": {
                "kind": self.0.kind(),
                "message": self.0.to_string(),
            }
        });

        (status, Json(body)).into_response()
    }
}
