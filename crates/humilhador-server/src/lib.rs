//! `POST /api/roast`: GitHub username in, roast out.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use humilhador_core::{RoastError, RoastResult, RoastService};

#[derive(Clone)]
pub struct AppState {
    pub service: RoastService,
}

impl AppState {
    pub fn new(service: RoastService) -> Self {
        Self { service }
    }
}

/// Request body. `profileUrl` carries a bare username, not a URL.
#[derive(Debug, Deserialize)]
pub struct RoastRequest {
    #[serde(rename = "profileUrl", default)]
    pub profile_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps every failure to `{ "error": ... }` with the matching status.
pub struct ApiError(RoastError);

impl From<RoastError> for ApiError {
    fn from(err: RoastError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);

        if status.is_server_error() {
            tracing::error!("Erro ao gerar roast: {}", self.0);
        } else {
            tracing::info!("Rejected roast request ({}): {}", status.as_u16(), self.0);
        }

        let body = ErrorBody {
            error: self.0.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/roast", post(roast))
        .with_state(state)
}

async fn roast(
    State(state): State<AppState>,
    payload: Result<Json<RoastRequest>, JsonRejection>,
) -> Result<Json<RoastResult>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!("Malformed roast request: {}", rejection);
        RoastError::Validation("O nome de usuário do GitHub é obrigatório".to_string())
    })?;

    let username = request.profile_url.unwrap_or_default();
    let result = state.service.roast(&username).await?;
    Ok(Json(result))
}
