use axum::{
    Json,
    body::Bytes,
    extract::{Path, State, rejection::BytesRejection},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::debug;

use super::{
    INVALID_JSON_MESSAGE, Result, WebError,
    app::AppState,
    models::{MessageResponse, UpdateRequest},
    validation::{DOMAIN_REQUIRED_MESSAGE, validate_domain, validate_status},
};
use crate::core::StoreError;

pub const UPDATE_STORED_MESSAGE: &str = "Update stored";
pub const YAML_CONTENT_TYPE: &str = "application/yaml";

pub async fn post_update(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<MessageResponse>> {
    let body = body.map_err(|rejection| {
        debug!(error = %rejection, "unreadable update body");
        WebError::Input(INVALID_JSON_MESSAGE.to_string())
    })?;
    let request: UpdateRequest = serde_json::from_slice(&body).map_err(|err| {
        debug!(error = %err, "malformed update body");
        WebError::Input(INVALID_JSON_MESSAGE.to_string())
    })?;

    validate_domain(&request.domain)?;
    validate_status(&request.status)?;

    state.store.append(&request.domain, &request.status).await;

    Ok(Json(MessageResponse::new(UPDATE_STORED_MESSAGE)))
}

pub async fn get_all(State(state): State<AppState>) -> Result<Response> {
    let snapshot = state.store.snapshot().await;
    yaml_response(&snapshot)
}

pub async fn get_domain(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<Response> {
    if domain.is_empty() {
        return Err(WebError::Input(DOMAIN_REQUIRED_MESSAGE.to_string()));
    }

    let history = state
        .store
        .lookup(&domain)
        .await
        .ok_or(WebError::NotFound)?;

    yaml_response(&history)
}

fn yaml_response<T: Serialize>(value: &T) -> Result<Response> {
    let body = serde_yaml::to_string(value).map_err(StoreError::from)?;
    Ok(([(header::CONTENT_TYPE, YAML_CONTENT_TYPE)], body).into_response())
}
