// SPDX-License-Identifier: MIT
//
// Printable generation endpoints: batch generate, retry-failed, preview.

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use notendruck_core::error::NotendruckError;
use notendruck_core::types::BatchGenerationResult;
use notendruck_pipeline::PrintableItemConfig;
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub event_id: String,
    pub school_name: String,
    pub event_date: String,
    /// Operator-finalized item configs; absent means fixed defaults.
    #[serde(default)]
    pub items: Option<Vec<PrintableItemConfig>>,
    /// Full QR target URL; wins over `access_code` when both are set.
    pub qr_url: Option<String>,
    /// Event access code; the server builds `https://{domain}/e/{code}`.
    pub access_code: Option<String>,
    pub logo_base64: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryRequest {
    pub previous: BatchGenerationResult,
    pub school_name: String,
    pub event_date: String,
    #[serde(default)]
    pub items: Vec<PrintableItemConfig>,
    pub qr_url: Option<String>,
    pub access_code: Option<String>,
    pub logo_base64: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub event_id: String,
    pub item: PrintableItemConfig,
    pub qr_url: Option<String>,
    pub access_code: Option<String>,
    pub logo_base64: Option<String>,
}

fn decode_logo(logo_base64: Option<&str>) -> Result<Option<Vec<u8>>, ApiError> {
    match logo_base64 {
        None => Ok(None),
        Some(encoded) => BASE64
            .decode(encoded)
            .map(Some)
            .map_err(|err| NotendruckError::Image(format!("invalid logo encoding: {err}")).into()),
    }
}

fn resolve_qr_url(
    state: &AppState,
    qr_url: Option<String>,
    access_code: Option<String>,
) -> Option<String> {
    qr_url.or_else(|| access_code.map(|code| state.config.event_url(&code)))
}

/// POST /api/printables/generate
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<BatchGenerationResult>, ApiError> {
    info!(event_id = %request.event_id, "Generate request");
    let logo = decode_logo(request.logo_base64.as_deref())?;
    let qr_url = resolve_qr_url(&state, request.qr_url, request.access_code);

    let batch = match &request.items {
        Some(items) => {
            state
                .pipeline
                .generate_from_editor_configs(
                    &request.event_id,
                    &request.school_name,
                    &request.event_date,
                    items,
                    logo.as_deref(),
                    qr_url.as_deref(),
                )
                .await
        }
        None => {
            state
                .pipeline
                .generate_all(
                    &request.event_id,
                    &request.school_name,
                    &request.event_date,
                    logo.as_deref(),
                    qr_url.as_deref(),
                )
                .await
        }
    };
    Ok(Json(batch))
}

/// POST /api/printables/retry
pub async fn retry(
    State(state): State<AppState>,
    Json(request): Json<RetryRequest>,
) -> Result<Json<BatchGenerationResult>, ApiError> {
    info!(
        event_id = %request.previous.event_id,
        failed = request.previous.failed_types().len(),
        "Retry request"
    );
    let logo = decode_logo(request.logo_base64.as_deref())?;
    let qr_url = resolve_qr_url(&state, request.qr_url, request.access_code);

    let merged = state
        .pipeline
        .retry_failed(
            &request.previous,
            &request.school_name,
            &request.event_date,
            &request.items,
            logo.as_deref(),
            qr_url.as_deref(),
        )
        .await;
    Ok(Json(merged))
}

/// POST /api/printables/preview — returns the composed PDF directly.
pub async fn preview(
    State(state): State<AppState>,
    Json(request): Json<PreviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let logo = decode_logo(request.logo_base64.as_deref())?;
    let qr_url = resolve_qr_url(&state, request.qr_url, request.access_code);

    let bytes = state
        .pipeline
        .generate_single_preview(
            &request.event_id,
            &request.item,
            logo.as_deref(),
            qr_url.as_deref(),
        )
        .await?;

    Ok(([(header::CONTENT_TYPE, "application/pdf")], bytes))
}
