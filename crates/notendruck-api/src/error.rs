// SPDX-License-Identifier: MIT
//
// HTTP error mapping. Batch endpoints report per-item failures inside the
// result body; this type only covers request-level failures.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use notendruck_core::error::NotendruckError;
use serde::Serialize;

#[derive(Debug)]
pub struct ApiError(NotendruckError);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl From<NotendruckError> for ApiError {
    fn from(err: NotendruckError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            NotendruckError::TemplateNotFound(_) => StatusCode::NOT_FOUND,
            NotendruckError::Qr(_) | NotendruckError::Date(_) | NotendruckError::Image(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
