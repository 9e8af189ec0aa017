use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nf_core::{Error, ErrorBody};
use tracing::error;

pub const UPSTREAM_FAILED_MESSAGE: &str = "NewsData.io API request failed";
pub const PROXY_ERROR_MESSAGE: &str = "Proxy server error";

/// Maps failures onto the gateway's error responses: upstream statuses are
/// relayed, everything else becomes a 500. Bodies stay generic.
#[derive(Debug)]
pub struct GatewayError(pub Error);

impl From<Error> for GatewayError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            Error::UpstreamRequestFailed { status, .. } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                UPSTREAM_FAILED_MESSAGE,
            ),
            other => {
                error!(error = %other, "proxy server error");
                (StatusCode::INTERNAL_SERVER_ERROR, PROXY_ERROR_MESSAGE)
            }
        };
        let body = ErrorBody {
            message: message.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
