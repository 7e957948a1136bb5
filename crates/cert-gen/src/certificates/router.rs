use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::TestResult;
use super::lookup::RemoteLookup;
use super::service::{CertificateError, CertificateService};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadRequest {
    pub test_result: TestResult,
    #[serde(default)]
    pub bilingual: bool,
}

/// Router exposing payload generation over HTTP.
pub fn certificate_router<L>(service: Arc<CertificateService<L>>) -> Router
where
    L: RemoteLookup + 'static,
{
    Router::new()
        .route("/api/v1/certificates/payload", post(payload_handler::<L>))
        .with_state(service)
}

pub(crate) async fn payload_handler<L>(
    State(service): State<Arc<CertificateService<L>>>,
    Json(request): Json<PayloadRequest>,
) -> Response
where
    L: RemoteLookup + 'static,
{
    match service
        .generate(&request.test_result, request.bilingual)
        .await
    {
        Ok(document) => (StatusCode::OK, Json(document)).into_response(),
        Err(error) => {
            let status = status_for(&error);
            let payload = json!({
                "error": error.to_string(),
            });
            (status, Json(payload)).into_response()
        }
    }
}

pub fn status_for(error: &CertificateError) -> StatusCode {
    match error {
        CertificateError::InvalidTestResult(_) => StatusCode::BAD_REQUEST,
        CertificateError::NotCertifiable { .. } | CertificateError::MissingData(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        CertificateError::Lookup(_) => StatusCode::BAD_GATEWAY,
        CertificateError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
