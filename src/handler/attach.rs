//! `POST /attach`: receive, store, forward, respond

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Request, Response, StatusCode};
use serde::Serialize;

use super::{public_url, upload};
use crate::config::AppState;
use crate::error::RelayError;
use crate::forwarder::{ForwardOutcome, ForwardPayload};
use crate::http::json_response;
use crate::logger;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachResponse {
    pub ok: bool,
    pub message: String,
    pub image_url: String,
}

pub async fn handle_attach<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
{
    let (parts, body) = req.into_parts();
    let base = public_url::base_url(&parts, &state.config);

    match attach(&parts.headers, body, &base, state).await {
        Ok(resp) => json_response(StatusCode::OK, &resp),
        Err(e) => {
            let status = e.status();
            if status.is_server_error() {
                logger::log_error(&format!("POST /attach failed: {e}"));
            } else {
                logger::log_warning(&format!("POST /attach refused ({status}): {e}"));
            }
            json_response(status, &e.body())
        }
    }
}

async fn attach<B>(
    headers: &hyper::HeaderMap,
    body: B,
    base: &str,
    state: &AppState,
) -> Result<AttachResponse, RelayError>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
{
    let upload = upload::receive(headers, body, &state.config.storage.field_name).await?;

    // Committed before forwarding; a failed forward leaves the file in place
    let stored = state
        .store
        .commit(&upload.image.filename, &upload.image.data)
        .await
        .map_err(RelayError::Store)?;
    logger::log_info(&format!(
        "Stored {} ({} bytes, {}) for order {}",
        stored.path.display(),
        stored.size,
        upload.image.content_type.as_deref().unwrap_or("unknown type"),
        upload.order_number
    ));

    let image_url = public_url::file_url(base, state.config.public_prefix(), &stored.filename);

    let outcome = state
        .forwarder
        .forward(&ForwardPayload {
            order_number: &upload.order_number,
            image_url: &image_url,
        })
        .await?;

    match outcome {
        ForwardOutcome::Accepted => Ok(AttachResponse {
            ok: true,
            message: format!("Image saved and attached to order {}", upload.order_number),
            image_url,
        }),
        ForwardOutcome::Rejected(message) => Err(RelayError::OrderRejected(message)),
    }
}
