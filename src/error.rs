//! Request-level error taxonomy
//!
//! Every failure ends the request with one JSON `{ "error": ... }` response.

use hyper::StatusCode;

use crate::forwarder::ForwardError;

pub const DEFAULT_REJECTION_MESSAGE: &str = "Order not found on sheet";

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Order number or image part absent
    #[error("orderNumber and image file are required.")]
    MissingFields,
    /// The webhook answered `ok: false`
    #[error("{}", .0.as_deref().unwrap_or(DEFAULT_REJECTION_MESSAGE))]
    OrderRejected(Option<String>),
    #[error(transparent)]
    Forward(#[from] ForwardError),
    #[error("{0}")]
    Multipart(#[from] multer::Error),
    /// A file part other than the single expected image
    #[error("Unexpected field")]
    UnexpectedField,
    #[error("{0}")]
    Store(#[source] std::io::Error),
    #[error("Cannot list files")]
    List(#[source] std::io::Error),
}

impl RelayError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingFields => StatusCode::BAD_REQUEST,
            Self::OrderRejected(_) => StatusCode::NOT_FOUND,
            Self::Forward(_)
            | Self::Multipart(_)
            | Self::UnexpectedField
            | Self::Store(_)
            | Self::List(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Body sent to the client
    pub fn body(&self) -> serde_json::Value {
        serde_json::json!({ "error": self.to_string() })
    }
}
