//! Stored file listing and retrieval under the public prefix

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::path::Path;

use super::public_url;
use super::router::RequestContext;
use crate::config::AppState;
use crate::error::RelayError;
use crate::http::{self, cache, mime};
use crate::logger;

/// `GET <prefix>`: absolute URLs of every stored file
pub async fn list_files(state: &AppState, base: &str) -> Response<Full<Bytes>> {
    match state.store.list().await {
        Ok(names) => {
            let prefix = state.config.public_prefix();
            let urls: Vec<String> = names
                .iter()
                .map(|name| public_url::file_url(base, prefix, name))
                .collect();
            http::json_response(StatusCode::OK, &urls)
        }
        Err(e) => {
            let err = RelayError::List(e);
            logger::log_error(&format!(
                "Listing '{}' failed: {}",
                state.store.dir().display(),
                std::error::Error::source(&err).map_or_else(String::new, ToString::to_string)
            ));
            http::json_response(err.status(), &err.body())
        }
    }
}

/// `GET|HEAD <prefix>/<name>`: the stored bytes, with `ETag` revalidation
pub async fn serve_stored(
    ctx: &RequestContext,
    state: &AppState,
    name: &str,
) -> Response<Full<Bytes>> {
    let Some(data) = state.store.read(name).await else {
        return http::build_404_response();
    };

    let etag = cache::generate_etag(&data);
    if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
        return http::build_304_response(&etag);
    }

    let content_type = mime::get_content_type(Path::new(name).extension().and_then(|e| e.to_str()));
    http::build_file_response(Bytes::from(data), content_type, &etag, ctx.is_head)
}
