//! Upload receiver
//!
//! Reads the whole multipart body into memory and picks out the order number
//! and the image part. Nothing touches the disk here; the caller commits the
//! image only after the request has been validated.

use http_body_util::BodyExt;
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_TYPE;
use hyper::HeaderMap;

use crate::error::RelayError;
use crate::logger;

pub const ORDER_NUMBER_FIELD: &str = "orderNumber";

/// The image part of an upload
#[derive(Debug, Clone)]
pub struct ImagePart {
    /// Filename as sent by the client
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// A validated upload: non-empty order number plus an image
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub order_number: String,
    pub image: ImagePart,
}

/// Parse `body` and extract the upload.
///
/// Bodies that are not multipart count as missing both parts. A file part
/// without a filename is ignored. Exactly one file part is accepted, in
/// `file_field`; a second one, or a file in any other field, fails with
/// `UnexpectedField`. Unknown text fields are ignored and a repeated order
/// number keeps its first value.
pub async fn receive<B>(
    headers: &HeaderMap,
    body: B,
    file_field: &str,
) -> Result<UploadRequest, RelayError>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
{
    let Some(content_type) = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|ct| ct.trim_start().to_ascii_lowercase().starts_with("multipart/"))
    else {
        return Err(RelayError::MissingFields);
    };

    let boundary = multer::parse_boundary(content_type)?;
    let mut multipart = multer::Multipart::new(body.into_data_stream(), boundary);

    let mut order_number: Option<String> = None;
    let mut image: Option<ImagePart> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(ToString::to_string);
        let filename = field.file_name().map(ToString::to_string);
        match (name.as_deref(), filename) {
            (Some(ORDER_NUMBER_FIELD), None) => {
                let text = field.text().await?;
                order_number.get_or_insert(text);
            }
            (Some(n), Some(filename)) if n == file_field && !filename.is_empty() && image.is_none() => {
                let content_type = field.content_type().map(ToString::to_string);
                let data = field.bytes().await?;
                image = Some(ImagePart {
                    filename,
                    content_type,
                    data,
                });
            }
            (other, Some(filename)) if !filename.is_empty() => {
                logger::log_warning(&format!(
                    "Upload rejected: unexpected file part in field '{}'",
                    other.unwrap_or("")
                ));
                return Err(RelayError::UnexpectedField);
            }
            _ => {}
        }
    }

    match (order_number.filter(|o| !o.is_empty()), image) {
        (Some(order_number), Some(image)) => Ok(UploadRequest {
            order_number,
            image,
        }),
        _ => Err(RelayError::MissingFields),
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use http_body_util::Full;

    pub const BOUNDARY: &str = "relay-test-boundary";

    /// Assemble a multipart body: `(name, Some(filename), bytes)` for files,
    /// `(name, None, bytes)` for text fields
    pub fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, filename, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match filename {
                Some(f) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\nContent-Type: image/png\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                }
                None => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                }
            }
            body.extend_from_slice(data.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    pub fn multipart_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}").parse().unwrap(),
        );
        headers
    }

    async fn receive_parts(
        parts: &[(&str, Option<&str>, &str)],
    ) -> Result<UploadRequest, RelayError> {
        let body = Full::new(Bytes::from(multipart_body(parts)));
        receive(&multipart_headers(), body, "image").await
    }

    #[tokio::test]
    async fn test_receives_both_parts() {
        let upload = receive_parts(&[
            ("orderNumber", None, "ORD-1"),
            ("image", Some("a.png"), "0123456789"),
        ])
        .await
        .unwrap();

        assert_eq!(upload.order_number, "ORD-1");
        assert_eq!(upload.image.filename, "a.png");
        assert_eq!(upload.image.content_type.as_deref(), Some("image/png"));
        assert_eq!(&upload.image.data[..], b"0123456789");
    }

    #[tokio::test]
    async fn test_missing_parts() {
        let cases: [&[(&str, Option<&str>, &str)]; 4] = [
            &[("image", Some("a.png"), "x")],
            &[("orderNumber", None, "ORD-1")],
            &[("orderNumber", None, ""), ("image", Some("a.png"), "x")],
            &[("orderNumber", None, "ORD-1"), ("image", Some(""), "x")],
        ];
        for parts in cases {
            let err = receive_parts(parts).await.unwrap_err();
            assert!(matches!(err, RelayError::MissingFields));
        }
    }

    #[tokio::test]
    async fn test_text_fields_ignored_and_first_order_number_kept() {
        let upload = receive_parts(&[
            ("note", None, "hello"),
            ("orderNumber", None, "ORD-9"),
            ("image", Some("first.jpg"), "one"),
            ("image", Some(""), "ignored"),
            ("orderNumber", None, "ORD-10"),
        ])
        .await
        .unwrap();

        assert_eq!(upload.order_number, "ORD-9");
        assert_eq!(upload.image.filename, "first.jpg");
        assert_eq!(&upload.image.data[..], b"one");
    }

    #[tokio::test]
    async fn test_extra_file_parts_are_unexpected() {
        let cases: [&[(&str, Option<&str>, &str)]; 3] = [
            &[
                ("orderNumber", None, "ORD-9"),
                ("image", Some("first.jpg"), "one"),
                ("image", Some("second.jpg"), "two"),
            ],
            &[
                ("orderNumber", None, "ORD-9"),
                ("attachment", Some("b.pdf"), "pdf"),
                ("image", Some("first.jpg"), "one"),
            ],
            &[
                ("orderNumber", Some("order.txt"), "ORD-9"),
                ("image", Some("first.jpg"), "one"),
            ],
        ];
        for parts in cases {
            let err = receive_parts(parts).await.unwrap_err();
            assert!(matches!(err, RelayError::UnexpectedField), "{err}");
            assert_eq!(err.to_string(), "Unexpected field");
        }
    }

    #[tokio::test]
    async fn test_non_multipart_is_missing_fields() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "application/json".parse().unwrap());
        let body = Full::new(Bytes::from_static(br#"{"orderNumber":"ORD-1"}"#));
        let err = receive(&headers, body, "image").await.unwrap_err();
        assert!(matches!(err, RelayError::MissingFields));

        let err = receive(&HeaderMap::new(), Full::new(Bytes::new()), "image")
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::MissingFields));
    }

    #[tokio::test]
    async fn test_truncated_body_is_multipart_error() {
        let mut body = multipart_body(&[("orderNumber", None, "ORD-1")]);
        body.truncate(body.len() - 10);
        let err = receive(&multipart_headers(), Full::new(Bytes::from(body)), "image")
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Multipart(_)));
    }
}
