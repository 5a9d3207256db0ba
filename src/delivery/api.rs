//! HTTP delivery: multipart upload to a configured endpoint
//!
//! Form parts:
//! - `meta`: report metadata as JSON
//! - `base`: the base screenshot (PNG)
//! - `shade`: the annotation layer laid over the base (PNG)

use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use super::{Delivered, DeliveryContext, DeliveryError};
use crate::report::{PackageError, Report, generate_api_payload};

pub const JSON_MIME: &str = "application/json; charset=utf-8";
pub const PNG_MIME: &str = "image/png";

/// Upload reports to `url`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDelivery {
    pub url: String,
}

/// A file read into memory for upload
struct FilePart {
    name: String,
    data: Vec<u8>,
}

impl FilePart {
    fn read(path: &Path) -> Result<Self, DeliveryError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let data = std::fs::read(path)?;
        Ok(Self { name, data })
    }

    fn into_part(self) -> Result<Part, DeliveryError> {
        Ok(Part::bytes(self.data)
            .file_name(self.name)
            .mime_str(PNG_MIME)?)
    }
}

fn build_form(meta: String, base: FilePart, shade: FilePart) -> Result<Form, DeliveryError> {
    Ok(Form::new()
        .part("meta", Part::text(meta).mime_str(JSON_MIME)?)
        .part("base", base.into_part()?)
        .part("shade", shade.into_part()?))
}

impl ApiDelivery {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub async fn deliver(
        &self,
        ctx: &DeliveryContext,
        report: &Report,
    ) -> Result<Delivered, DeliveryError> {
        let owned = report.clone();
        let cache_dir = ctx.cache_dir.clone();
        let (meta, base, shade) = tokio::task::spawn_blocking(move || {
            let payload = generate_api_payload(&owned, &cache_dir)?;
            let meta = serde_json::to_string(&payload.meta).map_err(PackageError::from)?;
            Ok::<_, DeliveryError>((
                meta,
                FilePart::read(&payload.base)?,
                FilePart::read(&payload.shade)?,
            ))
        })
        .await??;

        let form = build_form(meta, base, shade)?;
        log::debug!("Uploading report {} to {}", report.title(), self.url);
        let response = ctx.http.post(&self.url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Server(format!("{}: {}", status, body)));
        }
        Ok(Delivered::Uploaded {
            status: status.as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::testing::sample_report;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn context(dir: &Path) -> DeliveryContext {
        let mut ctx = DeliveryContext::new(dir.join("cache"));
        ctx.http = reqwest::Client::builder().no_proxy().build().unwrap();
        ctx
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    /// Accept one request, reply with `status_line`, and return the raw request
    async fn serve_once(listener: TcpListener, status_line: &'static str) -> Vec<u8> {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];

        let header_end = loop {
            let n = socket.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed before headers");
            request.extend_from_slice(&buf[..n]);
            if let Some(pos) = find(&request, b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let headers = String::from_utf8_lossy(&request[..header_end]).to_ascii_lowercase();
        let length: usize = headers
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .map(|v| v.trim().parse().unwrap())
            .unwrap_or(0);
        while request.len() < header_end + length {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let reply = format!("{}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n", status_line);
        socket.write_all(reply.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        request
    }

    #[tokio::test]
    async fn test_upload_sends_three_parts() {
        let tmp = tempfile::tempdir().unwrap();
        let report = sample_report(tmp.path());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/reports", listener.local_addr().unwrap());
        let server = tokio::spawn(serve_once(listener, "HTTP/1.1 201 Created"));

        let ctx = context(tmp.path());
        let delivered = ApiDelivery::new(url).deliver(&ctx, &report).await.unwrap();
        assert_eq!(delivered, Delivered::Uploaded { status: 201 });

        let request = server.await.unwrap();
        let text = String::from_utf8_lossy(&request);
        assert!(text.starts_with("POST /reports"));
        assert!(text.contains("name=\"meta\""));
        assert!(text.contains("name=\"base\""));
        assert!(text.contains("name=\"shade\""));
        assert!(text.contains("TRAP_REPORT_SAMPLE"));
        assert!(text.contains("Button does nothing"));
        assert!(text.contains("shade-bytes"));
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let report = sample_report(tmp.path());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        let server = tokio::spawn(serve_once(listener, "HTTP/1.1 500 Internal Server Error"));

        let ctx = context(tmp.path());
        let err = ApiDelivery::new(url).deliver(&ctx, &report).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Server(ref msg) if msg.starts_with("500")));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let tmp = tempfile::tempdir().unwrap();
        let report = sample_report(tmp.path());
        // Bind then drop to get a port nobody listens on
        let addr = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap()
            .local_addr()
            .unwrap();

        let ctx = context(tmp.path());
        let err = ApiDelivery::new(format!("http://{}/", addr))
            .deliver(&ctx, &report)
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::Http(_)));
    }
}
