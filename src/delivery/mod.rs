//! Report delivery
//!
//! A finished report goes out through exactly one `Delivery`: handed to the
//! host's email/share mechanism as a zip, or uploaded as a multipart form.
//! Packaging runs on the blocking pool; the caller learns the outcome once.

pub mod api;
pub mod email;

pub use api::ApiDelivery;
pub use email::{EmailDelivery, EmailMessage, ShareHandler};

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::report::{PackageError, Report};

/// Delivery errors
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Failed to package report: {0}")]
    Package(#[from] PackageError),

    #[error("Unable to send report, no email client available")]
    NoHandler,

    #[error("Share handler failed: {0}")]
    Share(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// What a successful delivery did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivered {
    /// The zipped report was handed to the share handler
    Shared { archive: PathBuf },
    /// The endpoint accepted the upload with this status
    Uploaded { status: u16 },
}

/// Host resources a delivery may use
#[derive(Clone)]
pub struct DeliveryContext {
    /// Scratch directory for report folders and archives
    pub cache_dir: PathBuf,
    /// Host email/share mechanism, if any
    pub share: Option<Arc<dyn ShareHandler>>,
    pub http: reqwest::Client,
}

impl DeliveryContext {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            share: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_share(mut self, share: Arc<dyn ShareHandler>) -> Self {
        self.share = Some(share);
        self
    }

    /// `<cache_dir>/flytrap`, or the system temp dir when there is no cache dir
    pub fn default_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("flytrap")
    }
}

/// How finished reports reach the developer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Delivery {
    Email(EmailDelivery),
    Api(ApiDelivery),
}

impl Delivery {
    /// Package and send `report`
    ///
    /// Failures are logged here; callers only decide how to tell the user.
    pub async fn deliver(
        &self,
        ctx: &DeliveryContext,
        report: &Report,
    ) -> Result<Delivered, DeliveryError> {
        let result = match self {
            Delivery::Email(email) => email.deliver(ctx, report).await,
            Delivery::Api(api) => api.deliver(ctx, report).await,
        };
        match &result {
            Ok(delivered) => log::info!("Delivered report {}: {:?}", report.title(), delivered),
            Err(err) => log::warn!("Failed to deliver report {}: {}", report.title(), err),
        }
        result
    }

    /// Deliver on the tokio runtime and call `on_complete` with the outcome
    pub fn spawn<F>(
        self,
        ctx: DeliveryContext,
        report: Report,
        on_complete: F,
    ) -> tokio::task::JoinHandle<()>
    where
        F: FnOnce(Result<Delivered, DeliveryError>) + Send + 'static,
    {
        tokio::spawn(async move {
            let result = self.deliver(&ctx, &report).await;
            on_complete(result);
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;

    use crate::board::MarkerBoard;
    use crate::config::FlyTrapConfig;
    use crate::domain::Point;
    use crate::report::{Report, build_report};

    /// Report with one commented marker and two small screenshot files in `dir`
    pub(crate) fn sample_report(dir: &Path) -> Report {
        let base = dir.join("base.png");
        let shade = dir.join("shade.png");
        std::fs::write(&base, b"base-bytes").unwrap();
        std::fs::write(&shade, b"shade-bytes").unwrap();

        let mut board = MarkerBoard::new(&FlyTrapConfig::default());
        let mut marker = board.next_marker(Point::new(20.0, 30.0));
        marker.set_comment("Button does nothing");
        board.add_or_absorb(marker);
        build_report(&board, base, shade, Some("TRAP_REPORT_SAMPLE".into()))
    }
}
