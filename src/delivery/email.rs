//! Email delivery through the host's share mechanism

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{Delivered, DeliveryContext, DeliveryError};
use crate::report::{Report, generate_compressed};

/// MIME type used when handing the message to the host
pub const EMAIL_MIME: &str = "message/rfc822";

/// A composed email with the zipped report attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachment: PathBuf,
    pub mime_type: &'static str,
}

/// The host's way of sending an email
pub trait ShareHandler: Send + Sync {
    /// Whether anything on the host can send this message
    fn can_send(&self, _message: &EmailMessage) -> bool {
        true
    }

    fn send(&self, message: EmailMessage) -> Result<(), String>;
}

/// Send the zipped report to a developer's address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailDelivery {
    pub address: String,
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl EmailDelivery {
    pub fn new(
        address: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub fn compose(&self, attachment: PathBuf) -> EmailMessage {
        EmailMessage {
            to: vec![self.address.clone()],
            subject: self.subject.clone(),
            body: self.message.clone(),
            attachment,
            mime_type: EMAIL_MIME,
        }
    }

    pub async fn deliver(
        &self,
        ctx: &DeliveryContext,
        report: &Report,
    ) -> Result<Delivered, DeliveryError> {
        let owned = report.clone();
        let cache_dir = ctx.cache_dir.clone();
        let archive =
            tokio::task::spawn_blocking(move || generate_compressed(&owned, &cache_dir)).await??;

        let message = self.compose(archive.clone());
        let Some(share) = ctx.share.as_ref().filter(|s| s.can_send(&message)) else {
            log::warn!("Unable to send report, no email client available.");
            return Err(DeliveryError::NoHandler);
        };
        share.send(message).map_err(DeliveryError::Share)?;
        Ok(Delivered::Shared { archive })
    }
}
