//! Notification delivery
//!
//! Notifications are plain HTTP POSTs in the ntfy style: the title travels in
//! a `title` header, the message is the raw request body. Only HTTP 200 is a
//! successful delivery.

use crate::error::NotifyError;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{error, info};

/// Sink for (title, message) notifications
#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    url: String,
}

impl HttpNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration, accept_invalid_certs: bool) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl Notifier for HttpNotifier {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .header("title", title)
            .body(message.to_string())
            .send()
            .await;

        let result = match response {
            Ok(response) if response.status() == StatusCode::OK => Ok(()),
            Ok(response) => Err(NotifyError::Rejected(response.status())),
            Err(e) => Err(NotifyError::Request(e)),
        };

        match &result {
            Ok(()) => info!("Notification sent: '{}: {}'", title, message),
            Err(e) => error!("Failed to send notification '{}: {}': {}", title, message, e),
        }
        result
    }
}
