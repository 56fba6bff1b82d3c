//! Move notifiers: outbound webhook and log-only

use crate::collaborators::{MoveEvent, MoveNotifier};
use crate::error::NotifyError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Posts move events as JSON to a webhook URL
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: Url,
}

impl WebhookNotifier {
    /// Create a notifier posting to `url` with a per-request timeout
    pub fn new(url: &str, timeout: Duration) -> Result<Self, NotifyError> {
        let url = Url::parse(url).map_err(|e| NotifyError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl MoveNotifier for WebhookNotifier {
    async fn item_moved(&self, event: &MoveEvent) -> Result<(), NotifyError> {
        debug!(item = %event.item_id, url = %self.url, "posting move notification");
        let response = self.client.post(self.url.clone()).json(event).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(NotifyError::Status {
                status: status.as_u16(),
            })
        }
    }
}

/// Writes move events to the log; used when no webhook is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl MoveNotifier for LogNotifier {
    async fn item_moved(&self, event: &MoveEvent) -> Result<(), NotifyError> {
        info!(
            item = %event.item_id,
            from = %event.from_column,
            to = %event.to_column,
            index = event.target_index,
            "item moved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use opsboard_reorder::OrderKey;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn event() -> MoveEvent {
        MoveEvent {
            item_id: "t7".into(),
            from_column: "pending".into(),
            to_column: "in_progress".into(),
            target_index: 2,
            order_key: OrderKey::new(3072),
            moved_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_posts_event_json() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hooks/moves"))
            .and(body_partial_json(serde_json::json!({
                "item_id": "t7",
                "to_column": "in_progress",
                "target_index": 2
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/hooks/moves", mock_server.uri());
        let notifier = WebhookNotifier::new(&url, Duration::from_secs(5)).unwrap();
        notifier.item_moved(&event()).await.unwrap();
    }

    #[tokio::test]
    async fn test_server_error_is_retryable() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&mock_server)
            .await;

        let notifier = WebhookNotifier::new(&mock_server.uri(), Duration::from_secs(5)).unwrap();
        let err = notifier.item_moved(&event()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Status { status: 502 }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_client_error_is_not_retryable() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422))
            .mount(&mock_server)
            .await;

        let notifier = WebhookNotifier::new(&mock_server.uri(), Duration::from_secs(5)).unwrap();
        let err = notifier.item_moved(&event()).await.unwrap_err();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_invalid_url() {
        let err = WebhookNotifier::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, NotifyError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        assert!(LogNotifier.item_moved(&event()).await.is_ok());
    }
}
