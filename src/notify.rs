use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::AppError;

/// Delivery channel for human-facing alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

pub struct TelegramNotifier {
    http: reqwest::Client,
    base_url: String,
    token: String,
    chat_id: String,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(base_url: &str, token: &str, chat_id: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            chat_id: chat_id.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let resp: TelegramResponse = self
            .http
            .get(&url)
            .query(&[("chat_id", self.chat_id.as_str()), ("text", text)])
            .send()
            .await
            .context("telegram sendMessage HTTP failed")?
            .json()
            .await
            .context("telegram sendMessage returned invalid JSON")?;
        if !resp.ok {
            return Err(AppError::Notify(
                resp.description
                    .unwrap_or_else(|| "telegram rejected message".to_string()),
            )
            .into());
        }
        Ok(())
    }
}

/// Writes alerts to the log only.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        tracing::info!(text, "Notification");
        Ok(())
    }
}

/// Fire-and-forget handle to the alert queue. Never blocks the caller.
#[derive(Debug, Clone)]
pub struct NotificationSender {
    tx: mpsc::Sender<String>,
}

impl NotificationSender {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Queue `text`; returns false when it was dropped.
    pub fn notify(&self, text: String) -> bool {
        match self.tx.try_send(text) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("Notification queue full; dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("Notification queue closed; dropping message");
                false
            }
        }
    }
}

/// Drain the queue into `notifier` until every sender is gone.
pub async fn run_dispatcher(notifier: Arc<dyn Notifier>, mut rx: mpsc::Receiver<String>) {
    while let Some(text) = rx.recv().await {
        if let Err(e) = notifier.send(&text).await {
            tracing::warn!(error = %e, "Notification delivery failed");
        }
    }
    tracing::debug!("Notification dispatcher stopped");
}

pub fn spawn_dispatcher(
    notifier: Arc<dyn Notifier>,
    capacity: usize,
) -> (NotificationSender, JoinHandle<()>) {
    let (sender, rx) = NotificationSender::channel(capacity);
    let handle = tokio::spawn(run_dispatcher(notifier, rx));
    (sender, handle)
}
