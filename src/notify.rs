// src/notify.rs

use async_trait::async_trait;

/// Outbound notification service.
///
/// Calls are best-effort and must never block or fail the request path;
/// handlers dispatch them with `tokio::spawn`.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_welcome(&self, email: &str, name: &str);
}

/// Default notifier that only logs. Real email delivery is an external
/// collaborator wired in at deployment time.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_welcome(&self, email: &str, name: &str) {
        tracing::info!("welcome notification queued for {} <{}>", name, email);
    }
}
