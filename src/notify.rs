use async_trait::async_trait;
use tracing::info;

/// Outbound channel for tokens a user has to receive out of band.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn email_confirmation(&self, email: &str, token: &str) -> anyhow::Result<()>;
    async fn password_reset(&self, email: &str, token: &str) -> anyhow::Result<()>;
}

/// Writes each message to the log instead of sending mail.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn email_confirmation(&self, email: &str, token: &str) -> anyhow::Result<()> {
        info!(
            target: "contactbook::outbox",
            %email,
            link = %format!("/api/v1/auth/confirmed_email/{token}"),
            "email confirmation"
        );
        Ok(())
    }

    async fn password_reset(&self, email: &str, token: &str) -> anyhow::Result<()> {
        info!(target: "contactbook::outbox", %email, reset_token = %token, "password reset");
        Ok(())
    }
}
