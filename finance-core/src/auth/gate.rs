use std::time::Duration;

use async_trait::async_trait;

/// How often [`AuthGate::wait_for_auth`] re-checks.
pub const AUTH_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Answers "is someone logged in?" for the wizard.
#[async_trait]
pub trait AuthGate: Send + Sync {
    /// Cheap check against the current session.
    fn is_authenticated(&self) -> bool;

    /// Drop corrupt session data first, then check.
    async fn force_auth_check(&self) -> bool;

    /// Poll [`AuthGate::is_authenticated`] until it holds or `timeout`
    /// passes. Covers a login that finishes just after navigation.
    async fn wait_for_auth(
        &self,
        timeout: Duration,
    ) -> bool {
        let started = tokio::time::Instant::now();
        loop {
            if self.is_authenticated() {
                return true;
            }
            if started.elapsed() >= timeout {
                return false;
            }
            tokio::time::sleep(AUTH_POLL_INTERVAL).await;
        }
    }
}
