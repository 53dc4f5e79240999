use std::time::Duration;

use hotelgate_auth::TokenRevoker;
use hotelgate_session::SessionManager;

use crate::navigator::Navigator;

/// Upper bound on the server-side revocation call.
pub const REVOKE_TIMEOUT: Duration = Duration::from_secs(3);

/// Clear this origin's session and send the user to the login page.
///
/// Only the current origin's entries are removed; other services keep
/// theirs until their own guard or logout runs. Revocation happens after the
/// local clear and its failure never blocks the navigation.
pub async fn logout(
    sessions: &SessionManager,
    navigator: &dyn Navigator,
    login_url: &str,
    revoker: Option<&dyn TokenRevoker>,
) -> String {
    let token = sessions.get().map(|s| s.token);

    if let Err(e) = sessions.clear() {
        tracing::warn!("failed to clear session on logout: {e}");
    }

    if let (Some(revoker), Some(token)) = (revoker, token.as_deref()) {
        match tokio::time::timeout(REVOKE_TIMEOUT, revoker.revoke(token)).await {
            Ok(Ok(())) => tracing::debug!("token revoked"),
            Ok(Err(e)) => tracing::warn!("token revocation failed: {e}"),
            Err(_) => tracing::warn!(timeout = ?REVOKE_TIMEOUT, "token revocation timed out"),
        }
    }

    tracing::info!(had_session = token.is_some(), "logged out");
    navigator.navigate(login_url);
    login_url.to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use hotelgate_auth::{CredentialExchange, Credentials, LoginError, Session, StaticDirectory};
    use hotelgate_session::InMemoryStorage;

    use super::*;
    use crate::navigator::RecordingNavigator;

    const LOGIN: &str = "http://localhost:8080/login";

    struct Unreachable;

    #[async_trait]
    impl TokenRevoker for Unreachable {
        async fn revoke(&self, _token: &str) -> Result<(), LoginError> {
            Err(LoginError::Transport("connection refused".into()))
        }
    }

    struct Stalls;

    #[async_trait]
    impl TokenRevoker for Stalls {
        async fn revoke(&self, _token: &str) -> Result<(), LoginError> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    async fn signed_in(directory: &StaticDirectory) -> SessionManager {
        let session: Session = directory
            .exchange(&Credentials::new("frontdesk", "frontdesk123"))
            .await
            .unwrap();
        let sessions = SessionManager::from_arc(Arc::new(InMemoryStorage::new()));
        sessions.set(&session).unwrap();
        sessions
    }

    #[tokio::test]
    async fn clears_revokes_and_navigates() {
        let directory = StaticDirectory::demo();
        let sessions = signed_in(&directory).await;
        let token = sessions.get().unwrap().token;
        let nav = RecordingNavigator::new();

        let target = logout(&sessions, &nav, LOGIN, Some(&directory)).await;

        assert_eq!(target, LOGIN);
        assert!(!sessions.is_present());
        assert!(!directory.is_active(&token));
        assert_eq!(nav.visits(), vec![LOGIN.to_string()]);
    }

    #[tokio::test]
    async fn revocation_failure_does_not_block_navigation() {
        let sessions = signed_in(&StaticDirectory::demo()).await;
        let nav = RecordingNavigator::new();

        logout(&sessions, &nav, LOGIN, Some(&Unreachable)).await;

        assert!(!sessions.is_present());
        assert_eq!(nav.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_revocation_is_abandoned() {
        let sessions = signed_in(&StaticDirectory::demo()).await;
        let nav = RecordingNavigator::new();

        let started = tokio::time::Instant::now();
        logout(&sessions, &nav, LOGIN, Some(&Stalls)).await;

        assert_eq!(started.elapsed(), REVOKE_TIMEOUT);
        assert_eq!(nav.count(), 1);
    }

    #[tokio::test]
    async fn logout_without_session_still_navigates() {
        let sessions = SessionManager::in_memory();
        let nav = RecordingNavigator::new();

        logout(&sessions, &nav, LOGIN, None).await;
        logout(&sessions, &nav, LOGIN, None).await;

        assert_eq!(nav.count(), 2);
    }
}
