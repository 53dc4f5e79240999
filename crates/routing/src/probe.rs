//! Reachability probing of destination origins.
//!
//! Two probes exist:
//! - [`OpaqueProbe`] only learns whether a network-level failure happened;
//!   any HTTP answer, whatever its status, counts as reachable.
//! - [`HealthProbe`] asks a health endpoint and requires a success status.
//!
//! Both run under a [`ProbePolicy`] that bounds time and attempts.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use hotelgate_core::OriginUrl;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("probe timed out after {0:?}")]
    TimedOut(Duration),

    #[error("unhealthy status {0}")]
    Status(u16),
}

#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    async fn probe(&self, target: &OriginUrl) -> Result<(), ProbeError>;
}

fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// `HEAD` against the origin; the response itself is ignored.
#[derive(Debug, Clone)]
pub struct OpaqueProbe {
    client: reqwest::Client,
}

impl OpaqueProbe {
    pub fn new() -> Self {
        Self {
            client: no_redirect_client(),
        }
    }
}

impl Default for OpaqueProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReachabilityProbe for OpaqueProbe {
    async fn probe(&self, target: &OriginUrl) -> Result<(), ProbeError> {
        self.client
            .head(target.as_str())
            .send()
            .await
            .map(|_| ())
            .map_err(|e| ProbeError::Network(e.to_string()))
    }
}

/// `GET {origin}/health`, success status required.
#[derive(Debug, Clone)]
pub struct HealthProbe {
    client: reqwest::Client,
    path: String,
}

impl HealthProbe {
    pub fn new() -> Self {
        Self::with_path("/health")
    }

    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            client: no_redirect_client(),
            path: path.into(),
        }
    }
}

impl Default for HealthProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReachabilityProbe for HealthProbe {
    async fn probe(&self, target: &OriginUrl) -> Result<(), ProbeError> {
        let res = self
            .client
            .get(target.join(&self.path))
            .send()
            .await
            .map_err(|e| ProbeError::Network(e.to_string()))?;

        if res.status().is_success() {
            Ok(())
        } else {
            Err(ProbeError::Status(res.status().as_u16()))
        }
    }
}

/// Bounded probing: attempt count, per-attempt timeout and exponential
/// backoff between attempts.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ProbePolicy {
    pub attempts: u32,
    pub timeout: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl ProbePolicy {
    /// One attempt, no retry.
    pub fn single(timeout: Duration) -> Self {
        Self {
            attempts: 1,
            timeout,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    pub fn exponential(attempts: u32, timeout: Duration, initial_backoff: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            timeout,
            initial_backoff,
            max_backoff: initial_backoff.saturating_mul(8),
        }
    }

    /// Delay after the failed attempt with the given zero-based index.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_backoff.saturating_mul(factor).min(self.max_backoff)
    }
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self::single(Duration::from_secs(3))
    }
}

/// Run `probe` against `target` until it succeeds or the policy is spent.
///
/// A timed-out attempt is dropped, not cancelled on the remote side.
pub async fn probe_with_policy(
    probe: &dyn ReachabilityProbe,
    target: &OriginUrl,
    policy: &ProbePolicy,
) -> Result<(), ProbeError> {
    let attempts = policy.attempts.max(1);
    let mut last = ProbeError::TimedOut(policy.timeout);

    for attempt in 0..attempts {
        let outcome = match tokio::time::timeout(policy.timeout, probe.probe(target)).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::TimedOut(policy.timeout)),
        };

        match outcome {
            Ok(()) => return Ok(()),
            Err(e) => {
                tracing::warn!(target_url = %target, attempt = attempt + 1, attempts, "probe failed: {e}");
                last = e;
                if attempt + 1 < attempts {
                    tokio::time::sleep(policy.backoff(attempt)).await;
                }
            }
        }
    }

    Err(last)
}
