//! Bounded exponential backoff for network-bound collaborators
//!
//! Only failures classified by [`CognitError::is_transient`](crate::error::CognitError::is_transient) are retried;
//! everything else, cancellation included, is returned on the first attempt.

use std::path::Path;
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use backoff::backoff::Backoff;

use crate::cache::{CloneOutput, Cloner, FetchOutput, Fetcher};
use crate::error::Result;

/// How often and how long to retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn from_millis(max_retries: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_millis(base_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms),
        }
    }

    /// Never retry
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delays slept between attempts: base, doubling, capped at `max_delay`
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        let mut backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.base_delay)
            .with_multiplier(2.0)
            .with_randomization_factor(0.0)
            .with_max_interval(self.max_delay)
            .with_max_elapsed_time(None)
            .build();
        let max_delay = self.max_delay;
        (0..self.max_retries).map(move |_| {
            backoff
                .next_backoff()
                .unwrap_or(max_delay)
                .min(max_delay)
        })
    }
}

/// Run `f`, retrying transient failures with `policy`
pub fn with_retry<T>(
    policy: &RetryPolicy,
    operation: &str,
    f: impl FnMut() -> Result<T>,
) -> Result<T> {
    with_retry_sleeping(policy, operation, std::thread::sleep, f)
}

/// [`with_retry`] with an injected sleep
pub fn with_retry_sleeping<T>(
    policy: &RetryPolicy,
    operation: &str,
    mut sleep: impl FnMut(Duration),
    mut f: impl FnMut() -> Result<T>,
) -> Result<T> {
    let mut delays = policy.delays();
    let mut attempt = 1u32;
    loop {
        match f() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() => {
                let Some(delay) = delays.next() else {
                    tracing::warn!(operation, attempt, error = %e, "giving up after retries");
                    return Err(e);
                };
                tracing::debug!(operation, attempt, delay_ms = delay.as_millis(), error = %e, "retrying");
                sleep(delay);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// [`Cloner`] that retries transient failures of another cloner
#[derive(Debug, Clone)]
pub struct RetryingCloner<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C: Cloner> RetryingCloner<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }
}

impl<C: Cloner> Cloner for RetryingCloner<C> {
    fn clone_repo(&self, url: &str, git_ref: Option<&str>) -> Result<CloneOutput> {
        with_retry(&self.policy, "clone", || self.inner.clone_repo(url, git_ref))
    }

    fn cleanup(&self, path: &Path) {
        self.inner.cleanup(path);
    }
}

/// [`Fetcher`] that retries transient failures of another fetcher
#[derive(Debug, Clone)]
pub struct RetryingFetcher<F> {
    inner: F,
    policy: RetryPolicy,
}

impl<F: Fetcher> RetryingFetcher<F> {
    pub fn new(inner: F, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<F: Fetcher> Fetcher for RetryingFetcher<F> {
    fn fetch(&self, url: &str) -> Result<FetchOutput> {
        with_retry(&self.policy, "fetch", || self.inner.fetch(url))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use super::*;
    use crate::error::{NetworkErrorKind, clone_failed, network};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_default_policy_delays() {
        let delays: Vec<_> = RetryPolicy::default().delays().collect();
        assert_eq!(delays, vec![ms(500), ms(1000)]);
    }

    #[test]
    fn test_delays_are_capped() {
        let delays: Vec<_> = RetryPolicy::from_millis(5, 2000, 5000).delays().collect();
        assert_eq!(delays, vec![ms(2000), ms(4000), ms(5000), ms(5000), ms(5000)]);
    }

    #[test]
    fn test_transient_failures_are_retried() {
        let attempts = Cell::new(0);
        let mut slept = Vec::new();

        let result = with_retry_sleeping(
            &RetryPolicy::default(),
            "clone",
            |d| slept.push(d),
            || {
                attempts.set(attempts.get() + 1);
                if attempts.get() < 3 {
                    Err(network("clone", NetworkErrorKind::ConnectionReset, "reset"))
                } else {
                    Ok(attempts.get())
                }
            },
        );

        assert_eq!(result.unwrap(), 3);
        assert_eq!(slept, vec![ms(500), ms(1000)]);
    }

    #[test]
    fn test_gives_up_after_max_retries() {
        let attempts = Cell::new(0);
        let result: Result<()> = with_retry_sleeping(
            &RetryPolicy::default(),
            "fetch",
            |_| {},
            || {
                attempts.set(attempts.get() + 1);
                Err(network("fetch", NetworkErrorKind::Timeout, "slow"))
            },
        );
        assert!(result.is_err());
        assert_eq!(attempts.get(), 3);
    }

    #[test]
    fn test_permanent_and_cancelled_failures_are_not_retried() {
        for err in [
            network("fetch", NetworkErrorKind::Cancelled, "aborted"),
            network("fetch", NetworkErrorKind::Other, "404"),
            clone_failed("https://x", "auth"),
        ] {
            assert!(!err.is_transient());
            let attempts = Cell::new(0);
            let mut err = Some(err);
            let result: Result<()> = with_retry_sleeping(
                &RetryPolicy::default(),
                "fetch",
                |_| panic!("must not sleep"),
                || {
                    attempts.set(attempts.get() + 1);
                    Err(err.take().unwrap())
                },
            );
            assert!(result.is_err());
            assert_eq!(attempts.get(), 1);
        }
    }

    struct FlakyCloner {
        failures_left: Mutex<u32>,
    }

    impl Cloner for FlakyCloner {
        fn clone_repo(&self, url: &str, _git_ref: Option<&str>) -> Result<CloneOutput> {
            let mut left = self.failures_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Err(network("clone", NetworkErrorKind::ConnectionRefused, url));
            }
            Ok(CloneOutput {
                path: PathBuf::from("/tmp/x"),
                etag: None,
            })
        }

        fn cleanup(&self, _path: &Path) {}
    }

    #[test]
    fn test_retrying_cloner() {
        let policy = RetryPolicy::from_millis(2, 0, 0);
        let cloner = RetryingCloner::new(
            FlakyCloner {
                failures_left: Mutex::new(2),
            },
            policy,
        );
        assert!(cloner.clone_repo("https://x", None).is_ok());

        let cloner = RetryingCloner::new(
            FlakyCloner {
                failures_left: Mutex::new(3),
            },
            policy,
        );
        assert!(cloner.clone_repo("https://x", None).is_err());
        assert_eq!(*cloner.inner().failures_left.lock().unwrap(), 0);
    }

    struct CountingFetcher {
        calls: Mutex<u32>,
    }

    impl Fetcher for CountingFetcher {
        fn fetch(&self, url: &str) -> Result<FetchOutput> {
            *self.calls.lock().unwrap() += 1;
            Err(network("fetch", NetworkErrorKind::Fetch, url))
        }
    }

    #[test]
    fn test_retrying_fetcher() {
        let fetcher = RetryingFetcher::new(
            CountingFetcher {
                calls: Mutex::new(0),
            },
            RetryPolicy::from_millis(1, 0, 0),
        );
        assert!(fetcher.fetch("https://x").is_err());
        assert_eq!(*fetcher.inner.calls.lock().unwrap(), 2);
    }
}
