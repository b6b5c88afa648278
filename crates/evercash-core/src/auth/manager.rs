use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{Credential, IdentityProvider};
use crate::clock::Clock;
use crate::coalesce::Coalescer;
use crate::storage::{self, KeyValueStore, CREDENTIAL_KEY};
use crate::utils::format::token_preview;

/// Refresh when less than this many minutes of lifetime remain.
const REFRESH_THRESHOLD_MINUTES: i64 = 10;

/// Background check interval (5 minutes), independent of request traffic.
const REFRESH_INTERVAL_SECS: u64 = 5 * 60;

/// Owns the stored credential.
///
/// At most one refresh is in flight at a time; every concurrent caller
/// shares its result. Only this type (and explicit sign-out) writes the
/// credential storage key.
pub struct CredentialManager {
    inner: Arc<Inner>,
    refresh_interval: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

struct Inner {
    identity: Arc<dyn IdentityProvider>,
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    threshold: ChronoDuration,
    refresh: Coalescer<(), Option<Credential>>,
}

impl CredentialManager {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                identity,
                storage,
                clock,
                threshold: ChronoDuration::minutes(REFRESH_THRESHOLD_MINUTES),
                refresh: Coalescer::new(),
            }),
            refresh_interval: Duration::from_secs(REFRESH_INTERVAL_SECS),
            timer: Mutex::new(None),
        }
    }

    /// Override the background check interval.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.inner.clock
    }

    /// The stored credential, without any freshness check.
    pub fn current(&self) -> Option<Credential> {
        self.inner.current()
    }

    /// Return a credential that is fresh when possible.
    ///
    /// Refreshes when the stored credential is missing, malformed or close to
    /// expiry. A failed refresh returns the previous credential unchanged so
    /// the request-level 401 retry still gets its chance.
    pub async fn ensure_fresh_token(&self) -> Option<Credential> {
        self.inner.ensure_fresh().await
    }

    /// Refresh regardless of remaining lifetime, after `rejected` was refused.
    ///
    /// Joins a refresh already in flight when that one yields a different
    /// token. Returns `None` unless a credential other than `rejected` was
    /// obtained.
    pub async fn force_refresh(&self, rejected: Option<&str>) -> Option<Credential> {
        let is_new = |credential: &Credential| Some(credential.token()) != rejected;

        if let Some(in_flight) = self.inner.refresh.join(&()) {
            debug!("Refresh already in progress, waiting for it");
            if let Some(credential) = in_flight.await.filter(|c| is_new(c)) {
                return Some(credential);
            }
        }

        let inner = Arc::clone(&self.inner);
        self.inner
            .refresh
            .run((), move || async move { inner.refresh_from_provider().await })
            .await
            .filter(|c| is_new(c))
    }

    /// Store a credential obtained by an explicit sign-in.
    pub fn sign_in(&self, credential: &Credential) {
        self.inner.persist(credential);
    }

    /// Forget the stored credential and end the provider session.
    pub async fn sign_out(&self) {
        storage::remove(self.inner.storage.as_ref(), CREDENTIAL_KEY);
        if let Err(e) = self.inner.identity.sign_out().await {
            warn!(error = %e, "Identity provider sign-out failed");
        }
        info!("Signed out, credential removed");
    }

    /// Start the proactive refresh timer. Returns `false` if it is already
    /// running. Must be called from within a tokio runtime.
    pub fn start_background_refresh(&self) -> bool {
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if timer.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("Background refresh already running");
            return false;
        }

        let inner = Arc::clone(&self.inner);
        let period = self.refresh_interval;
        *timer = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                debug!("Background credential check");
                inner.ensure_fresh().await;
            }
        }));

        info!(interval_secs = period.as_secs(), "Started proactive token refresh");
        true
    }

    /// Stop the proactive refresh timer. Returns `false` if it was not running.
    pub fn stop_background_refresh(&self) -> bool {
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        match timer.take() {
            Some(handle) => {
                handle.abort();
                info!("Stopped proactive token refresh");
                true
            }
            None => false,
        }
    }

    pub fn is_background_refresh_running(&self) -> bool {
        let timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        timer.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for CredentialManager {
    fn drop(&mut self) {
        let timer = self.timer.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = timer.take() {
            handle.abort();
        }
    }
}

impl Inner {
    fn current(&self) -> Option<Credential> {
        storage::read(self.storage.as_ref(), CREDENTIAL_KEY).map(Credential::from_token)
    }

    fn persist(&self, credential: &Credential) {
        storage::write(self.storage.as_ref(), CREDENTIAL_KEY, credential.token());
    }

    async fn ensure_fresh(self: &Arc<Self>) -> Option<Credential> {
        if let Some(in_flight) = self.refresh.join(&()) {
            debug!("Token refresh already in progress, waiting");
            return in_flight.await;
        }
        let inner = Arc::clone(self);
        self.refresh
            .run((), move || async move { inner.check_and_refresh().await })
            .await
    }

    async fn check_and_refresh(&self) -> Option<Credential> {
        let mut candidate = self.current();

        if candidate.is_none() {
            debug!("No token found, asking identity provider for the current session");
            match self.identity.get_session().await {
                Ok(Some(credential)) => {
                    self.persist(&credential);
                    candidate = Some(credential);
                }
                Ok(None) => debug!("Identity provider has no session"),
                Err(e) => warn!(error = %e, "Failed to read current session"),
            }
        }

        let now = self.clock.now();
        let needs_refresh = candidate
            .as_ref()
            .map_or(true, |c| c.needs_refresh(now, self.threshold));
        if !needs_refresh {
            return candidate;
        }

        if let Some(credential) = &candidate {
            debug!(
                minutes_left = ?credential.minutes_until_expiry(now),
                "Token expires soon or is malformed, refreshing"
            );
        }

        match self.refresh_from_provider().await {
            Some(fresh) => Some(fresh),
            None => candidate,
        }
    }

    async fn refresh_from_provider(&self) -> Option<Credential> {
        match self.identity.refresh_session().await {
            Ok(Some(credential)) => {
                self.persist(&credential);
                info!(token = %token_preview(credential.token()), "Token refreshed");
                Some(credential)
            }
            Ok(None) => {
                debug!("Identity provider returned no session on refresh");
                None
            }
            Err(e) => {
                warn!(error = %e, "Session refresh failed");
                None
            }
        }
    }
}
