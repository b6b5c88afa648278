//! The session controller picks the backend (real client or demo overlay),
//! builds it at most once per initialization, and tracks whether the
//! session is authenticated.
//!
//! States: `Uninitialized -> Initializing -> Ready | Failed`. Concurrent
//! `initialize` calls share one in-flight run.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::api::{ApiError, BudgetApi, RealClient, RequestClient, Transport};
use crate::auth::{Credential, CredentialManager};
use crate::cache::ResponseCache;
use crate::coalesce::Coalescer;
use crate::models::LocaleHint;
use crate::notify::Notifier;
use crate::overlay::{self, OverlayClient, OverlayDataset};
use crate::storage::KeyValueStore;

pub type Handle = Arc<dyn BudgetApi>;

#[derive(Clone)]
pub enum SessionState {
    Uninitialized,
    Initializing,
    Ready { handle: Handle, authenticated: bool },
    Failed(ApiError),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Initializing => "initializing",
            SessionState::Ready { .. } => "ready",
            SessionState::Failed(_) => "failed",
        }
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Ready { handle, authenticated } => f
                .debug_struct("Ready")
                .field("handle", handle)
                .field("authenticated", authenticated)
                .finish(),
            SessionState::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
            other => f.write_str(other.name()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub api_base_url: String,
    /// Confirm a credential by issuing one read during initialization.
    pub verify_on_init: bool,
    pub locale: LocaleHint,
}

/// The backend currently handed out, and the overlay flag it was built for.
struct Built {
    overlay_enabled: bool,
    handle: Handle,
}

struct Inner {
    options: SessionOptions,
    transport: Arc<dyn Transport>,
    credentials: Arc<CredentialManager>,
    storage: Arc<dyn KeyValueStore>,
    cache: Arc<ResponseCache>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<SessionState>,
    real: Mutex<Option<Arc<RealClient>>>,
    built: Mutex<Option<Built>>,
    init: Coalescer<(), Result<Handle, ApiError>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    pub fn new(
        options: SessionOptions,
        transport: Arc<dyn Transport>,
        credentials: Arc<CredentialManager>,
        storage: Arc<dyn KeyValueStore>,
        cache: Arc<ResponseCache>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                options,
                transport,
                credentials,
                storage,
                cache,
                notifier,
                state: Mutex::new(SessionState::Uninitialized),
                real: Mutex::new(None),
                built: Mutex::new(None),
                init: Coalescer::new(),
            }),
        }
    }

    /// Bring the session up, or join the initialization already running.
    ///
    /// A `Ready` session whose backend still matches the demo-mode flag is
    /// returned as is.
    pub async fn initialize(&self) -> Result<Handle, ApiError> {
        if let SessionState::Ready { handle, .. } = self.state() {
            if handle.is_demo() == self.is_demo_mode() {
                return Ok(handle);
            }
            debug!("Demo mode flag changed since the handle was built");
        }
        self.run_initialize().await
    }

    /// Re-run initialization from `Ready` or `Failed` (user asked to reconnect).
    pub async fn retry_connection(&self) -> Result<Handle, ApiError> {
        info!("Retrying connection");
        self.run_initialize().await
    }

    async fn run_initialize(&self) -> Result<Handle, ApiError> {
        let inner = Arc::clone(&self.inner);
        self.inner
            .init
            .run((), move || async move { inner.initialize().await })
            .await
    }

    pub fn state(&self) -> SessionState {
        lock(&self.inner.state).clone()
    }

    /// The active handle; `None` unless the session is `Ready`.
    pub fn handle(&self) -> Option<Handle> {
        match &*lock(&self.inner.state) {
            SessionState::Ready { handle, .. } => Some(Arc::clone(handle)),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(
            &*lock(&self.inner.state),
            SessionState::Ready { authenticated: true, .. }
        )
    }

    pub fn is_demo_mode(&self) -> bool {
        overlay::is_enabled(self.inner.storage.as_ref())
    }

    pub fn credentials(&self) -> &Arc<CredentialManager> {
        &self.inner.credentials
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.inner.cache
    }

    /// Persist the demo-mode flag and re-initialize onto the matching backend.
    pub async fn set_demo_mode(&self, enabled: bool) -> Result<Handle, ApiError> {
        overlay::set_enabled(self.inner.storage.as_ref(), enabled);
        info!(enabled = enabled, "Demo mode changed");
        self.initialize().await
    }

    pub async fn exit_demo_mode(&self) -> Result<Handle, ApiError> {
        self.set_demo_mode(false).await
    }

    /// Reseed the demo dataset. An active overlay is rebuilt on it.
    pub async fn reset_demo_data(&self) -> Result<Option<Handle>, ApiError> {
        let today = self.inner.credentials.clock().now().date_naive();
        OverlayDataset::reset(self.inner.storage.as_ref(), today);
        info!("Demo dataset reset");

        let demo_active = lock(&self.inner.built)
            .as_ref()
            .is_some_and(|built| built.overlay_enabled);
        if !demo_active {
            return Ok(None);
        }
        *lock(&self.inner.built) = None;
        self.run_initialize().await.map(Some)
    }

    /// Store a credential from an explicit sign-in and reconnect with it.
    pub async fn sign_in(&self, credential: &Credential) -> Result<Handle, ApiError> {
        self.inner.credentials.sign_in(credential);
        self.retry_connection().await
    }

    /// Forget the credential and drop cached data. The handle stays usable
    /// but the session reports unauthenticated (demo sessions excepted).
    pub async fn sign_out(&self) {
        self.inner.credentials.sign_out().await;
        self.inner.cache.clear_all();
        let mut state = lock(&self.inner.state);
        if let SessionState::Ready { handle, authenticated } = &mut *state {
            *authenticated = handle.is_demo();
        }
    }

    /// Stop the background credential refresh.
    pub fn shutdown(&self) {
        self.inner.credentials.stop_background_refresh();
        debug!("Session shut down");
    }
}

impl Inner {
    fn set_state(&self, state: SessionState) {
        debug!(state = state.name(), "Session state changed");
        *lock(&self.state) = state;
    }

    async fn initialize(&self) -> Result<Handle, ApiError> {
        self.set_state(SessionState::Initializing);
        self.credentials.start_background_refresh();

        let overlay_enabled = overlay::is_enabled(self.storage.as_ref());
        let handle = match self.handle_for(overlay_enabled) {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = %e, "Session initialization failed");
                self.notifier.error(&format!("Could not connect: {}", e));
                self.set_state(SessionState::Failed(e.clone()));
                return Err(e);
            }
        };

        let authenticated = if overlay_enabled {
            true
        } else {
            self.check_authenticated(&handle).await
        };

        info!(demo = overlay_enabled, authenticated = authenticated, "Session ready");
        self.set_state(SessionState::Ready {
            handle: Arc::clone(&handle),
            authenticated,
        });
        Ok(handle)
    }

    /// The handle for the current flag, rebuilding from the real client when
    /// the flag differs from the one the current handle was built for.
    fn handle_for(&self, overlay_enabled: bool) -> Result<Handle, ApiError> {
        let mut built = lock(&self.built);
        if let Some(current) = built.as_ref() {
            if current.overlay_enabled == overlay_enabled {
                return Ok(Arc::clone(&current.handle));
            }
            info!(demo = overlay_enabled, "Switching backend, clearing cache");
            self.cache.clear_all();
        }

        let real: Handle = self.real_client()?;
        let handle: Handle = if overlay_enabled {
            let today = self.credentials.clock().now().date_naive();
            let dataset = OverlayDataset::load(self.storage.as_ref(), today);
            Arc::new(OverlayClient::new(real, dataset, Arc::clone(&self.notifier)))
        } else {
            real
        };

        *built = Some(Built {
            overlay_enabled,
            handle: Arc::clone(&handle),
        });
        Ok(handle)
    }

    fn real_client(&self) -> Result<Arc<RealClient>, ApiError> {
        let mut real = lock(&self.real);
        if let Some(client) = real.as_ref() {
            return Ok(Arc::clone(client));
        }
        let requests = RequestClient::new(
            &self.options.api_base_url,
            Arc::clone(&self.transport),
            Arc::clone(&self.credentials),
        )?
        .with_notifier(Arc::clone(&self.notifier));
        let client = Arc::new(
            RealClient::new(requests, Arc::clone(&self.cache)).with_locale(self.options.locale.clone()),
        );
        *real = Some(Arc::clone(&client));
        Ok(client)
    }

    async fn check_authenticated(&self, handle: &Handle) -> bool {
        let credential = self.credentials.ensure_fresh_token().await;
        let now = self.credentials.clock().now();
        let usable = credential.as_ref().is_some_and(|c| c.is_bearer_ready(now));
        if !usable {
            debug!("No usable credential, session is unauthenticated");
            return false;
        }
        if !self.options.verify_on_init {
            return true;
        }
        match handle.get_accounts().await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Credential check failed, continuing unauthenticated");
                false
            }
        }
    }
}
