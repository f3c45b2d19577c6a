//! PageLoader - load-once page script cache with single-flight loads.
//!
//! Provides:
//! - A per-route cache of completed loads (artifact or error)
//! - Single-flight load initiation: concurrent requests for one uncached
//!   route share exactly one underlying load
//! - Waiter fan-out: every pending request for a route settles when that
//!   route's completion fires
//!
//! Loads complete through [`PageLoader::register_page`], which the loaded
//! script itself is expected to call. The loader only synthesizes a
//! completion on transport failure.

use crate::error::{LoaderError, Result};
use crate::host::DynScriptHost;
use crate::route::{normalize_route, page_script_url};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Outcome of a completed load, as cached and fanned out to waiters.
type Outcome<P> = Result<P>;

struct State<P> {
    /// Completed loads by normalized route. Entries never expire; only
    /// `clear_cache` removes them.
    cache: HashMap<String, Outcome<P>>,
    /// Routes with a load initiated but not yet completed.
    loading: HashSet<String>,
    /// Pending waiters by normalized route, drained exactly once when the
    /// route's completion fires.
    waiters: HashMap<String, Vec<oneshot::Sender<Outcome<P>>>>,
}

struct Inner<P> {
    build_id: String,
    host: DynScriptHost,
    state: Mutex<State<P>>,
}

/// Load-once page script loader.
///
/// Generic over the page artifact type `P` that loaded scripts register.
/// Cloning produces another handle to the same cache; construct one loader
/// per application runtime context rather than sharing a global.
///
/// All state lives behind one lock and no critical section spans an await,
/// which makes check-cache / register-waiter / mark-in-flight a single
/// atomic step. That step is the single-flight guarantee.
pub struct PageLoader<P> {
    inner: Arc<Inner<P>>,
}

impl<P> Clone for PageLoader<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: Clone + Send + 'static> PageLoader<P> {
    /// Create a loader for one deployment.
    ///
    /// `build_id` namespaces script locators across deployments; it is
    /// percent-encoded into every locator this loader builds.
    pub fn new(build_id: impl Into<String>, host: DynScriptHost) -> Self {
        Self {
            inner: Arc::new(Inner {
                build_id: build_id.into(),
                host,
                state: Mutex::new(State {
                    cache: HashMap::new(),
                    loading: HashSet::new(),
                    waiters: HashMap::new(),
                }),
            }),
        }
    }

    /// The build identifier this loader was constructed with.
    pub fn build_id(&self) -> &str {
        &self.inner.build_id
    }

    /// Look up a route's cached outcome without triggering a load.
    ///
    /// Returns `Ok(None)` when the route has never completed a load,
    /// `Ok(Some(page))` for a cached artifact, and the cached error for a
    /// route whose load failed. Never blocks.
    pub fn load_page_sync(&self, route: &str) -> Result<Option<P>> {
        let route = normalize_route(route)?;

        match self.state().cache.get(&route) {
            None => Ok(None),
            Some(Ok(page)) => Ok(Some(page.clone())),
            Some(Err(err)) => Err(err.clone()),
        }
    }

    /// Load the page for a route, fetching its script at most once.
    ///
    /// A cached outcome settles immediately. Otherwise this registers a
    /// waiter and, if no load is in flight for the route, initiates one;
    /// concurrent callers for the same uncached route share that single
    /// load and all settle together when it completes.
    ///
    /// There is no timeout and no cancellation: a script that is delivered
    /// but never registers leaves its waiters pending until it does.
    pub async fn load_page(&self, route: &str) -> Result<P> {
        let route = normalize_route(route)?;

        let rx = {
            let mut state = self.state();
            if let Some(outcome) = state.cache.get(&route) {
                debug!("Cache hit for {}", route);
                return outcome.clone();
            }

            let (tx, rx) = oneshot::channel();
            state.waiters.entry(route.clone()).or_default().push(tx);

            // Initiate the load unless one is already in flight.
            if state.loading.insert(route.clone()) {
                self.start_load(route.clone());
            }

            rx
        };

        match rx.await {
            Ok(outcome) => outcome,
            // Sender dropped without firing: the loader went away.
            Err(_) => Err(LoaderError::LoadFailed { route }),
        }
    }

    /// Record a route's completion and notify its waiters.
    ///
    /// This is the handshake entry point loaded scripts call once they have
    /// finished defining themselves; the transport-failure path uses it too.
    /// `error` takes precedence over `page`; a registration carrying
    /// neither is recorded as a load failure. The outcome overwrites any
    /// prior cache entry for the route.
    pub fn register_page(&self, route: &str, error: Option<LoaderError>, page: Option<P>) -> Result<()> {
        let route = normalize_route(route)?;

        let outcome = match (error, page) {
            (Some(err), _) => Err(err),
            (None, Some(page)) => Ok(page),
            (None, None) => Err(LoaderError::LoadFailed {
                route: route.clone(),
            }),
        };

        self.complete(&route, outcome);
        Ok(())
    }

    /// Drop a route's cache entry and in-flight marker.
    ///
    /// Pending waiters stay registered; after invalidation they can only be
    /// satisfied by a newly initiated load. No-op when nothing is cached.
    pub fn clear_cache(&self, route: &str) -> Result<()> {
        let route = normalize_route(route)?;

        let mut state = self.state();
        state.cache.remove(&route);
        state.loading.remove(&route);
        Ok(())
    }

    /// Build the locator and hand the fetch to the script host.
    ///
    /// A host error is a transport failure and completes the route with a
    /// load error. Host success completes nothing; the loaded script is
    /// expected to call `register_page` itself.
    fn start_load(&self, route: String) {
        let url = page_script_url(&self.inner.build_id, &route);
        info!("Loading page script for {} from {}", route, url);

        let loader = self.clone();
        tokio::spawn(async move {
            if let Err(err) = loader.inner.host.inject(&url).await {
                warn!("Transport failure for {}: {}", route, err);
                let failed = LoaderError::LoadFailed {
                    route: route.clone(),
                };
                loader.complete(&route, Err(failed));
            }
        });
    }

    /// Write an outcome into the cache and fan it out to current waiters.
    ///
    /// The in-flight marker is cleared here so marker and cache entry stay
    /// paired: a marker exists only while a load is in flight and uncached.
    fn complete(&self, route: &str, outcome: Outcome<P>) {
        let waiters = {
            let mut state = self.state();
            state.cache.insert(route.to_string(), outcome.clone());
            state.loading.remove(route);
            state.waiters.remove(route).unwrap_or_default()
        };

        debug!("Completed load for {} ({} waiters)", route, waiters.len());
        for waiter in waiters {
            // A waiter whose future was dropped is fine to skip.
            let _ = waiter.send(outcome.clone());
        }
    }

    /// Lock the loader state.
    ///
    /// State mutations are plain map operations that cannot be observed
    /// half-done, so a panicked holder leaves the state consistent; recover
    /// rather than propagate poison.
    fn state(&self) -> MutexGuard<'_, State<P>> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
