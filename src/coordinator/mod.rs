// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Coordinator: registers the process with the prodwatch server and polls it
//! for names to watch.
//!
//! # Lifecycle
//!
//! 1. [`Coordinator::new`] builds the authenticated client (fails without a token).
//! 2. [`Coordinator::check_connection`] sends the `add-process` registration.
//! 3. [`Coordinator::start`] spawns the poll task; [`Coordinator::stop`] ends it.
//!
//! The poll task owns the [`PollWorker`] and hands it back when it exits, so
//! the watched set survives a stop/start cycle.

mod identity;
mod poller;
mod protocol;
mod remote;

pub use identity::{
    IdentityProvider, NetworkIdentity, ProcessIdentity, RuntimeEnvironment, SystemHardware,
    SystemIdentification, SystemIdentity,
};
pub use poller::PollWorker;
pub use protocol::{
    AddProcessEvent, FunctionCallEvent, PendingFunctionNames, WatcherEvent, EVENTS_PATH,
    EVENT_ADD_PROCESS, EVENT_CONFIRM_WATCHER, EVENT_FAILED_WATCHER, EVENT_LOG_FUNCTION_CALL,
    PENDING_FUNCTION_NAMES_PATH,
};
pub use remote::{HttpRemote, RemoteReporter, RemoteService};

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, OnceCell};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::{load_config, AgentConfig, FileConfig};
use crate::error::CoordinatorError;
use crate::manager::FunctionManager;
use crate::runtime::SymbolRegistry;

struct RunningLoop {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<PollWorker>,
}

struct LoopState {
    idle: Option<PollWorker>,
    running: Option<RunningLoop>,
}

/// Drives registration and the poll loop for one process.
pub struct Coordinator {
    process_id: Uuid,
    app_name: String,
    poll_interval: Duration,
    remote: Arc<dyn RemoteService>,
    registry: Arc<dyn SymbolRegistry>,
    identity: Arc<dyn IdentityProvider>,
    registration: OnceCell<bool>,
    active: AtomicBool,
    state: Mutex<LoopState>,
}

impl Coordinator {
    /// Build a coordinator talking HTTP to the configured server.
    ///
    /// Fails with [`CoordinatorError::MissingToken`] when no API token is configured.
    pub fn new(
        config: &AgentConfig,
        registry: Arc<dyn SymbolRegistry>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, CoordinatorError> {
        let process_id = Uuid::new_v4();
        let remote = HttpRemote::new(config, process_id)?;
        Ok(Self::with_remote(
            config,
            process_id,
            Arc::new(remote),
            registry,
            identity,
        ))
    }

    /// Build a coordinator over an arbitrary [`RemoteService`].
    pub fn with_remote(
        config: &AgentConfig,
        process_id: Uuid,
        remote: Arc<dyn RemoteService>,
        registry: Arc<dyn SymbolRegistry>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let worker = build_worker(&remote, &registry);
        Self {
            process_id,
            app_name: config.app_name.clone(),
            poll_interval: config.poll_interval,
            remote,
            registry,
            identity,
            registration: OnceCell::new(),
            active: AtomicBool::new(false),
            state: Mutex::new(LoopState {
                idle: Some(worker),
                running: None,
            }),
        }
    }

    pub fn process_id(&self) -> Uuid {
        self.process_id
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Check if the poll task is running.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Check if the startup registration succeeded.
    pub fn is_registered(&self) -> bool {
        self.registration.get().copied().unwrap_or(false)
    }

    /// Register this process with the server.
    ///
    /// Returns `true` only if the server accepted the registration. The
    /// handshake runs at most once; later calls return the first outcome, so
    /// a rejected process stays uninstrumented for the life of the coordinator.
    pub async fn check_connection(&self) -> bool {
        *self.registration.get_or_init(|| self.register()).await
    }

    async fn register(&self) -> bool {
        let identity = Arc::clone(&self.identity);
        let system_info = match tokio::task::spawn_blocking(move || identity.identify()).await {
            Ok(info) => info,
            Err(err) => {
                warn!(error = %err, "Failed to collect system identity");
                serde_json::Value::Null
            }
        };

        match self.remote.add_process(&system_info).await {
            Ok(()) => true,
            Err(err) => {
                error!(error = %err, "Failed to connect to prodwatch server; instrumentation disabled");
                false
            }
        }
    }

    /// Start the poll task. Calling it while already active does nothing.
    pub async fn start(&self) -> Result<(), CoordinatorError> {
        if !self.is_registered() {
            return Err(CoordinatorError::NotRegistered);
        }

        let mut state = self.state.lock().await;
        if state.running.is_some() {
            debug!("Poll loop already running");
            return Ok(());
        }

        let worker = match state.idle.take() {
            Some(worker) => worker,
            None => build_worker(&self.remote, &self.registry),
        };
        let (shutdown, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(polling_loop(worker, self.poll_interval, shutdown_rx));

        state.running = Some(RunningLoop { shutdown, handle });
        self.active.store(true, Ordering::SeqCst);
        info!(
            process_id = %self.process_id,
            app_name = %self.app_name,
            interval_secs = self.poll_interval.as_secs_f64(),
            "Started polling prodwatch server"
        );
        Ok(())
    }

    /// Signal the poll task and wait for it to exit. Does nothing when inactive.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        let Some(running) = state.running.take() else {
            return;
        };

        let _ = running.shutdown.send(true);
        match running.handle.await {
            Ok(worker) => state.idle = Some(worker),
            Err(err) => {
                error!(error = %err, "Poll task ended abnormally; watched set was lost");
                state.idle = Some(build_worker(&self.remote, &self.registry));
            }
        }
        self.active.store(false, Ordering::SeqCst);
        info!("Stopped polling prodwatch server");
    }

    /// Number of names watched so far. Only available while the loop is stopped.
    pub async fn watched_count(&self) -> Option<usize> {
        let state = self.state.lock().await;
        state.idle.as_ref().map(PollWorker::watched_count)
    }
}

fn build_worker(
    remote: &Arc<dyn RemoteService>,
    registry: &Arc<dyn SymbolRegistry>,
) -> PollWorker {
    let reporter = Arc::new(RemoteReporter::new(Arc::clone(remote)));
    let functions = FunctionManager::new(Arc::clone(registry), reporter);
    PollWorker::new(Arc::clone(remote), functions)
}

/// Poll until the shutdown flag flips or its sender is dropped.
async fn polling_loop(
    mut worker: PollWorker,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> PollWorker {
    loop {
        if *shutdown.borrow() {
            break;
        }
        worker.run_cycle().await;
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    debug!(watched = worker.watched_count(), "Poll loop exited");
    worker
}

/// Load configuration, register with the server and start polling.
///
/// Returns `None` when the coordinator cannot be built or registration fails;
/// the host process keeps running uninstrumented in that case.
pub async fn start_prodwatch(
    app_name: &str,
    registry: Arc<dyn SymbolRegistry>,
) -> Option<Coordinator> {
    let overrides = FileConfig {
        app_name: Some(app_name.to_string()),
        ..Default::default()
    };
    let config = match load_config(Path::new("."), overrides) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "Failed to load prodwatch configuration");
            return None;
        }
    };
    start_with_config(&config, registry).await
}

/// Same as [`start_prodwatch`] with an already-resolved configuration.
pub async fn start_with_config(
    config: &AgentConfig,
    registry: Arc<dyn SymbolRegistry>,
) -> Option<Coordinator> {
    let coordinator = match Coordinator::new(config, registry, Arc::new(SystemIdentity)) {
        Ok(coordinator) => coordinator,
        Err(err) => {
            error!(error = %err, "Failed to initialize prodwatch");
            return None;
        }
    };

    if !coordinator.check_connection().await {
        return None;
    }
    if let Err(err) = coordinator.start().await {
        error!(error = %err, "Failed to start prodwatch");
        return None;
    }
    Some(coordinator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use crate::runtime::{LoadedScopes, NativeFunction, Scope};
    use crate::types::Value;
    use remote::MockRemoteService;
    use std::sync::atomic::AtomicUsize;

    fn registry() -> Arc<LoadedScopes> {
        let registry = Arc::new(LoadedScopes::new());
        registry.load(
            Scope::new("mod").with_function(NativeFunction::new("fn", |_| Ok(Value::Null)).shared()),
        );
        registry
    }

    fn config() -> AgentConfig {
        AgentConfig::default()
            .with_app_name("orders")
            .with_poll_interval(Duration::from_millis(10))
    }

    fn identity() -> Arc<dyn IdentityProvider> {
        Arc::new(serde_json::json!({ "hostname": "test" }))
    }

    #[test]
    fn test_new_requires_token() {
        let err = Coordinator::new(&config(), registry(), identity()).err().unwrap();
        assert!(matches!(err, CoordinatorError::MissingToken));

        let coordinator =
            Coordinator::new(&config().with_token("secret"), registry(), identity()).unwrap();
        assert_eq!(coordinator.app_name(), "orders");
        assert!(!coordinator.is_active());
    }

    #[tokio::test]
    async fn test_start_requires_registration() {
        let mut remote = MockRemoteService::new();
        remote
            .expect_add_process()
            .times(1)
            .returning(|_| Err(RemoteError::api("add-process", 401)));

        let coordinator = Coordinator::with_remote(
            &config(),
            Uuid::new_v4(),
            Arc::new(remote),
            registry(),
            identity(),
        );
        assert!(!coordinator.check_connection().await);
        assert!(matches!(coordinator.start().await, Err(CoordinatorError::NotRegistered)));
        assert!(!coordinator.is_active());
    }

    #[tokio::test]
    async fn test_registration_sends_identity() {
        let mut remote = MockRemoteService::new();
        remote
            .expect_add_process()
            .withf(|info| info["hostname"] == "test")
            .times(1)
            .returning(|_| Ok(()));

        let coordinator = Coordinator::with_remote(
            &config(),
            Uuid::new_v4(),
            Arc::new(remote),
            registry(),
            identity(),
        );
        assert!(coordinator.check_connection().await);
        assert!(coordinator.is_registered());
    }

    #[tokio::test]
    async fn test_failed_registration_is_final() {
        let mut remote = MockRemoteService::new();
        remote
            .expect_add_process()
            .times(1)
            .returning(|_| Err(RemoteError::api("add-process", 503)));
        remote.expect_pending_function_names().never();

        let coordinator = Coordinator::with_remote(
            &config(),
            Uuid::new_v4(),
            Arc::new(remote),
            registry(),
            identity(),
        );
        assert!(!coordinator.check_connection().await);
        assert!(!coordinator.check_connection().await);
        assert!(!coordinator.is_registered());
        assert!(matches!(coordinator.start().await, Err(CoordinatorError::NotRegistered)));
        assert!(matches!(coordinator.start().await, Err(CoordinatorError::NotRegistered)));
        assert!(!coordinator.is_active());
    }

    #[tokio::test]
    async fn test_successful_registration_is_not_repeated() {
        let mut remote = MockRemoteService::new();
        remote.expect_add_process().times(1).returning(|_| Ok(()));

        let coordinator = Coordinator::with_remote(
            &config(),
            Uuid::new_v4(),
            Arc::new(remote),
            registry(),
            identity(),
        );
        assert!(coordinator.check_connection().await);
        assert!(coordinator.check_connection().await);
    }

    /// Wait until `counter` reaches `target`, giving up after about a second.
    async fn wait_for(counter: &AtomicUsize, target: usize) {
        for _ in 0..200 {
            if counter.load(Ordering::SeqCst) >= target {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("counter stuck at {}", counter.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_start_stop_lifecycle() {
        let polls = Arc::new(AtomicUsize::new(0));
        let confirms = Arc::new(AtomicUsize::new(0));

        let mut remote = MockRemoteService::new();
        remote.expect_add_process().returning(|_| Ok(()));
        let seen = Arc::clone(&polls);
        remote.expect_pending_function_names().returning(move || {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["mod.fn".to_string()])
        });
        let confirmed = Arc::clone(&confirms);
        remote.expect_confirm_watcher().times(1).returning(move |_, _| {
            confirmed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let coordinator = Coordinator::with_remote(
            &config(),
            Uuid::new_v4(),
            Arc::new(remote),
            registry(),
            identity(),
        );
        assert!(coordinator.check_connection().await);

        coordinator.start().await.unwrap();
        coordinator.start().await.unwrap();
        assert!(coordinator.is_active());
        assert_eq!(coordinator.watched_count().await, None);

        wait_for(&confirms, 1).await;
        coordinator.stop().await;
        assert!(!coordinator.is_active());
        assert_eq!(coordinator.watched_count().await, Some(1));

        coordinator.stop().await;
        let before_restart = polls.load(Ordering::SeqCst);
        coordinator.start().await.unwrap();
        wait_for(&polls, before_restart + 2).await;
        coordinator.stop().await;
        assert_eq!(coordinator.watched_count().await, Some(1));
        assert_eq!(confirms.load(Ordering::SeqCst), 1);
    }
}
