// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Coordinator scenarios against an in-memory prodwatch server.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use prodwatch::config::AgentConfig;
use prodwatch::coordinator::{Coordinator, IdentityProvider, PollWorker, RemoteReporter, RemoteService};
use prodwatch::resolver::FinderReport;
use prodwatch::runtime::{Binding, LoadedScopes, NativeFunction, Scope, SymbolRegistry, TypeObject};
use prodwatch::types::{CallArgs, CallEvent, Value};
use prodwatch::{FunctionManager, RemoteError, RuntimeError};

// ============================================================================
// Fake Server
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Sent {
    Confirm(String, FinderReport),
    Failed(String, FinderReport),
    Call(CallEvent),
    AddProcess(serde_json::Value),
}

#[derive(Default)]
struct FakeServer {
    polls: Mutex<VecDeque<Result<Vec<String>, RemoteError>>>,
    sent: Mutex<Vec<Sent>>,
    reject_registration: bool,
    reject_calls: bool,
}

impl FakeServer {
    fn with_polls(polls: Vec<Result<Vec<String>, RemoteError>>) -> Self {
        Self {
            polls: Mutex::new(polls.into()),
            ..Default::default()
        }
    }

    fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn confirmed(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Confirm(name, _) => Some(name),
                _ => None,
            })
            .collect()
    }

    fn calls(&self) -> Vec<CallEvent> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Call(event) => Some(event),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl RemoteService for FakeServer {
    async fn pending_function_names(&self) -> Result<Vec<String>, RemoteError> {
        self.polls.lock().unwrap().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn confirm_watcher(
        &self,
        function_name: &str,
        finder_result: Option<FinderReport>,
    ) -> Result<(), RemoteError> {
        let report = finder_result.expect("confirm carries finder metadata");
        self.sent.lock().unwrap().push(Sent::Confirm(function_name.to_string(), report));
        Ok(())
    }

    async fn failed_watcher(
        &self,
        function_name: &str,
        finder_result: Option<FinderReport>,
    ) -> Result<(), RemoteError> {
        let report = finder_result.expect("failure carries finder metadata");
        self.sent.lock().unwrap().push(Sent::Failed(function_name.to_string(), report));
        Ok(())
    }

    async fn log_function_call(&self, event: &CallEvent) -> Result<(), RemoteError> {
        self.sent.lock().unwrap().push(Sent::Call(event.clone()));
        if self.reject_calls {
            return Err(RemoteError::api("log-function-call", 503));
        }
        Ok(())
    }

    async fn add_process(&self, system_info: &serde_json::Value) -> Result<(), RemoteError> {
        if self.reject_registration {
            return Err(RemoteError::api("add-process", 401));
        }
        self.sent.lock().unwrap().push(Sent::AddProcess(system_info.clone()));
        Ok(())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn registry() -> Arc<LoadedScopes> {
    let shapes = TypeObject::new("Square")
        .with_method(
            Binding::Class,
            NativeFunction::new("unit", |args: CallArgs| {
                let ty = args.receiver().and_then(Value::as_type).cloned();
                let square = ty
                    .map(|ty| ty.instantiate())
                    .ok_or_else(|| RuntimeError::MissingReceiver("Square.unit".to_string()))?;
                square.set_field("side", 1.0);
                Ok(Value::Object(square))
            })
            .with_qualname("Square.unit")
            .shared(),
        )
        .with_property(
            NativeFunction::new("area", |args: CallArgs| {
                let side = args
                    .receiver()
                    .and_then(Value::as_object)
                    .and_then(|this| this.field("side"))
                    .and_then(|v| v.as_float())
                    .unwrap_or(0.0);
                Ok(Value::Float(side * side))
            })
            .with_qualname("Square.area")
            .shared(),
        )
        .shared();

    let registry = Arc::new(LoadedScopes::new());
    registry.load(
        Scope::new("mod")
            .with_function(
                NativeFunction::new("fn", |args: CallArgs| {
                    let x = args.get(0, "x").and_then(Value::as_int).unwrap_or(0);
                    let y = args.get(1, "y").and_then(Value::as_int).unwrap_or(0);
                    Ok(Value::Int(x + y))
                })
                .shared(),
            )
            .with_function(
                NativeFunction::new("explode", |_| {
                    Err(RuntimeError::InvalidArgument("boom".to_string()).into())
                })
                .shared(),
            ),
    );
    registry.load(Scope::new("shapes").with_type(shapes));
    registry
}

fn config() -> AgentConfig {
    AgentConfig::default()
        .with_app_name("orders")
        .with_poll_interval(Duration::from_millis(10))
}

fn worker(server: &Arc<FakeServer>, registry: &Arc<LoadedScopes>) -> PollWorker {
    let remote: Arc<dyn RemoteService> = server.clone();
    let reporter = Arc::new(RemoteReporter::new(remote.clone()));
    PollWorker::new(remote, FunctionManager::new(registry.clone(), reporter))
}

fn identity() -> Arc<dyn IdentityProvider> {
    Arc::new(serde_json::json!({ "hostname": "web-1", "pid": 42 }))
}

// ============================================================================
// Poll Cycles
// ============================================================================

#[tokio::test]
async fn test_end_to_end_single_name() {
    let server = Arc::new(FakeServer::with_polls(vec![
        Ok(vec!["mod.fn".to_string()]),
        Ok(vec!["mod.fn".to_string()]),
    ]));
    let registry = registry();
    let mut worker = worker(&server, &registry);

    worker.run_cycle().await;
    assert_eq!(server.confirmed(), vec!["mod.fn"]);
    assert!(worker.is_watched("mod.fn"));

    let scope = registry.scope("mod").unwrap();
    let result = scope
        .call("fn", CallArgs::new([Value::from(5)]).with_kwarg("y", 15))
        .await
        .unwrap();
    assert_eq!(result, Value::Int(20));

    let calls = server.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].function_name, "mod.fn");
    assert_eq!(calls[0].args, vec!["5"]);
    assert_eq!(calls[0].kwargs.get("y").map(String::as_str), Some("15"));
    assert!(calls[0].execution_time_ms > 0.0);
    assert!(calls[0].error.is_none());

    // Second poll lists the same name: no re-wrap and no second confirm.
    worker.run_cycle().await;
    assert_eq!(server.confirmed(), vec!["mod.fn"]);
    scope.call("fn", CallArgs::new([Value::from(1)])).await.unwrap();
    assert_eq!(server.calls().len(), 2);
}

#[tokio::test]
async fn test_unresolved_names_are_retried() {
    let server = Arc::new(FakeServer::with_polls(vec![
        Ok(vec!["mod.missing".to_string()]),
        Ok(vec!["mod.missing".to_string()]),
    ]));
    let registry = registry();
    let mut worker = worker(&server, &registry);

    worker.run_cycle().await;
    worker.run_cycle().await;

    let failures: Vec<_> = server
        .sent()
        .into_iter()
        .filter_map(|s| match s {
            Sent::Failed(name, report) => Some((name, report)),
            _ => None,
        })
        .collect();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].0, "mod.missing");
    assert!(!failures[0].1.found);
    assert!(!worker.is_watched("mod.missing"));
}

#[tokio::test]
async fn test_poll_error_does_not_stop_later_cycles() {
    let server = Arc::new(FakeServer::with_polls(vec![
        Err(RemoteError::Network("connection refused".to_string())),
        Ok(vec!["Square.area".to_string()]),
    ]));
    let registry = registry();
    let mut worker = worker(&server, &registry);

    worker.run_cycle().await;
    assert!(server.sent().is_empty());

    worker.run_cycle().await;
    let sent = server.sent();
    let Sent::Confirm(name, report) = &sent[0] else {
        panic!("expected a confirm, got {sent:?}");
    };
    assert_eq!(name, "Square.area");
    assert!(report.is_property);
    assert_eq!(report.class_name.as_deref(), Some("Square"));
}

#[tokio::test]
async fn test_class_method_and_property_stay_usable() {
    let server = Arc::new(FakeServer::with_polls(vec![Ok(vec![
        "Square.unit".to_string(),
        "Square.area".to_string(),
    ])]));
    let registry = registry();
    let mut worker = worker(&server, &registry);
    worker.run_cycle().await;

    let ty = registry
        .scope("shapes")
        .unwrap()
        .get_attr("Square")
        .unwrap()
        .as_type()
        .cloned()
        .unwrap();
    let square = ty.call("unit", CallArgs::empty()).await.unwrap();
    let square = square.as_object().cloned().unwrap();
    assert_eq!(square.get("area").await.unwrap(), Value::Float(1.0));

    let calls = server.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].function_name, "Square.unit");
    assert_eq!(calls[0].args, vec!["<class 'Square'>"]);
    assert_eq!(calls[1].function_name, "Square.area");
    assert!(calls[1].args[0].starts_with("<Square object at 0x"));
}

#[tokio::test]
async fn test_errors_and_reporting_failures_pass_through() {
    let server = Arc::new(FakeServer {
        polls: Mutex::new(VecDeque::from(vec![Ok(vec![
            "mod.explode".to_string(),
            "mod.fn".to_string(),
        ])])),
        reject_calls: true,
        ..Default::default()
    });
    let registry = registry();
    let mut worker = worker(&server, &registry);
    worker.run_cycle().await;

    let scope = registry.scope("mod").unwrap();
    let err = scope.call("explode", CallArgs::empty()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RuntimeError>(),
        Some(RuntimeError::InvalidArgument(msg)) if msg == "boom"
    ));

    // The report is rejected, the call still succeeds.
    let value = scope
        .call("fn", CallArgs::new([Value::from(2), Value::from(3)]))
        .await
        .unwrap();
    assert_eq!(value, Value::Int(5));

    let calls = server.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].error.as_deref(), Some("Invalid argument: boom"));
    assert!(calls[1].error.is_none());
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_registration_gates_polling() {
    let server = Arc::new(FakeServer {
        reject_registration: true,
        ..FakeServer::with_polls(vec![Ok(vec!["mod.fn".to_string()])])
    });
    let coordinator = Coordinator::with_remote(
        &config(),
        Uuid::new_v4(),
        server.clone(),
        registry(),
        identity(),
    );

    assert!(!coordinator.check_connection().await);
    assert!(coordinator.start().await.is_err());
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(server.sent().is_empty());
}

#[tokio::test]
async fn test_start_stop_is_idempotent() {
    let server = Arc::new(FakeServer::with_polls(vec![Ok(vec!["mod.fn".to_string()])]));
    let registry = registry();
    let coordinator = Coordinator::with_remote(
        &config(),
        Uuid::new_v4(),
        server.clone(),
        registry.clone(),
        identity(),
    );

    coordinator.stop().await;
    assert!(coordinator.check_connection().await);
    assert_eq!(
        server.sent()[0],
        Sent::AddProcess(serde_json::json!({ "hostname": "web-1", "pid": 42 }))
    );

    coordinator.start().await.unwrap();
    coordinator.start().await.unwrap();
    assert!(coordinator.is_active());

    for _ in 0..100 {
        if !server.confirmed().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    coordinator.stop().await;
    coordinator.stop().await;
    assert!(!coordinator.is_active());
    assert_eq!(server.confirmed(), vec!["mod.fn"]);

    // Watched set survives a restart: the name is not wrapped twice.
    server.polls.lock().unwrap().push_back(Ok(vec!["mod.fn".to_string()]));
    coordinator.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(40)).await;
    coordinator.stop().await;
    assert_eq!(server.confirmed(), vec!["mod.fn"]);

    registry
        .scope("mod")
        .unwrap()
        .call("fn", CallArgs::new([Value::from(1)]))
        .await
        .unwrap();
    assert_eq!(server.calls().len(), 1);
}
