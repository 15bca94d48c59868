//! Integration tests for the registration public API.

use std::io;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use midbench::core::{Condition, Design, Environment, Kwargs};
use midbench::registration::{
    get_env_id, namespace, parse_env_id, with_namespace, EntryRef, Module, Registration, Registry,
};
use midbench::{MidbenchError, Result};
use serde_json::json;

struct Widget;

impl Environment for Widget {
    fn name(&self) -> &str {
        "widget"
    }
}

#[derive(Debug)]
struct Blank;
impl Design for Blank {}
impl Condition for Blank {}

fn widget(_: &Kwargs) -> Result<Box<dyn Environment>> {
    Ok(Box::new(Widget))
}

fn blank_design(_: &Kwargs) -> Result<Box<dyn Design>> {
    Ok(Box::new(Blank))
}

fn blank_condition(_: &Kwargs) -> Result<Box<dyn Condition>> {
    Ok(Box::new(Blank))
}

fn full() -> Registration {
    Registration::new()
        .entry_point(EntryRef::callable(widget))
        .designs(EntryRef::callable(blank_design))
        .conditions(EntryRef::callable(blank_condition))
}

fn registry_with(ids: &[&str]) -> Registry {
    let registry = Registry::new();
    for id in ids {
        registry.register(id, full()).unwrap();
    }
    registry
}

fn kwargs(value: serde_json::Value) -> Kwargs {
    value.as_object().cloned().unwrap()
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with warnings captured; returns its result and the log text.
fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    (result, logs)
}

#[test]
fn id_round_trips_through_format_and_parse() {
    for (ns, name, version) in [
        (Some("demo"), "widget", Some(0)),
        (None, "Airfoil2d", Some(12)),
        (Some("lab-2"), "x.y", None),
        (None, "plain", None),
    ] {
        let id = get_env_id(ns, name, version);
        let parsed = parse_env_id(&id).unwrap();
        assert_eq!(
            (parsed.0.as_deref(), parsed.1.as_str(), parsed.2),
            (ns, name, version),
            "round trip of {}",
            id
        );
    }
}

#[test]
fn malformed_id_is_rejected() {
    assert!(matches!(
        parse_env_id("bad id!!"),
        Err(MidbenchError::MalformedId { .. })
    ));
}

#[test]
fn versioned_and_unversioned_cannot_mix() {
    let registry = registry_with(&["ns/foo-v1"]);
    assert!(matches!(
        registry.register("ns/foo", full()),
        Err(MidbenchError::Registration { .. })
    ));

    let registry = registry_with(&["ns/foo"]);
    assert!(matches!(
        registry.register("ns/foo-v1", full()),
        Err(MidbenchError::Registration { .. })
    ));
}

#[test]
fn unversioned_make_uses_latest_with_warning() {
    let registry = registry_with(&["ns/foo-v1", "ns/foo-v2"]);

    let (made, logs) = capture_warnings(|| registry.make("ns/foo", Kwargs::new()));
    assert_eq!(made.unwrap().env.spec().id, "ns/foo-v2");
    assert!(logs.contains(
        "Using the latest versioned environment `ns/foo-v2` \
         instead of the unversioned environment `ns/foo`."
    ));
}

#[test]
fn older_version_makes_but_warns() {
    let registry = registry_with(&["ns/foo-v1", "ns/foo-v2"]);

    let (made, logs) = capture_warnings(|| registry.make("ns/foo-v1", Kwargs::new()));
    assert_eq!(made.unwrap().env.spec().id, "ns/foo-v1");
    assert!(logs.contains("out of date"));
}

#[test]
fn version_errors() {
    let registry = registry_with(&["ns/foo-v1", "ns/foo-v2"]);
    let err = registry.make("ns/foo-v5", Kwargs::new()).unwrap_err();
    assert!(matches!(err, MidbenchError::VersionNotFound { .. }));
    assert!(err.to_string().contains("[ `v1`, `v2` ]"));

    let registry = registry_with(&["ns/foo-v2"]);
    let err = registry.make("ns/foo-v1", Kwargs::new()).unwrap_err();
    assert!(matches!(err, MidbenchError::DeprecatedEnv { .. }));
    assert!(err.to_string().contains("Please use `ns/foo-v2` instead."));
}

#[test]
fn namespace_and_name_errors_suggest() {
    let registry = registry_with(&["ns/foo-v0"]);

    let err = registry.make("missing_ns/foo-v0", Kwargs::new()).unwrap_err();
    assert!(matches!(err, MidbenchError::NamespaceNotFound { .. }));

    let err = registry.make("ns/bar-v0", Kwargs::new()).unwrap_err();
    match err {
        MidbenchError::NameNotFound { suggestion, .. } => assert_eq!(suggestion, None),
        other => panic!("expected NameNotFound, got {}", other),
    }

    let err = registry.make("ns/fooo-v0", Kwargs::new()).unwrap_err();
    match err {
        MidbenchError::NameNotFound { suggestion, .. } => {
            assert_eq!(suggestion.as_deref(), Some("foo"))
        }
        other => panic!("expected NameNotFound, got {}", other),
    }

    let err = registry.make("nss/foo-v0", Kwargs::new()).unwrap_err();
    assert!(err.to_string().contains("Did you mean: `ns`?"));
}

#[test]
fn namespace_scope_restores_after_error() {
    let registry = Registry::new();

    let result: Result<()> = with_namespace("lab", || {
        registry.register("gizmo-v0", full())?;
        Err(MidbenchError::configuration("hook failed"))
    });
    assert!(result.is_err());

    registry.register("after-v0", full()).unwrap();
    assert!(registry.contains("lab/gizmo-v0"));
    assert!(registry.contains("after-v0"));
}

#[test]
fn namespace_guard_overrides_explicit_namespace_with_warning() {
    let registry = Registry::new();

    let (_, logs) = capture_warnings(|| {
        let _guard = namespace("lab");
        registry.register("other/gizmo-v0", full()).unwrap();
    });

    assert!(registry.contains("lab/gizmo-v0"));
    assert!(logs.contains("Custom namespace `other` is being overridden"));
}

#[test]
fn re_registration_overrides_with_warning() {
    let registry = registry_with(&["dup-v0"]);

    let (_, logs) = capture_warnings(|| {
        registry
            .register("dup-v0", full().kwarg("second", true))
            .unwrap()
    });

    assert!(logs.contains("Overriding environment dup-v0"));
    assert_eq!(registry.spec("dup-v0").unwrap().kwargs["second"], true);
    assert_eq!(registry.len(), 1);
}

#[test]
fn end_to_end_kwargs_override() {
    let registry = Registry::new();
    registry
        .register("demo/widget-v0", full().kwargs(kwargs(json!({"x": 1}))))
        .unwrap();

    let made = registry
        .make("demo/widget-v0", kwargs(json!({"x": 2})))
        .unwrap();

    assert_eq!(made.env.spec().id, "demo/widget-v0");
    assert_eq!(made.env.spec().kwargs, kwargs(json!({"x": 2})));
    assert_eq!(made.env.unwrapped().name(), "widget");
    assert!(made.designs.create_default().is_ok());

    // The stored record keeps its defaults
    assert_eq!(registry.spec("demo/widget-v0").unwrap().kwargs["x"], 1);
}

#[test]
fn module_prefix_imports_before_lookup() {
    let registry = Registry::new();
    registry.modules().install(
        Module::new("lab.gizmos")
            .env("Gizmo", widget)
            .design("GizmoDesign", blank_design)
            .condition("GizmoCondition", blank_condition)
            .on_import(|registry| {
                registry.register(
                    "lab/gizmo-v0",
                    Registration::new()
                        .entry_point("lab.gizmos:Gizmo")
                        .designs("lab.gizmos:GizmoDesign")
                        .conditions("lab.gizmos:GizmoCondition"),
                )
            }),
    );

    assert!(!registry.contains("lab/gizmo-v0"));
    let made = registry.make("lab.gizmos:lab/gizmo-v0", Kwargs::new()).unwrap();
    assert_eq!(made.env.spec().id, "lab/gizmo-v0");

    let err = registry.make("lab.nothing:x-v0", Kwargs::new()).unwrap_err();
    assert!(matches!(err, MidbenchError::ModuleImport { .. }));
}

#[test]
fn concurrent_make_waits_for_module_import() {
    let registry = Registry::new();
    registry.modules().install(
        Module::new("slow")
            .env("Slow", widget)
            .design("SlowDesign", blank_design)
            .condition("SlowCondition", blank_condition)
            .on_import(|registry| {
                thread::sleep(Duration::from_millis(300));
                registry.register(
                    "Slow-v0",
                    Registration::new()
                        .entry_point("slow:Slow")
                        .designs("slow:SlowDesign")
                        .conditions("slow:SlowCondition"),
                )
            }),
    );

    let made_id = |registry: &Registry| {
        registry
            .make("slow:Slow-v0", Kwargs::new())
            .map(|made| made.env.spec().id.clone())
    };

    let (first, second) = thread::scope(|s| {
        let first = s.spawn(|| made_id(&registry));
        thread::sleep(Duration::from_millis(50));
        let second = made_id(&registry);
        (first.join().unwrap(), second)
    });

    assert_eq!(first.unwrap(), "Slow-v0");
    assert_eq!(second.unwrap(), "Slow-v0");
}

#[test]
fn missing_parts_are_configuration_errors() {
    let registry = Registry::new();
    registry
        .register(
            "half-v0",
            Registration::new().entry_point(EntryRef::callable(widget)),
        )
        .unwrap();

    let err = registry.make("half-v0", Kwargs::new()).unwrap_err();
    assert!(matches!(err, MidbenchError::Configuration { .. }));
}
