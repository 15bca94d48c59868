//! Integration tests for plugin discovery.
//!
//! This test binary links its own module and entry points through
//! `inventory`, the same way a plugin crate would.

use midbench::core::{Condition, Design, Environment, Kwargs};
use midbench::registration::{
    current_namespace, EntryPoint, EntryPointReg, ModuleDef, ModuleReg, Registration, Registry,
    StaticAttr,
};
use midbench::{MidbenchError, Result};

const GROUP: &str = "midbench.tests";

struct Gizmo;

impl Environment for Gizmo {
    fn name(&self) -> &str {
        "gizmo"
    }
}

#[derive(Debug)]
struct Blank;
impl Design for Blank {}
impl Condition for Blank {}

fn gizmo(_: &Kwargs) -> Result<Box<dyn Environment>> {
    Ok(Box::new(Gizmo))
}

fn blank_design(_: &Kwargs) -> Result<Box<dyn Design>> {
    Ok(Box::new(Blank))
}

fn blank_condition(_: &Kwargs) -> Result<Box<dyn Condition>> {
    Ok(Box::new(Blank))
}

fn gizmo_registration() -> Registration {
    Registration::new()
        .entry_point("lab.gizmos:Gizmo")
        .designs("lab.gizmos:GizmoDesign")
        .conditions("lab.gizmos:GizmoCondition")
}

fn register_gizmo(registry: &Registry) -> Result<()> {
    registry.register("gizmo-v0", gizmo_registration())
}

fn register_widget(registry: &Registry) -> Result<()> {
    registry.register("widget-v0", gizmo_registration())
}

fn register_broken(_: &Registry) -> Result<()> {
    Err(MidbenchError::configuration("broken plugin"))
}

fn register_at_root(registry: &Registry) -> Result<()> {
    assert_eq!(current_namespace(), None);
    registry.register("rooted-v0", gizmo_registration())
}

static GIZMOS: ModuleDef = ModuleDef {
    path: "lab.gizmos",
    attrs: &[
        ("Gizmo", StaticAttr::Env(gizmo)),
        ("GizmoDesign", StaticAttr::Design(blank_design)),
        ("GizmoCondition", StaticAttr::Condition(blank_condition)),
        ("register", StaticAttr::Hook(register_gizmo)),
        ("register_widget", StaticAttr::Hook(register_widget)),
        ("register_broken", StaticAttr::Hook(register_broken)),
        ("register_at_root", StaticAttr::Hook(register_at_root)),
    ],
    on_import: None,
};

inventory::submit! { ModuleReg(&GIZMOS) }

inventory::submit! {
    EntryPointReg { group: GROUP, name: "lab", value: "lab.gizmos:register" }
}

inventory::submit! {
    EntryPointReg { group: GROUP, name: "__root__", value: "lab.gizmos:register_at_root" }
}

#[test]
fn linked_entry_points_register_in_their_namespace() {
    let registry = Registry::new();
    let report = registry.load_plugins(GROUP);

    assert!(report.is_clean(), "{:?}", report.failed);
    assert_eq!(report.loaded, ["__root__", "lab"]);
    assert!(registry.contains("lab/gizmo-v0"));
    assert!(registry.contains("rooted-v0"));

    let made = registry.make("lab/gizmo", Kwargs::new()).unwrap();
    assert_eq!(made.env.unwrapped().name(), "gizmo");
}

#[test]
fn other_groups_are_ignored() {
    let registry = Registry::new();
    let report = registry.load_plugins("midbench.unused");
    assert!(report.loaded.is_empty());
    assert!(registry.is_empty());
}

#[test]
fn failing_plugin_is_contained() {
    let registry = Registry::new();
    let entry_points = vec![
        EntryPoint::new(GROUP, "first", "lab.gizmos:register"),
        EntryPoint::new(GROUP, "second", "lab.gizmos:register_broken"),
        EntryPoint::new(GROUP, "third", "lab.gizmos:register_widget"),
    ];

    let report = registry.load_plugins_from(&entry_points, GROUP);

    assert_eq!(report.loaded, ["first", "third"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].name, "second");
    assert!(report.failed[0].error.contains("broken plugin"));
    assert!(registry.contains("first/gizmo-v0"));
    assert!(registry.contains("third/widget-v0"));
    assert_eq!(current_namespace(), None);
}

#[test]
fn unresolvable_entry_points_are_contained() {
    let registry = Registry::new();
    let entry_points = vec![
        EntryPoint::new(GROUP, "a", "lab.missing:register"),
        EntryPoint::new(GROUP, "b", "lab.gizmos:nothing"),
        EntryPoint::new(GROUP, "c", "no-attribute"),
        EntryPoint::new(GROUP, "d", "lab.gizmos:Gizmo"),
        EntryPoint::new(GROUP, "e", "lab.gizmos:register"),
    ];

    let report = registry.load_plugins_from(&entry_points, GROUP);

    let failed: Vec<&str> = report.failed.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(failed, ["a", "b", "c", "d"]);
    assert_eq!(report.loaded, ["e"]);
}

#[test]
fn unsupported_magic_name_registers_unscoped() {
    let registry = Registry::new();
    let entry_points = vec![EntryPoint::new(GROUP, "__magic__", "lab.gizmos:register")];

    let report = registry.load_plugins_from(&entry_points, GROUP);

    assert!(report.is_clean());
    assert!(registry.contains("gizmo-v0"));
}
