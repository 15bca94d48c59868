//! Integration tests for config module public API.

use midbench::config::{load_config, load_merged_config, validate, MidbenchConfig, OutputMode};
use midbench::envs::bootstrap;
use std::fs;
use tempfile::TempDir;

fn project(config: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join(".midbench");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.yml"), config).unwrap();
    temp
}

#[test]
fn configured_kwargs_reach_made_environment() {
    let temp = project(
        r#"
settings:
  output_dir: runs
  default_output: verbose
environments:
  HeatConduction2d-v0:
    workdir: /opt/heat
"#,
    );

    let config = load_merged_config(temp.path()).unwrap();
    validate(&config).unwrap();
    assert_eq!(config.settings.default_output, OutputMode::Verbose);

    let (registry, report) = bootstrap(&config).unwrap();
    assert!(report.is_clean());

    let made = registry
        .make(
            "HeatConduction2d-v0",
            config.environment_kwargs("HeatConduction2d-v0"),
        )
        .unwrap();
    assert_eq!(made.env.spec().kwargs["workdir"], "/opt/heat");
}

#[test]
fn configured_plugin_failures_do_not_stop_bootstrap() {
    let temp = project(
        r#"
plugins:
  - name: lab
    value: "lab.absent:register"
"#,
    );

    let config = load_merged_config(temp.path()).unwrap();
    validate(&config).unwrap();

    let (registry, report) = bootstrap(&config).unwrap();
    assert_eq!(report.failed.len(), 1);
    assert!(registry.contains("Airfoil2d-v0"));
}

#[test]
fn local_layer_replaces_plugin_list() {
    let temp = project(
        r#"
plugins:
  - name: a
    value: "a.mod:register"
  - name: b
    value: "b.mod:register"
"#,
    );
    fs::write(
        temp.path().join(".midbench").join("config.local.yml"),
        "plugins: []\n",
    )
    .unwrap();

    let config = load_merged_config(temp.path()).unwrap();
    assert!(config.plugins.is_empty());
}

#[test]
fn explicit_config_file_is_used_alone() {
    let temp = project("settings:\n  plugin_group: project.envs\n");
    let explicit = temp.path().join("ci.yml");
    fs::write(&explicit, "settings:\n  output_dir: ci-results\n").unwrap();

    let config = load_config(temp.path(), Some(&explicit)).unwrap();
    assert_eq!(config.settings.plugin_group, "midbench.envs");
    assert_eq!(
        config.settings.output_dir,
        std::path::PathBuf::from("ci-results")
    );
}

#[test]
fn invalid_config_reports_every_problem() {
    let config: MidbenchConfig = serde_yaml::from_str(
        r#"
plugins:
  - name: lab
    value: nothing
environments:
  "not an id": {}
"#,
    )
    .unwrap();

    let message = validate(&config).unwrap_err().to_string();
    assert!(message.contains("module:attribute"));
    assert!(message.contains("not an id"));
}
