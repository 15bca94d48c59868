//! Deep merge of layered YAML configuration values.
//!
//! # Merge Rules
//!
//! - Mappings are merged recursively
//! - Sequences are replaced entirely (so a local `plugins:` list replaces the
//!   project one)
//! - Null values in the overlay delete the key from the base
//! - Scalars in the overlay replace the base

use serde_yaml::Value;

/// Deep merge two YAML values; `overlay` wins at the point of conflict.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            let mut result = base_map.clone();

            for (key, overlay_value) in overlay_map {
                if overlay_value.is_null() {
                    result.remove(key);
                } else if let Some(base_value) = base_map.get(key) {
                    result.insert(key.clone(), deep_merge(base_value, overlay_value));
                } else {
                    result.insert(key.clone(), overlay_value.clone());
                }
            }

            Value::Mapping(result)
        }

        (_, overlay) => overlay.clone(),
    }
}

/// Merge config layers in order (later overrides earlier).
///
/// Empty layers (an empty file parses to null) leave the result unchanged.
pub fn merge_configs(configs: &[Value]) -> Value {
    configs
        .iter()
        .filter(|config| !config.is_null())
        .fold(Value::Mapping(Default::default()), |acc, config| {
            deep_merge(&acc, config)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn environment_kwargs_merge_per_key() {
        let base = yaml(
            r#"
environments:
  Airfoil2d-v0:
    su2_cfd: SU2_CFD
    cfgfile_simu: config_simu.cfg
"#,
        );
        let overlay = yaml(
            r#"
environments:
  Airfoil2d-v0:
    su2_cfd: "mpirun -n 8 SU2_CFD"
"#,
        );

        let result = deep_merge(&base, &overlay);
        let airfoil = &result["environments"]["Airfoil2d-v0"];

        assert_eq!(airfoil["su2_cfd"], "mpirun -n 8 SU2_CFD");
        assert_eq!(airfoil["cfgfile_simu"], "config_simu.cfg");
    }

    #[test]
    fn plugin_lists_are_replaced_not_merged() {
        let base = yaml(
            r#"
plugins:
  - name: a
    value: "a.mod:register"
  - name: b
    value: "b.mod:register"
"#,
        );
        let overlay = yaml(
            r#"
plugins:
  - name: c
    value: "c.mod:register"
"#,
        );

        let result = deep_merge(&base, &overlay);
        let plugins = result["plugins"].as_sequence().unwrap();

        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins[0]["name"], "c");
    }

    #[test]
    fn null_removes_inherited_value() {
        let base = yaml(
            r#"
environments:
  HeatConduction2d-v0:
    workdir: /opt/heat
  Airfoil2d-v0:
    su2_cfd: SU2_CFD
"#,
        );
        let overlay = yaml(
            r#"
environments:
  HeatConduction2d-v0: null
"#,
        );

        let result = deep_merge(&base, &overlay);

        assert!(result["environments"].get("HeatConduction2d-v0").is_none());
        assert_eq!(result["environments"]["Airfoil2d-v0"]["su2_cfd"], "SU2_CFD");
    }

    #[test]
    fn scalar_overlay_replaces_mapping_base() {
        let result = deep_merge(&yaml("settings:\n  output_dir: out\n"), &yaml("settings: off\n"));
        assert_eq!(result["settings"], "off");
    }

    #[test]
    fn merge_configs_applies_layers_in_order() {
        let configs = vec![yaml("a: 1\nb: 2"), yaml("b: 3\nc: 4"), yaml("c: 5")];

        let result = merge_configs(&configs);

        assert_eq!(result["a"], 1);
        assert_eq!(result["b"], 3);
        assert_eq!(result["c"], 5);
    }

    #[test]
    fn empty_layer_keeps_previous_values() {
        let configs = vec![yaml("settings:\n  output_dir: out\n"), yaml("")];

        let result = merge_configs(&configs);

        assert_eq!(result["settings"]["output_dir"], "out");
    }

    #[test]
    fn merge_of_nothing_is_empty_mapping() {
        let result = merge_configs(&[]);
        assert!(result.as_mapping().unwrap().is_empty());
    }
}
