//! 2D airfoil shape optimization through the SU2 CFD suite.
//!
//! The design is an SU2 mesh, optionally generated from a coordinate file by
//! `AirfoilGeometryConverter`. Simulation rewrites the flow conditions into
//! the SU2 configuration next to the mesh and runs `SU2_CFD`; optimization
//! runs SU2's `shape_optimization.py` driver.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{
    downcast_condition, downcast_design, from_kwargs, Condition, Design, Environment, Kwargs,
    Metrics,
};
use crate::envs::su2::{History, Su2Config};
use crate::error::{MidbenchError, Result};
use crate::registration::{ModuleDef, ModuleReg, StaticAttr};
use crate::shell::{execute_checked, CommandLine, CommandOptions};

/// Module path the built-in registration points at.
pub const MODULE_PATH: &str = "midbench.envs.airfoil.airfoil2d";

pub static MODULE: ModuleDef = ModuleDef {
    path: MODULE_PATH,
    attrs: &[
        ("Airfoil2dEnv", StaticAttr::Env(make_env)),
        ("Airfoil2dDesign", StaticAttr::Design(make_design)),
        ("Airfoil2dCondition", StaticAttr::Condition(make_condition)),
    ],
    on_import: None,
};

inventory::submit! { ModuleReg(&MODULE) }

/// Metrics reported by [`Airfoil2dEnv::simulate`], with their history column.
const SIMULATE_METRICS: [(&str, &str); 2] = [("drag", "CD"), ("lift", "CL")];

/// Objectives reported by [`Airfoil2dEnv::optimize`], with their history column.
const OPTIMIZE_OBJECTIVES: [(&str, &str); 2] = [("drag", "DRAG"), ("ld_ratio", "EFFICIENCY")];

/// Flow conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Airfoil2dCondition {
    pub mach: f64,
    pub reynolds: f64,
    /// Target lift coefficient.
    pub lift: f64,
    /// Angle of attack in degrees.
    pub aoa: f64,
    /// Project file to resume an optimization from.
    pub projectname: String,
    pub partitions: u32,
    pub gradient: String,
    pub optimization: String,
    pub quiet: bool,
    pub nzones: u32,
}

impl Default for Airfoil2dCondition {
    fn default() -> Self {
        Self {
            mach: 0.8,
            reynolds: 8_000_000.0,
            lift: 0.348,
            aoa: 0.0,
            projectname: String::new(),
            partitions: 0,
            gradient: "CONTINUOUS_ADJOINT".to_string(),
            optimization: "SLSQP".to_string(),
            quiet: false,
            nzones: 1,
        }
    }
}

impl Condition for Airfoil2dCondition {}

/// An airfoil geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Airfoil2dDesign {
    /// Whitespace-separated `x y` coordinates to mesh. When unset, `su2` is
    /// used as is.
    pub coords_path: Option<PathBuf>,
    /// SU2 mesh file.
    pub su2: PathBuf,
    pub converter: CommandLine,
}

impl Default for Airfoil2dDesign {
    fn default() -> Self {
        Self {
            coords_path: None,
            su2: PathBuf::from("mesh_NACA0012_inv.su2"),
            converter: CommandLine::parse("AirfoilGeometryConverter"),
        }
    }
}

impl Design for Airfoil2dDesign {
    /// Normalize the chord of `coords_path` to `[0, 1]` and mesh it.
    fn prepare(&mut self) -> Result<()> {
        let Some(coords_path) = &self.coords_path else {
            return Ok(());
        };
        let dir = parent_dir(coords_path);

        let coords = fs::read_to_string(coords_path).map_err(|e| MidbenchError::SolverOutput {
            path: coords_path.clone(),
            message: e.to_string(),
        })?;
        let dat = dir.join("air_coord.dat");
        fs::write(&dat, normalize_chord(&coords)?)?;

        let stem = dir.join("air_coord");
        let command = self.converter.with_args([
            "-i".to_string(),
            dat.display().to_string(),
            "-o".to_string(),
            stem.display().to_string(),
            "-f".to_string(),
            "su2".to_string(),
            "-frf".to_string(),
            "circle".to_string(),
        ]);
        execute_checked(&command, &CommandOptions::default())?;

        self.su2 = std::path::absolute(dir.join("air_coord.su2"))?;
        tracing::debug!(mesh = %self.su2.display(), "generated airfoil mesh");
        Ok(())
    }
}

/// Rescale the first column to span `[0, 1]`.
fn normalize_chord(coords: &str) -> Result<String> {
    let mut points = Vec::new();
    for line in coords.lines().filter(|l| !l.trim().is_empty()) {
        let values: Vec<f64> = line
            .split_whitespace()
            .map(str::parse)
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| {
                MidbenchError::configuration(format!("invalid coordinate row `{}`", line))
            })?;
        match values.as_slice() {
            [x, y] => points.push((*x, *y)),
            _ => {
                return Err(MidbenchError::configuration(format!(
                    "coordinate row `{}` must have two columns",
                    line
                )))
            }
        }
    }

    let min = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    if span.is_nan() || span <= 0.0 {
        return Err(MidbenchError::configuration(
            "airfoil coordinates have zero chord",
        ));
    }

    Ok(points
        .iter()
        .map(|(x, y)| format!("{:.18e}     {:.18e}\n", (x - min) / span, y))
        .collect())
}

/// Environment settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Airfoil2dSettings {
    /// Simulation config, relative to the mesh directory.
    pub cfgfile_simu: PathBuf,
    /// Optimization config, relative to the mesh directory.
    pub cfgfile_opt: PathBuf,
    pub su2_cfd: CommandLine,
    pub shape_optimization: CommandLine,
}

impl Default for Airfoil2dSettings {
    fn default() -> Self {
        Self {
            cfgfile_simu: PathBuf::from("config_simu.cfg"),
            cfgfile_opt: PathBuf::from("config_opt.cfg"),
            su2_cfd: CommandLine::parse("SU2_CFD"),
            shape_optimization: CommandLine::parse("shape_optimization.py"),
        }
    }
}

/// The SU2 airfoil environment.
#[derive(Debug, Clone, Default)]
pub struct Airfoil2dEnv {
    pub settings: Airfoil2dSettings,
}

impl Airfoil2dEnv {
    pub fn new(settings: Airfoil2dSettings) -> Self {
        Self { settings }
    }

    /// Write flow conditions into the config at `cfg_path`.
    fn write_conditions(
        &self,
        cfg_path: &Path,
        condition: &Airfoil2dCondition,
        mesh: &Path,
    ) -> Result<Su2Config> {
        let mut config = Su2Config::load(cfg_path)?;
        config.set("MACH_NUMBER", condition.mach);
        config.set("REYNOLDS_NUMBER", condition.reynolds);
        config.set("TARGET_CL", condition.lift);
        config.set("AOA", condition.aoa);
        config.set("MESH_FILENAME", mesh.display());
        Ok(config)
    }
}

impl Environment for Airfoil2dEnv {
    fn name(&self) -> &str {
        "Airfoil2d"
    }

    fn simulate(
        &mut self,
        design: &dyn Design,
        condition: &dyn Condition,
        metrics: &[String],
        output_dir: &Path,
    ) -> Result<Metrics> {
        let design = downcast_design::<Airfoil2dDesign>(design)?;
        let condition = downcast_condition::<Airfoil2dCondition>(condition)?;
        let columns = select_columns(metrics, &SIMULATE_METRICS)?;

        let mesh = std::path::absolute(&design.su2)?;
        let cfg_path = std::path::absolute(parent_dir(&mesh).join(&self.settings.cfgfile_simu))?;
        self.write_conditions(&cfg_path, condition, &mesh)?
            .save(&cfg_path)?;

        fs::create_dir_all(output_dir)?;
        let command = self
            .settings
            .su2_cfd
            .with_args([cfg_path.display().to_string()]);
        execute_checked(&command, &CommandOptions::in_dir(output_dir))?;

        read_metrics(&output_dir.join("history.csv"), &columns)
    }

    fn optimize(
        &mut self,
        design: &dyn Design,
        condition: &dyn Condition,
        objectives: &[String],
        output_dir: &Path,
    ) -> Result<Metrics> {
        let design = downcast_design::<Airfoil2dDesign>(design)?;
        let condition = downcast_condition::<Airfoil2dCondition>(condition)?;
        let columns = select_columns(objectives, &OPTIMIZE_OBJECTIVES)?;

        let mesh = std::path::absolute(&design.su2)?;
        let cfg_path = std::path::absolute(parent_dir(&mesh).join(&self.settings.cfgfile_opt))?;
        let mut config = self.write_conditions(&cfg_path, condition, &mesh)?;
        config.set("NUMBER_PART", condition.partitions);
        config.set("NZONES", condition.nzones);
        config.set("GRADIENT_METHOD", &condition.gradient);
        if condition.quiet {
            config.set("CONSOLE", "CONCISE");
        }
        config.save(&cfg_path)?;

        fs::create_dir_all(output_dir)?;
        let mut args = vec![
            "-f".to_string(),
            cfg_path.display().to_string(),
            "-n".to_string(),
            condition.partitions.to_string(),
            "-g".to_string(),
            condition.gradient.clone(),
            "-o".to_string(),
            condition.optimization.clone(),
            "-z".to_string(),
            condition.nzones.to_string(),
            "-q".to_string(),
            if condition.quiet { "True" } else { "False" }.to_string(),
        ];
        if !condition.projectname.is_empty() {
            args.extend(["-r".to_string(), condition.projectname.clone()]);
        }
        let command = self.settings.shape_optimization.with_args(args);
        execute_checked(&command, &CommandOptions::in_dir(output_dir))?;

        read_metrics(&output_dir.join("history_project.csv"), &columns)
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Map requested names to history columns. An empty request selects all.
fn select_columns(
    requested: &[String],
    known: &[(&'static str, &'static str)],
) -> Result<Vec<(&'static str, &'static str)>> {
    if requested.is_empty() {
        return Ok(known.to_vec());
    }
    requested
        .iter()
        .map(|name| {
            known
                .iter()
                .find(|(metric, _)| *metric == name.as_str())
                .copied()
                .ok_or_else(|| {
                    let names: Vec<&str> = known.iter().map(|(metric, _)| *metric).collect();
                    MidbenchError::configuration(format!(
                        "unknown metric `{}` (expected one of: {})",
                        name,
                        names.join(", ")
                    ))
                })
        })
        .collect()
}

fn read_metrics(history: &Path, columns: &[(&str, &str)]) -> Result<Metrics> {
    let history = History::load(history)?;
    columns
        .iter()
        .map(|(metric, column)| -> Result<(String, f64)> {
            Ok((metric.to_string(), history.last(column)?))
        })
        .collect()
}

fn make_env(kwargs: &Kwargs) -> Result<Box<dyn Environment>> {
    Ok(Box::new(Airfoil2dEnv::new(from_kwargs(kwargs)?)))
}

fn make_design(kwargs: &Kwargs) -> Result<Box<dyn Design>> {
    let mut design: Airfoil2dDesign = from_kwargs(kwargs)?;
    design.su2 = std::path::absolute(&design.su2)?;
    Ok(Box::new(design))
}

fn make_condition(kwargs: &Kwargs) -> Result<Box<dyn Condition>> {
    Ok(Box::new(from_kwargs::<Airfoil2dCondition>(kwargs)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kwargs(value: serde_json::Value) -> Kwargs {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn condition_defaults() {
        let condition: Airfoil2dCondition = from_kwargs(&Kwargs::new()).unwrap();
        assert_eq!(condition.mach, 0.8);
        assert_eq!(condition.reynolds, 8_000_000.0);
        assert_eq!(condition.gradient, "CONTINUOUS_ADJOINT");
        assert_eq!(condition.nzones, 1);
    }

    #[test]
    fn condition_rejects_unknown_kwarg() {
        let err = make_condition(&kwargs(json!({"mach_number": 0.7}))).unwrap_err();
        assert!(err.to_string().contains("mach_number"));
    }

    #[test]
    fn settings_accept_command_strings() {
        let settings: Airfoil2dSettings =
            from_kwargs(&kwargs(json!({"su2_cfd": "mpirun -n 4 SU2_CFD"}))).unwrap();
        assert_eq!(settings.su2_cfd.argv(), ["mpirun", "-n", "4", "SU2_CFD"]);
        assert_eq!(settings.cfgfile_opt, PathBuf::from("config_opt.cfg"));
    }

    #[test]
    fn normalize_chord_rescales_x_only() {
        let out = normalize_chord("2.0 0.1\n4.0 -0.1\n3.0 0.0\n").unwrap();
        let rows: Vec<Vec<f64>> = out
            .lines()
            .map(|l| l.split_whitespace().map(|v| v.parse().unwrap()).collect())
            .collect();
        assert_eq!(rows[0], [0.0, 0.1]);
        assert_eq!(rows[1], [1.0, -0.1]);
        assert_eq!(rows[2], [0.5, 0.0]);
    }

    #[test]
    fn normalize_chord_rejects_bad_rows() {
        assert!(normalize_chord("1.0 2.0 3.0\n").is_err());
        assert!(normalize_chord("a b\n").is_err());
        assert!(normalize_chord("1.0 0.0\n1.0 1.0\n").is_err());
    }

    #[test]
    fn design_without_coords_keeps_mesh() {
        let mut design = Airfoil2dDesign::default();
        design.prepare().unwrap();
        assert_eq!(design.su2, PathBuf::from("mesh_NACA0012_inv.su2"));
    }

    #[test]
    fn unknown_metric_fails_before_running_solver() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut env = Airfoil2dEnv::default();
        let design = Airfoil2dDesign {
            su2: temp.path().join("mesh.su2"),
            ..Default::default()
        };
        let err = env
            .simulate(
                &design,
                &Airfoil2dCondition::default(),
                &["thrust".to_string()],
                temp.path(),
            )
            .unwrap_err();
        assert!(err.to_string().contains("thrust"));
        assert!(err.to_string().contains("drag, lift"));
    }

    #[cfg(unix)]
    #[test]
    fn simulate_rewrites_config_and_reads_history() {
        let temp = tempfile::TempDir::new().unwrap();
        let mesh_dir = temp.path().join("mesh");
        let out_dir = temp.path().join("out");
        fs::create_dir_all(&mesh_dir).unwrap();
        fs::write(mesh_dir.join("config_simu.cfg"), "MACH_NUMBER= 0.5\n").unwrap();

        // Stand-in solver: write a history file into the working directory.
        let solver = CommandLine::new([
            "sh",
            "-c",
            "printf '\"Inner_Iter\",\"CD\",\"CL\"\\n0,0.2,0.1\\n1,0.0125,0.348\\n' > history.csv",
            "su2",
        ]);
        let mut env = Airfoil2dEnv::new(Airfoil2dSettings {
            su2_cfd: solver,
            ..Default::default()
        });
        let design = Airfoil2dDesign {
            su2: mesh_dir.join("mesh.su2"),
            ..Default::default()
        };

        let metrics = env
            .simulate(&design, &Airfoil2dCondition::default(), &[], &out_dir)
            .unwrap();
        assert_eq!(metrics["drag"], 0.0125);
        assert_eq!(metrics["lift"], 0.348);

        let cfg = Su2Config::load(&mesh_dir.join("config_simu.cfg")).unwrap();
        assert_eq!(cfg.get("MACH_NUMBER"), Some("0.8"));
        assert_eq!(cfg.get("AOA"), Some("0"));
        assert!(cfg.get("MESH_FILENAME").unwrap().ends_with("mesh.su2"));
    }

    #[test]
    fn wrong_design_type_is_rejected() {
        #[derive(Debug)]
        struct Other;
        impl Design for Other {}

        let mut env = Airfoil2dEnv::default();
        let err = env
            .simulate(&Other, &Airfoil2dCondition::default(), &[], Path::new("."))
            .unwrap_err();
        assert!(err.to_string().contains("Airfoil2dDesign"));
    }
}
