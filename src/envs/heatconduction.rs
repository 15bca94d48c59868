//! 2D heat-conduction topology optimization through FEniCS scripts.
//!
//! Both the design generator and the simulator are Python scripts that
//! exchange tab-separated parameter files inside a working directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{
    downcast_condition, downcast_design, from_kwargs, Condition, Design, Environment, Kwargs,
    Metrics,
};
use crate::error::{MidbenchError, Result};
use crate::registration::{ModuleDef, ModuleReg, StaticAttr};
use crate::shell::{execute_checked, CommandLine, CommandOptions};

pub const MODULE_PATH: &str = "midbench.envs.heatconduction.heatconduction2d";

pub static MODULE: ModuleDef = ModuleDef {
    path: MODULE_PATH,
    attrs: &[
        ("Heatconduction2dEnv", StaticAttr::Env(make_env)),
        ("Heatconduction2dDesign", StaticAttr::Design(make_design)),
        (
            "Heatconduction2dCondition",
            StaticAttr::Condition(make_condition),
        ),
    ],
    on_import: None,
};

inventory::submit! { ModuleReg(&MODULE) }

const OBJECTIVE: &str = "performance";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Heatconduction2dCondition {
    /// Volume fraction bound.
    pub volume: f64,
    /// Length of the heat sink on the boundary.
    pub length: f64,
    pub resolution: u32,
}

impl Default for Heatconduction2dCondition {
    fn default() -> Self {
        Self {
            volume: 0.5,
            length: 0.5,
            resolution: 50,
        }
    }
}

impl Condition for Heatconduction2dCondition {}

/// A uniform initial material distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Heatconduction2dDesign {
    pub volume: f64,
    pub resolution: u32,
    /// Directory holding the scripts and their exchange files.
    pub workdir: PathBuf,
    pub design_script: CommandLine,
    /// Set by [`prepare`](Design::prepare).
    #[serde(skip_deserializing)]
    pub xdmf: Option<PathBuf>,
}

impl Default for Heatconduction2dDesign {
    fn default() -> Self {
        Self {
            volume: 0.5,
            resolution: 50,
            workdir: PathBuf::from("."),
            design_script: CommandLine::parse("python3 designHeatconduction2d.py"),
            xdmf: None,
        }
    }
}

impl Heatconduction2dDesign {
    /// Where the design script writes the mesh for these parameters.
    pub fn xdmf_path(&self) -> PathBuf {
        self.workdir.join("Design").join(format!(
            "initial_v={}_resol={}_.xdmf",
            python_float(self.volume),
            self.resolution
        ))
    }
}

impl Design for Heatconduction2dDesign {
    fn prepare(&mut self) -> Result<()> {
        fs::create_dir_all(self.workdir.join("Design"))?;
        fs::write(
            self.workdir.join("Des_var.txt"),
            format!("{:.6}\t{}", self.volume, self.resolution),
        )?;
        execute_checked(&self.design_script, &CommandOptions::in_dir(&self.workdir))?;

        let xdmf = self.xdmf_path();
        if !xdmf.exists() {
            return Err(MidbenchError::SolverOutput {
                path: xdmf,
                message: "design script did not produce a mesh".to_string(),
            });
        }
        self.xdmf = Some(std::path::absolute(xdmf)?);
        Ok(())
    }
}

/// Format like Python's `str(float)`, which the scripts use in file names.
fn python_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Heatconduction2dSettings {
    pub workdir: PathBuf,
    pub simulate_script: CommandLine,
}

impl Default for Heatconduction2dSettings {
    fn default() -> Self {
        Self {
            workdir: PathBuf::from("."),
            simulate_script: CommandLine::parse("python3 simulateHeatconduction2d.py"),
        }
    }
}

/// The heat-conduction environment. Only optimization is provided.
#[derive(Debug, Clone, Default)]
pub struct Heatconduction2dEnv {
    pub settings: Heatconduction2dSettings,
}

impl Heatconduction2dEnv {
    pub fn new(settings: Heatconduction2dSettings) -> Self {
        Self { settings }
    }
}

impl Environment for Heatconduction2dEnv {
    fn name(&self) -> &str {
        "HeatConduction2d"
    }

    fn optimize(
        &mut self,
        design: &dyn Design,
        condition: &dyn Condition,
        objectives: &[String],
        output_dir: &Path,
    ) -> Result<Metrics> {
        let design = downcast_design::<Heatconduction2dDesign>(design)?;
        let condition = downcast_condition::<Heatconduction2dCondition>(condition)?;

        if let Some(other) = objectives.iter().find(|o| o.as_str() != OBJECTIVE) {
            return Err(MidbenchError::configuration(format!(
                "unknown objective `{}` (expected: {})",
                other, OBJECTIVE
            )));
        }
        let xdmf = design.xdmf.as_ref().ok_or_else(|| {
            MidbenchError::configuration("the design must be prepared before optimizing")
        })?;

        let workdir = &self.settings.workdir;
        fs::write(
            workdir.join("sim_var.txt"),
            format!(
                "{:.6}\t{:.6}\t{}",
                condition.volume, condition.length, condition.resolution
            ),
        )?;
        fs::write(
            workdir.join("sim_design.txt"),
            format!("{}\t{}", xdmf.display(), design.resolution),
        )?;
        execute_checked(
            &self.settings.simulate_script,
            &CommandOptions::in_dir(workdir),
        )?;

        let performance_path = workdir.join("RES").join("Performance.txt");
        let performance = read_performance(&performance_path)?;

        fs::create_dir_all(output_dir)?;
        fs::copy(&performance_path, output_dir.join("Performance.txt"))?;

        Ok(Metrics::from([(OBJECTIVE.to_string(), performance)]))
    }
}

fn read_performance(path: &Path) -> Result<f64> {
    let text = fs::read_to_string(path).map_err(|e| MidbenchError::SolverOutput {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    text.trim()
        .parse()
        .map_err(|_| MidbenchError::SolverOutput {
            path: path.to_path_buf(),
            message: format!("expected a number, found `{}`", text.trim()),
        })
}

fn make_env(kwargs: &Kwargs) -> Result<Box<dyn Environment>> {
    Ok(Box::new(Heatconduction2dEnv::new(from_kwargs(kwargs)?)))
}

fn make_design(kwargs: &Kwargs) -> Result<Box<dyn Design>> {
    Ok(Box::new(from_kwargs::<Heatconduction2dDesign>(kwargs)?))
}

fn make_condition(kwargs: &Kwargs) -> Result<Box<dyn Condition>> {
    Ok(Box::new(from_kwargs::<Heatconduction2dCondition>(kwargs)?))
}
