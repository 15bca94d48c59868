//! Core environment vocabulary.
//!
//! An [`Environment`] is a simulation/optimization problem. It is evaluated on
//! a [`Design`] (the object being optimized) under a [`Condition`] (the
//! operating parameters). Environments are constructed by the registry from
//! keyword arguments; designs and conditions are constructed by the caller
//! through the [`DesignFactory`] and [`ConditionFactory`] the registry hands out.

use std::any::{type_name, Any};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::{MidbenchError, Result};
use crate::registration::EnvSpec;

/// Keyword arguments passed to constructors.
pub type Kwargs = serde_json::Map<String, serde_json::Value>;

/// Named scalar results of a simulation or optimization run.
pub type Metrics = BTreeMap<String, f64>;

/// A simulation/optimization problem.
///
/// Both operations default to [`MidbenchError::Unsupported`]; environments
/// override the ones their solver provides.
pub trait Environment: Any + Send {
    /// Human-readable environment name, used in error messages.
    fn name(&self) -> &str;

    /// Evaluate `design` under `condition` and report the requested metrics.
    fn simulate(
        &mut self,
        design: &dyn Design,
        condition: &dyn Condition,
        metrics: &[String],
        output_dir: &Path,
    ) -> Result<Metrics> {
        let _ = (design, condition, metrics, output_dir);
        Err(MidbenchError::Unsupported {
            env: self.name().to_string(),
            operation: "simulate".to_string(),
        })
    }

    /// Optimize `design` under `condition` and report the requested objectives.
    fn optimize(
        &mut self,
        design: &dyn Design,
        condition: &dyn Condition,
        objectives: &[String],
        output_dir: &Path,
    ) -> Result<Metrics> {
        let _ = (design, condition, objectives, output_dir);
        Err(MidbenchError::Unsupported {
            env: self.name().to_string(),
            operation: "optimize".to_string(),
        })
    }
}

/// A parameterization of the object being optimized.
pub trait Design: Any + fmt::Debug + Send {
    /// Generate whatever files the solver needs before evaluation.
    fn prepare(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Operating parameters under which an environment is evaluated.
pub trait Condition: Any + fmt::Debug + Send {}

/// Downcast a design to the concrete type an environment expects.
pub fn downcast_design<T: Design>(design: &dyn Design) -> Result<&T> {
    (design as &dyn Any)
        .downcast_ref::<T>()
        .ok_or_else(|| {
            MidbenchError::configuration(format!("expected a {} design", short_name::<T>()))
        })
}

/// Downcast a condition to the concrete type an environment expects.
pub fn downcast_condition<T: Condition>(condition: &dyn Condition) -> Result<&T> {
    (condition as &dyn Any)
        .downcast_ref::<T>()
        .ok_or_else(|| {
            MidbenchError::configuration(format!("expected a {} condition", short_name::<T>()))
        })
}

fn short_name<T>() -> &'static str {
    let full = type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Deserialize keyword arguments into a typed settings struct.
///
/// Settings structs are expected to use `#[serde(default)]` so that omitted
/// keys keep their defaults.
pub fn from_kwargs<T: DeserializeOwned>(kwargs: &Kwargs) -> Result<T> {
    serde_json::from_value(serde_json::Value::Object(kwargs.clone())).map_err(|e| {
        MidbenchError::configuration(format!(
            "invalid arguments for {}: {}",
            short_name::<T>(),
            e
        ))
    })
}

type FactoryFn<T> = dyn Fn(&Kwargs) -> Result<Box<T>> + Send + Sync;

/// A shared constructor producing boxed trait objects from keyword arguments.
pub struct Factory<T: ?Sized> {
    create: Arc<FactoryFn<T>>,
}

/// Constructor for environments.
pub type EnvCreator = Factory<dyn Environment>;

/// Constructor for designs, handed to callers by `make`.
pub type DesignFactory = Factory<dyn Design>;

/// Constructor for conditions, handed to callers by `make`.
pub type ConditionFactory = Factory<dyn Condition>;

impl<T: ?Sized> Factory<T> {
    /// Wrap a constructor function.
    pub fn new<F>(create: F) -> Self
    where
        F: Fn(&Kwargs) -> Result<Box<T>> + Send + Sync + 'static,
    {
        Self {
            create: Arc::new(create),
        }
    }

    /// Construct an instance.
    pub fn create(&self, kwargs: &Kwargs) -> Result<Box<T>> {
        (self.create)(kwargs)
    }

    /// Construct an instance with no arguments.
    pub fn create_default(&self) -> Result<Box<T>> {
        self.create(&Kwargs::new())
    }

    /// Whether two factories wrap the same constructor.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.create, &other.create)
    }
}

impl<T: ?Sized> Clone for Factory<T> {
    fn clone(&self) -> Self {
        Self {
            create: Arc::clone(&self.create),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Factory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory").finish_non_exhaustive()
    }
}

/// An environment instance together with the registration it was made from.
pub struct Env {
    inner: Box<dyn Environment>,
    spec: EnvSpec,
}

impl Env {
    pub(crate) fn new(inner: Box<dyn Environment>, spec: EnvSpec) -> Self {
        Self { inner, spec }
    }

    /// The resolved registration, with `kwargs` set to the values the
    /// environment was constructed with.
    pub fn spec(&self) -> &EnvSpec {
        &self.spec
    }

    /// The wrapped environment.
    pub fn unwrapped(&self) -> &dyn Environment {
        self.inner.as_ref()
    }

    /// Downcast the wrapped environment to a concrete type.
    pub fn downcast_ref<T: Environment>(&self) -> Option<&T> {
        (self.inner.as_ref() as &dyn Any).downcast_ref::<T>()
    }

    /// Run [`Environment::simulate`].
    pub fn simulate(
        &mut self,
        design: &dyn Design,
        condition: &dyn Condition,
        metrics: &[String],
        output_dir: &Path,
    ) -> Result<Metrics> {
        tracing::debug!(env = %self.spec.id, ?metrics, "simulating");
        self.inner.simulate(design, condition, metrics, output_dir)
    }

    /// Run [`Environment::optimize`].
    pub fn optimize(
        &mut self,
        design: &dyn Design,
        condition: &dyn Condition,
        objectives: &[String],
        output_dir: &Path,
    ) -> Result<Metrics> {
        tracing::debug!(env = %self.spec.id, ?objectives, "optimizing");
        self.inner.optimize(design, condition, objectives, output_dir)
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("name", &self.inner.name())
            .field("spec", &self.spec)
            .finish()
    }
}

/// The triad returned by [`Registry::make`](crate::registration::Registry::make).
#[derive(Debug)]
pub struct MadeEnv {
    /// The constructed environment.
    pub env: Env,
    /// Constructor for the environment's designs.
    pub designs: DesignFactory,
    /// Constructor for the environment's conditions.
    pub conditions: ConditionFactory,
}
