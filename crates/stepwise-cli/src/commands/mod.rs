//! Command dispatch and handler modules.

mod check;
mod deps;
mod list;
mod order;
mod plan;
mod report;

use std::path::{Path, PathBuf};

use miette::Result;
use serde::Serialize;
use stepwise_core::config::{GlobalConfig, OutputFormat};
use stepwise_core::manifest::Manifest;
use stepwise_core::unit::Unit;
use stepwise_core::MANIFEST_FILE;
use stepwise_resolver::Model;
use stepwise_util::errors::{StepwiseError, StepwiseResult};

use crate::cli::{Cli, Command};

/// Settings shared by every command.
pub struct Context {
    pub manifest_path: Option<PathBuf>,
    pub format: OutputFormat,
    pub config: GlobalConfig,
}

impl Context {
    fn new(cli: &Cli) -> Self {
        let config = GlobalConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load global config, using defaults: {e}");
            GlobalConfig::default()
        });
        let format = if cli.json {
            OutputFormat::Json
        } else {
            config.output.format
        };
        Self {
            manifest_path: cli.manifest.clone(),
            format,
            config,
        }
    }

    pub fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}

/// A parsed manifest together with the model built from it.
pub struct Project {
    pub manifest: Manifest,
    pub model: Model<Unit>,
}

impl Project {
    /// Locate, parse and validate the project manifest.
    pub fn load(ctx: &Context) -> StepwiseResult<Self> {
        let path = match &ctx.manifest_path {
            Some(path) => path.clone(),
            None => {
                let cwd = std::env::current_dir()?;
                stepwise_util::fs::locate_file(&cwd, MANIFEST_FILE)?
            }
        };
        Self::from_path(&path)
    }

    fn from_path(path: &Path) -> StepwiseResult<Self> {
        let manifest = Manifest::from_path(path)?;
        let model = Model::new(
            manifest.project.namespaces.clone(),
            manifest.units.clone(),
        )?;
        Ok(Self { manifest, model })
    }

    /// Project name from `[project]`, or `"project"` if unset.
    pub fn name(&self) -> &str {
        self.manifest.project.name.as_deref().unwrap_or("project")
    }
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> StepwiseResult<()> {
    let out = serde_json::to_string_pretty(value).map_err(|e| StepwiseError::Generic {
        message: format!("Failed to serialize output: {e}"),
    })?;
    println!("{out}");
    Ok(())
}

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    let ctx = Context::new(&cli);
    match cli.command {
        Command::Check => check::exec(&ctx),
        Command::List { namespace } => list::exec(&ctx, namespace.as_deref()),
        Command::Order => order::exec(&ctx),
        Command::Plan {
            from,
            to,
            from_state,
            to_state,
            to_latest,
            allow_unsatisfied,
        } => plan::exec(
            &ctx,
            &plan::PlanArgs {
                from,
                to,
                from_state,
                to_state,
                to_latest,
                allow_unsatisfied,
            },
        ),
        Command::Deps {
            version,
            inverted,
            closure,
            depth,
            why,
        } => deps::exec(
            &ctx,
            &version,
            &deps::DepsOptions {
                inverted,
                closure,
                depth,
                why,
            },
        ),
    }
}
