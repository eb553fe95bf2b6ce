//! Handler for `stepwise plan`.

use miette::Result;
use stepwise_core::version::Version;
use stepwise_util::errors::{StepwiseError, StepwiseResult};
use stepwise_util::status::{status, status_warn};

use super::report::PlanReport;
use super::{print_json, Context, Project};

pub struct PlanArgs {
    pub from: Vec<Version>,
    pub to: Vec<Version>,
    pub from_state: Option<String>,
    pub to_state: Option<String>,
    pub to_latest: bool,
    pub allow_unsatisfied: bool,
}

pub fn exec(ctx: &Context, args: &PlanArgs) -> Result<()> {
    let project = Project::load(ctx)?;
    let (from, to) = endpoints(&project, args)?;
    tracing::debug!("Planning from [{}] to [{}]", join(&from), join(&to));

    let items = project.model.resolve(&from, &to)?;

    if ctx.json() {
        print_json(&PlanReport::new(&items))?;
    } else {
        print!("{items}");
    }

    if items.is_valid() {
        if !ctx.json() && !items.is_empty() {
            status("Planned", &format!("{} units", items.len()));
        }
        return Ok(());
    }

    let unsatisfied: Vec<String> = items
        .unsatisfied_versions()
        .iter()
        .map(ToString::to_string)
        .collect();
    if args.allow_unsatisfied || !ctx.config.plan.fail_on_unsatisfied {
        status_warn("Unsatisfied", &unsatisfied.join(", "));
        return Ok(());
    }
    Err(StepwiseError::Unsatisfied {
        versions: unsatisfied,
    }
    .into())
}

/// Work out the starting and target states from the command-line arguments.
fn endpoints(project: &Project, args: &PlanArgs) -> StepwiseResult<(Vec<Version>, Vec<Version>)> {
    let from = match &args.from_state {
        Some(name) => project.manifest.state(name)?.to_vec(),
        None if args.from.is_empty() => project.model.initial_state(),
        None => args.from.clone(),
    };

    let to = if args.to_latest {
        project.model.latest_state()
    } else if let Some(name) = &args.to_state {
        project.manifest.state(name)?.to_vec()
    } else if !args.to.is_empty() {
        args.to.clone()
    } else {
        return Err(StepwiseError::Generic {
            message: "No target state: pass --to, --to-state or --to-latest".to_string(),
        });
    };

    Ok((from, to))
}

fn join(versions: &[Version]) -> String {
    versions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
