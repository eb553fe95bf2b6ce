//! Handler for `stepwise deps`.

use miette::Result;
use serde::Serialize;
use stepwise_core::unit::{Unit, VersionedUnit};
use stepwise_core::version::Version;
use stepwise_resolver::{EdgeKind, Model, UnitId};
use stepwise_util::errors::{StepwiseError, StepwiseResult};

use super::{print_json, Context, Project};

pub struct DepsOptions {
    pub inverted: bool,
    pub closure: bool,
    pub depth: Option<usize>,
    pub why: Option<Version>,
}

#[derive(Serialize)]
struct Edge {
    version: String,
    kind: &'static str,
}

#[derive(Serialize)]
struct DepsReport {
    unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependencies: Option<Vec<Edge>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependents: Option<Vec<Edge>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    closure: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<Vec<String>>,
}

pub fn exec(ctx: &Context, version: &Version, opts: &DepsOptions) -> Result<()> {
    let project = Project::load(ctx)?;
    let model = &project.model;
    let id = find_unit(model, version)?;
    let graph = model.graph();

    let mut report = DepsReport {
        unit: graph.version(id).to_string(),
        dependencies: None,
        dependents: None,
        closure: None,
        path: None,
    };

    if let Some(target) = &opts.why {
        let target_id = find_unit(model, target)?;
        let Some(path) = graph.find_path(id, target_id) else {
            if ctx.json() {
                report.path = Some(Vec::new());
                print_json(&report)?;
            } else {
                println!("{} does not depend on {}", report.unit, graph.version(target_id));
            }
            return Ok(());
        };
        let path: Vec<String> = path.iter().map(|p| graph.version(*p).to_string()).collect();
        if ctx.json() {
            report.path = Some(path);
            print_json(&report)?;
        } else {
            println!("{}", path.join(" -> "));
        }
        return Ok(());
    }

    if opts.closure {
        let closure = model.dependencies_of(version).unwrap_or_default();
        if ctx.json() {
            report.closure = Some(closure.iter().map(|u| u.version().to_string()).collect());
            print_json(&report)?;
        } else if closure.is_empty() {
            println!("{} has no dependencies", report.unit);
        } else {
            println!("{} requires ({}):", report.unit, closure.len());
            for unit in closure {
                println!("  {}", unit.version());
            }
        }
        return Ok(());
    }

    if opts.inverted {
        if ctx.json() {
            report.dependents = Some(edges(model, graph.dependents_of(id)));
            print_json(&report)?;
        } else {
            print!("{}", graph.print_inverted_tree(id));
        }
        return Ok(());
    }

    if ctx.json() {
        report.dependencies = Some(edges(model, graph.dependencies_of(id)));
        print_json(&report)?;
    } else {
        print!("{}", graph.print_tree(id, opts.depth));
    }
    Ok(())
}

fn find_unit(model: &Model<Unit>, version: &Version) -> StepwiseResult<UnitId> {
    model.id_of(version).ok_or_else(|| StepwiseError::Generic {
        message: format!("No unit with version {version}"),
    })
}

fn edges(model: &Model<Unit>, list: Vec<(UnitId, EdgeKind)>) -> Vec<Edge> {
    list.into_iter()
        .map(|(id, kind)| Edge {
            version: model.graph().version(id).to_string(),
            kind: match kind {
                EdgeKind::Predecessor => "previous",
                EdgeKind::Declared => "declared",
            },
        })
        .collect()
}
