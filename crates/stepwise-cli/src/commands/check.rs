//! Handler for `stepwise check`.

use miette::Result;
use serde::Serialize;
use stepwise_util::status::status;

use super::{print_json, Context, Project};

#[derive(Serialize)]
struct CheckReport<'a> {
    name: &'a str,
    namespaces: &'a [String],
    units: usize,
    edges: usize,
    valid: bool,
}

pub fn exec(ctx: &Context) -> Result<()> {
    let project = Project::load(ctx)?;
    let model = &project.model;

    if ctx.json() {
        print_json(&CheckReport {
            name: project.name(),
            namespaces: model.names(),
            units: model.len(),
            edges: model.graph().edge_count(),
            valid: true,
        })?;
        return Ok(());
    }

    status("Checked", project.name());
    println!(
        "{}: {} units across {} namespaces, no cycles, all dependencies satisfied",
        project.name(),
        model.len(),
        model.names().len()
    );
    Ok(())
}
