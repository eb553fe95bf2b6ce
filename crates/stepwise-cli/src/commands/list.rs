//! Handler for `stepwise list`.

use std::collections::BTreeMap;

use miette::Result;
use stepwise_core::unit::VersionedUnit;
use stepwise_util::errors::StepwiseError;

use super::report::UnitEntry;
use super::{print_json, Context, Project};

pub fn exec(ctx: &Context, namespace: Option<&str>) -> Result<()> {
    let project = Project::load(ctx)?;
    let model = &project.model;

    let names: Vec<&str> = match namespace {
        Some(name) => {
            if !model.names().iter().any(|n| n == name) {
                return Err(StepwiseError::Generic {
                    message: format!(
                        "Unknown namespace '{name}' (known: {})",
                        model.names().join(", ")
                    ),
                }
                .into());
            }
            vec![name]
        }
        None => model.names().iter().map(String::as_str).collect(),
    };

    if ctx.json() {
        let listing: BTreeMap<&str, Vec<UnitEntry>> = names
            .iter()
            .map(|name| {
                let entries = model.list(name).into_iter().map(UnitEntry::new).collect();
                (*name, entries)
            })
            .collect();
        print_json(&listing)?;
        return Ok(());
    }

    for name in names {
        let units = model.list(name);
        println!("{name} ({} units)", units.len());
        for unit in units {
            match &unit.description {
                Some(desc) => println!("  {:<16} {desc}", unit.version().to_string()),
                None => println!("  {}", unit.version()),
            }
        }
    }
    Ok(())
}
