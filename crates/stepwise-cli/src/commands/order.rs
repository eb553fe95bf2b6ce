//! Handler for `stepwise order`.

use miette::Result;
use stepwise_util::status::status_info;

use super::report::PlanReport;
use super::{print_json, Context, Project};

pub fn exec(ctx: &Context) -> Result<()> {
    let project = Project::load(ctx)?;
    let items = project.model.resolve_all()?;

    if ctx.json() {
        print_json(&PlanReport::new(&items))?;
    } else {
        print!("{items}");
        status_info(
            "Ordered",
            &format!(
                "{} units across {} namespaces",
                items.len(),
                project.model.names().len()
            ),
        );
    }
    Ok(())
}
