use anyhow::Result;
use cohort_model::AgeCohort;
use comfy_table::Table;
use tracing::info_span;

use cohort_cli::pipeline::{RunOptions, run};
use cohort_cli::types::RunResult;

use crate::cli::RunArgs;
use crate::summary::apply_table_style;

pub fn run_cohorts() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Index", "Cohort", "Ages"]);
    apply_table_style(&mut table);
    for cohort in AgeCohort::ALL {
        table.add_row(vec![
            cohort.index().to_string(),
            cohort.label().to_string(),
            cohort.age_range(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_transform(args: &RunArgs) -> Result<RunResult> {
    let span = info_span!("run", input = %args.input.display(), dry_run = args.dry_run);
    let _guard = span.enter();
    let options = RunOptions {
        input: args.input.clone(),
        output: args.output.clone(),
        dry_run: args.dry_run,
    };
    run(&options)
}
