use clap::Subcommand;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

use brewguide_core::BrewPlan;

use super::emit;
use crate::plan_file::load_plan;

#[derive(Subcommand)]
pub enum PlanAction {
    /// Print a plan as JSON with its totals
    Show {
        /// Plan file (.toml or .json)
        file: PathBuf,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Check that a plan file is usable for a session
    Validate {
        /// Plan file (.toml or .json)
        file: PathBuf,
    },
}

#[derive(Serialize)]
struct PlanSummary<'a> {
    step_count: usize,
    timed_step_count: usize,
    total_duration_secs: f64,
    plan: &'a BrewPlan,
}

impl<'a> PlanSummary<'a> {
    fn new(plan: &'a BrewPlan) -> Self {
        Self {
            step_count: plan.len(),
            timed_step_count: plan.timed_step_count(),
            total_duration_secs: plan.total_duration().as_secs_f64(),
            plan,
        }
    }
}

pub fn run(action: PlanAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PlanAction::Show { file, pretty } => {
            let plan = load_plan(&file)?;
            emit(&PlanSummary::new(&plan), pretty)?;
        }
        PlanAction::Validate { file } => {
            let plan = load_plan(&file)?;
            writeln!(
                std::io::stdout().lock(),
                "ok: {} steps, {} timed, {}s total",
                plan.len(),
                plan.timed_step_count(),
                plan.total_duration().as_secs_f64()
            )?;
        }
    }
    Ok(())
}
