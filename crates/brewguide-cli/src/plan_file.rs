//! Loading brew plans handed to the CLI.

use std::path::Path;

use brewguide_core::BrewPlan;

/// Read a plan from a `.json` or `.toml` file and validate it.
///
/// # Errors
/// Returns an error if the file cannot be read, parsed, or fails validation.
pub fn load_plan(path: &Path) -> Result<BrewPlan, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read plan {}: {e}", path.display()))?;
    let plan: BrewPlan = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        _ => toml::from_str(&content)?,
    };
    plan.validate()?;
    Ok(plan)
}
