//! `galley matrix` command

use anyhow::Result;
use serde_json::json;

use crate::cli::MatrixArgs;
use crate::commands::load_inputs;
use galley::ops::resolve_matrix;

pub fn execute(args: MatrixArgs) -> Result<()> {
    let inputs = load_inputs(&args.input)?;
    let entries = resolve_matrix(&inputs.recipe, &inputs.settings, &inputs.overrides)?;

    if args.json {
        let values: Vec<_> = entries
            .iter()
            .map(|entry| match &entry.result {
                Ok(resolution) => json!({
                    "overrides": entry.overrides,
                    "package_id": resolution.package_id,
                    "options": resolution.configuration,
                    "dependencies": resolution
                        .dependencies
                        .iter()
                        .map(|d| d.reference())
                        .collect::<Vec<_>>(),
                }),
                Err(e) => json!({
                    "overrides": entry.overrides,
                    "error": e.to_string(),
                }),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    let mut failed = 0;
    for entry in &entries {
        let label: Vec<String> = entry
            .overrides
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();

        match &entry.result {
            Ok(resolution) => println!("{}  {}", resolution.package_id, label.join(" ")),
            Err(e) => {
                failed += 1;
                println!("{:16}  {}  error: {}", "-", label.join(" "), e);
            }
        }
    }

    eprintln!(
        "    Resolved {} permutations ({} failed)",
        entries.len(),
        failed
    );

    Ok(())
}
