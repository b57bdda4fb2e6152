//! `galley resolve` command

use anyhow::Result;

use crate::cli::ResolveArgs;
use crate::commands::load_inputs;
use galley::ops::{publish, resolve};

pub fn execute(args: ResolveArgs) -> Result<()> {
    let inputs = load_inputs(&args.input)?;
    let resolution = resolve(&inputs.recipe, &inputs.settings, &inputs.overrides)?;

    if args.json {
        let metadata = publish(&resolution.configuration, &inputs.settings, &inputs.recipe);
        let value = inputs.adapter().render(&resolution, &metadata);
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    eprintln!(
        "    Resolved {}/{} for {} (package id {})",
        inputs.recipe.name(),
        inputs.recipe.version(),
        inputs.settings.os,
        resolution.package_id
    );

    println!("options:");
    for (name, value) in resolution.configuration.iter() {
        println!("  {} = {}", name, value);
    }

    println!("dependencies:");
    if resolution.dependencies.is_empty() {
        println!("  (none)");
    }
    for dep in &resolution.dependencies {
        println!("  {}", dep);
    }

    println!("variables:");
    for arg in resolution.variables.to_args() {
        println!("  {}", arg);
    }

    let steps: Vec<String> = resolution.plan.steps.iter().map(|s| s.to_string()).collect();
    println!("steps: {}", steps.join(" -> "));

    Ok(())
}
