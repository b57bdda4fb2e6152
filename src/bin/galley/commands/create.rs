//! `galley create` command

use anyhow::{Context, Result};

use crate::cli::CreateArgs;
use crate::commands::{default_dir, load_inputs};
use galley::builder::cmake::CMakeBackend;
use galley::builder::provider::PrefixProvider;
use galley::ops::{create, resolve, CreateOptions};
use galley::util::diagnostic::{emit, suggestions, Diagnostic};

pub fn execute(args: CreateArgs, verbose: bool, color: bool) -> Result<()> {
    let inputs = load_inputs(&args.input)?;
    let config = &inputs.config;

    // Directories are keyed by package ID, so resolve once up front
    let package_id = resolve(&inputs.recipe, &inputs.settings, &inputs.overrides)?.package_id;

    let build_dir = args
        .build_dir
        .or_else(|| config.build.build_dir.as_ref().map(|d| d.join(&package_id)))
        .unwrap_or_else(|| default_dir("build", &package_id));
    let package_dir = args
        .package_dir
        .or_else(|| config.build.package_dir.as_ref().map(|d| d.join(&package_id)))
        .unwrap_or_else(|| default_dir("package", &package_id));

    let generator = args.generator.or_else(|| config.build.generator.clone());
    let backend = CMakeBackend::detect(generator)?;
    let provider =
        PrefixProvider::new(config.dependencies.prefixes.clone()).with_env_prefix_path();

    let options = CreateOptions {
        source_dir: args.source,
        build_dir,
        package_dir,
        jobs: args.jobs.or(config.build.jobs),
        verbose,
        harness: !args.no_harness && !config.harness.skip,
    };

    let outcome = create(
        &inputs.recipe,
        &inputs.settings,
        &inputs.overrides,
        &backend,
        &provider,
        &options,
    )
    .with_context(|| {
        format!(
            "failed to create {}\n{}",
            inputs.recipe.name(),
            suggestions::CREATE_FAILED
        )
    })?;

    if args.json {
        let value = inputs.adapter().render(&outcome.resolution, &outcome.metadata);
        println!("{}", serde_json::to_string_pretty(&value)?);
    }

    if let Some(report) = &outcome.build.test_report {
        eprintln!("      Tested {} of {} passed", report.passed, report.total);
    }
    match &outcome.harness {
        Some(harness) if harness.executed => eprintln!("     Harness ran"),
        Some(harness) => emit(
            &Diagnostic::warning("harness built but not executed")
                .with_context(format!(
                    "target `{}` cannot run on this host",
                    inputs.settings.os
                ))
                .with_location(harness.executable.clone())
                .with_suggestion("Run the example on a matching machine to finish the check"),
            color,
        ),
        None => {}
    }
    eprintln!(
        "    Finished {} ({}) -> {}",
        outcome.metadata.reference(),
        outcome.metadata.linkage,
        outcome.build.package_dir.display()
    );

    Ok(())
}
