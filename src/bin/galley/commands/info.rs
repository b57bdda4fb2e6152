//! `galley info` command

use anyhow::Result;
use serde_json::json;

use crate::cli::InfoArgs;
use crate::commands::load_recipe;
use galley::core::recipe::Recipe;
use galley::util::fs::glob_files;

pub fn execute(args: InfoArgs) -> Result<()> {
    let recipe = load_recipe(args.recipe.as_deref())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info_json(&recipe))?);
        return Ok(());
    }

    let package = &recipe.package;
    println!("{}/{}", package.name, package.version);
    if let Some(description) = &package.description {
        println!("  {}", description);
    }
    print_field("license", package.license.as_deref());
    print_field("author", package.author.as_deref());
    print_field("url", package.url.as_deref());
    if !package.topics.is_empty() {
        println!("topics: {}", package.topics.join(", "));
    }
    if let Some(std) = recipe.requirements.min_cppstd {
        println!("requires: {} or newer", std);
    }

    println!("options:");
    for decl in recipe.schema.iter() {
        print!("  {} = {} {}", decl.name, decl.default, decl.domain);
        if let Some(description) = &decl.description {
            print!("  # {}", description);
        }
        println!();
    }

    if !package.exports_sources.is_empty() {
        let files = glob_files(&recipe.recipe_dir, &package.exports_sources)?;
        println!("exports_sources ({} files found):", files.len());
        for pattern in &package.exports_sources {
            println!("  {}", pattern);
        }
    }

    if let Some(test) = &recipe.requirements.test {
        println!(
            "test framework: {}/{} (when {} is enabled)",
            test.name, test.version, recipe.build.tests_option
        );
    }

    Ok(())
}

fn print_field(name: &str, value: Option<&str>) {
    if let Some(value) = value {
        println!("{}: {}", name, value);
    }
}

fn info_json(recipe: &Recipe) -> serde_json::Value {
    let package = &recipe.package;
    let options: Vec<_> = recipe
        .schema
        .iter()
        .map(|decl| {
            json!({
                "name": decl.name,
                "domain": decl.domain.to_string(),
                "default": decl.default.to_string(),
                "description": decl.description,
            })
        })
        .collect();

    json!({
        "name": package.name,
        "version": package.version.to_string(),
        "license": package.license,
        "author": package.author,
        "url": package.url,
        "description": package.description,
        "topics": package.topics,
        "exports_sources": package.exports_sources,
        "min_cppstd": recipe.requirements.min_cppstd.map(|s| s.as_number()),
        "options": options,
    })
}
