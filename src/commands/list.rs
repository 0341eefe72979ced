//! List command

use console::Style;

use super::context::Context;
use crate::cli::ListArgs;
use crate::domain::{CognitiveType, InstallScope};
use crate::error::Result;
use crate::platform::Platform;

pub fn run(ctx: &Context, args: ListArgs) -> Result<()> {
    if args.platforms {
        list_platforms(ctx);
        return Ok(());
    }

    let lock = ctx.lock()?.read();
    if lock.cognitives.is_empty() {
        println!("No cognitives installed.");
        return Ok(());
    }

    println!(
        "{} ({}):",
        Style::new().bold().apply_to("Installed cognitives"),
        lock.cognitives.len()
    );
    for (name, entry) in &lock.cognitives {
        println!(
            "  {} {} {}",
            Style::new().bold().yellow().apply_to(name),
            Style::new().dim().apply_to(format!("[{}]", entry.cognitive_type)),
            entry.source
        );
        if args.detailed {
            let category = entry
                .category
                .as_deref()
                .unwrap_or(&ctx.settings.default_category);
            if let Ok(path) = ctx.paths.canonical_path(
                entry.cognitive_type,
                category,
                name,
                ctx.scope,
                ctx.project_root(),
            ) {
                println!("    {} {}", Style::new().bold().apply_to("Path:"), path.display());
            }
            println!("    {} {}", Style::new().bold().apply_to("Provider:"), entry.source_type);
            let hash = if entry.content_hash.is_empty() {
                "(unknown)"
            } else {
                entry.content_hash.as_str()
            };
            println!("    {} {}", Style::new().bold().apply_to("Hash:"), hash);
            println!(
                "    {} {}",
                Style::new().bold().apply_to("Updated:"),
                entry.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
    }
    Ok(())
}

fn list_platforms(ctx: &Context) {
    println!("{}", Style::new().bold().apply_to("Platforms:"));
    for platform in ctx.registry.all() {
        println!(
            "  {} {} {}",
            Style::new().cyan().apply_to(&platform.id),
            platform.name,
            Style::new().dim().apply_to(describe_support(platform, ctx.scope))
        );
    }
}

fn describe_support(platform: &Platform, scope: InstallScope) -> String {
    if platform.universal {
        return "(reads the store directly)".to_string();
    }
    let types: Vec<&str> = CognitiveType::ALL
        .into_iter()
        .filter(|t| platform.dir_for(*t, scope).is_some())
        .map(CognitiveType::as_str)
        .collect();
    if types.is_empty() {
        format!("(nothing in {scope} scope)")
    } else {
        format!("({})", types.join(", "))
    }
}
