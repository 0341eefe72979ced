//! Remove command

use console::Style;

use super::context::Context;
use crate::cli::RemoveArgs;
use crate::domain::{InstallMode, InstallTarget};
use crate::error::{Result, not_installed, platform_not_supported};

pub fn run(ctx: &Context, args: RemoveArgs) -> Result<()> {
    let lock = ctx.lock()?;
    let entry = lock
        .get_entry(&args.name)
        .ok_or_else(|| not_installed(&args.name))?;
    let installer = ctx.installer();

    let platforms: Vec<String> = if args.from.is_empty() {
        ctx.registry.ids().into_iter().map(str::to_string).collect()
    } else {
        for id in &args.from {
            if ctx.registry.get(id).is_none() {
                return Err(platform_not_supported(id));
            }
        }
        args.from.clone()
    };

    for id in &platforms {
        // Mode does not matter for removal; the link or copy goes either way
        let target = InstallTarget::new(id.clone(), ctx.scope, InstallMode::Symlink);
        if installer.remove(&args.name, entry.cognitive_type, &target, ctx.project_root()) {
            println!(
                "  {} {}",
                Style::new().green().apply_to("✓"),
                Style::new().cyan().apply_to(id)
            );
        }
    }

    if !args.from.is_empty() {
        return Ok(());
    }

    let category = entry
        .category
        .clone()
        .unwrap_or_else(|| ctx.settings.default_category.clone());
    if !installer.remove_canonical(
        &args.name,
        entry.cognitive_type,
        &category,
        ctx.scope,
        ctx.project_root(),
    ) {
        tracing::debug!(name = %args.name, "no canonical copy to remove");
    }
    lock.remove_entry(&args.name)?;

    println!(
        "{} {}",
        Style::new().green().bold().apply_to("Removed"),
        Style::new().bold().apply_to(&args.name)
    );
    Ok(())
}
