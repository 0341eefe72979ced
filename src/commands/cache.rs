//! Cache command

use console::Style;

use super::context::Context;
use crate::cache::{SourceCache, SystemClock};
use crate::cli::{CacheArgs, CacheSubcommand};
use crate::error::Result;

pub fn run(ctx: &Context, args: &CacheArgs) -> Result<()> {
    let clock = SystemClock;
    let cache = ctx.source_cache(&clock);

    match args.command.unwrap_or(CacheSubcommand::Stats) {
        CacheSubcommand::Stats => show_cache_stats(&cache),
        CacheSubcommand::Clear => {
            cache.clear();
            println!("{}", Style::new().green().apply_to("Cache cleared."));
        }
    }
    Ok(())
}

fn show_cache_stats(cache: &SourceCache<'_>) {
    let stats = cache.stats();

    println!("{}", Style::new().bold().apply_to("Cache Statistics:"));
    println!("  Location: {}", cache.root().display());
    println!("  Clones: {}", stats.clones);
    println!("  Fetches: {}", stats.fetches);
    println!("  Size: {}", stats.formatted_size());

    if stats.clones == 0 && stats.fetches == 0 {
        println!("\nCache is empty.");
    } else {
        println!("\nRun 'cognit cache clear' to remove everything from cache.");
    }
}
