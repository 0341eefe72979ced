//! Sync command
//!
//! Repairs re-install units whose provider is `local` from their recorded
//! source directory and refresh the lock hash. Entries from other providers
//! stay remaining; re-fetching them is up to the tool that installed them.

use std::path::Path;

use console::Style;
use inquire::{Confirm, InquireError};

use super::add::{FALLBACK_TARGET, LOCAL_SOURCE_TYPE, local_request};
use super::context::Context;
use crate::cli::SyncArgs;
use crate::domain::{InstallMode, InstallTarget};
use crate::error::{Result, install_failed};
use crate::filesystem::FileSystem;
use crate::hash::directory_hash;
use crate::installer::Installer;
use crate::lockfile::{LockEntry, LockManager};
use crate::reconcile::{SyncIssueKind, SyncOptions, SyncReport};

pub fn run(ctx: &Context, args: &SyncArgs) -> Result<()> {
    let lock = ctx.lock()?;
    let reconciler = ctx.reconciler(&lock);

    let preview = reconciler.sync(SyncOptions::dry_run(), None);
    let confirmed = if preview.issues.is_empty() || args.dry_run {
        false
    } else if args.yes {
        true
    } else {
        if !args.json {
            print_report(&preview);
        }
        confirm(preview.issues.len())?
    };

    if !confirmed {
        if args.json {
            println!("{}", serde_json::to_string_pretty(&preview)?);
        } else if preview.issues.is_empty() || args.dry_run {
            print_report(&preview);
        }
        return Ok(());
    }

    let installer = ctx.installer();
    let handler = |name: &str, entry: &LockEntry, _kind: SyncIssueKind| {
        reinstall(ctx, &installer, &lock, name, entry)
    };
    let report = reconciler.sync(SyncOptions::confirmed(), Some(&handler));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn confirm(count: usize) -> Result<bool> {
    let prompt = format!("Repair {count} issue(s)?");
    match Confirm::new(&prompt).with_default(false).prompt() {
        Ok(answer) => Ok(answer),
        Err(InquireError::NotTTY) => {
            println!("Not running in a terminal; rerun with --yes to repair.");
            Ok(false)
        }
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn reinstall(
    ctx: &Context,
    installer: &Installer<'_>,
    lock: &LockManager<'_>,
    name: &str,
    entry: &LockEntry,
) -> Result<bool> {
    if entry.source_type != LOCAL_SOURCE_TYPE {
        return Ok(false);
    }
    let source = Path::new(&entry.source);
    if !ctx.fs.metadata(source).is_ok_and(|m| m.is_dir()) {
        tracing::debug!(name, source = %entry.source, "source directory is gone");
        return Ok(false);
    }

    let request = local_request(
        &ctx.fs,
        name,
        source,
        entry.cognitive_type,
        entry.category.clone(),
    );
    let options = ctx.install_options();
    let target = InstallTarget::new(FALLBACK_TARGET, ctx.scope, InstallMode::Symlink);
    let result = installer.install(&request, &target, &options);
    if !result.success {
        return Err(install_failed(name, result.error.unwrap_or_default()));
    }

    let canonical = installer.canonical_path_for(&request, ctx.scope, &options)?;
    let refreshed = LockEntry {
        content_hash: directory_hash(&ctx.fs, &canonical)?,
        ..entry.clone()
    };
    lock.add_entry(name, refreshed)?;
    Ok(true)
}

fn print_report(report: &SyncReport) {
    if report.issues.is_empty() {
        println!("{}", Style::new().green().apply_to("Everything in sync."));
        return;
    }
    for issue in &report.issues {
        let mark = if issue.fixed {
            Style::new().green().apply_to("✓")
        } else if issue.error.is_some() {
            Style::new().red().apply_to("✗")
        } else {
            Style::new().yellow().apply_to("•")
        };
        print!(
            "  {mark} {} {} {}",
            Style::new().bold().apply_to(&issue.name),
            Style::new().dim().apply_to(format!("[{}]", issue.kind.as_str())),
            issue.path.display()
        );
        match &issue.error {
            Some(error) => println!(": {error}"),
            None => println!(),
        }
    }
    println!("{} fixed, {} remaining", report.fixed, report.remaining);
}
