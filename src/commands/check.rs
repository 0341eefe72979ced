//! Check command

use console::Style;

use super::context::Context;
use crate::cli::CheckArgs;
use crate::error::Result;
use crate::reconcile::{CheckReport, Severity};

/// Run the check; returns whether every entry is healthy
pub fn run(ctx: &Context, args: &CheckArgs) -> Result<bool> {
    let lock = ctx.lock()?;
    let report = ctx.reconciler(&lock).check();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(report.errors() == 0)
}

fn print_report(report: &CheckReport) {
    for issue in &report.issues {
        let label = match issue.severity {
            Severity::Error => Style::new().red().bold().apply_to("error"),
            Severity::Warning => Style::new().yellow().bold().apply_to("warning"),
        };
        println!(
            "  {label} {} {}: {}",
            Style::new().bold().apply_to(&issue.name),
            Style::new().dim().apply_to(format!("[{}]", issue.kind)),
            issue.message
        );
    }
    let summary = if report.is_healthy() {
        Style::new().green().apply_to(&report.summary)
    } else {
        Style::new().yellow().apply_to(&report.summary)
    };
    println!("{summary}");
}
