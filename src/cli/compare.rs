//! Compare command - report divergences against conflicting copies.

use crate::cli::output;
use crate::cli::resolve::{self, CliContext};
use crate::core::conflict::{self, ComparisonReport, Outcome};
use crate::core::crypto::CompositeSecret;
use crate::error::Result;

const COL_WIDTH: usize = 28;

/// Compare the database against every sibling copy sharing its file stem.
pub fn execute(ctx: &CliContext) -> Result<()> {
    let (session, config) = resolve::open_with_config(ctx)?;

    output::dimmed("looking for conflicting files...");
    let copies = conflict::discover_copies(session.path())?;
    if copies.is_empty() {
        output::success(&format!(
            "no conflicting files for {}",
            session.path().display()
        ));
        return Ok(());
    }

    let secret = CompositeSecret::new(&config.password, config.keyfile.as_deref())?;
    let outcomes = conflict::compare_all(session.store(), session.path(), &secret)?;

    for (name, outcome) in outcomes {
        output::section(&format!("Comparing {}", name));
        match outcome {
            Outcome::Inaccessible => {
                output::warn("could not open this copy (different credentials or corrupted)");
            }
            Outcome::Compared(report) if report.is_clean() => {
                output::success("no differences");
            }
            Outcome::Compared(report) => print_report(&report),
        }
    }
    Ok(())
}

fn print_report(report: &ComparisonReport) {
    println!(
        "  {:<w$} {:<w$} {}",
        "Main",
        "Comparison",
        "Conflicting fields",
        w = COL_WIDTH
    );

    for locator in report.missing_in_comparison() {
        println!("  {:<w$} {:<w$}", locator, "-", w = COL_WIDTH);
    }
    for locator in report.missing_in_main() {
        println!("  {:<w$} {:<w$}", "-", locator, w = COL_WIDTH);
    }
    for (locator, fields) in report.conflicts() {
        let fields = fields.iter().copied().collect::<Vec<_>>().join(",");
        println!("  {:<w$} {:<w$} {}", locator, locator, fields, w = COL_WIDTH);
    }
}
