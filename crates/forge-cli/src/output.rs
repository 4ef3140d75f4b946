//! Terminal output formatting.

use std::path::Path;

use colored::Colorize;
use forge_codegen::GeneratedFile;
use forge_core::{StopReport, ValidatedRequirement};

/// Print the identity of a validated requirement.
pub fn print_requirement(spec: &ValidatedRequirement) {
    println!("{} {}", spec.name.cyan().bold(), format!("({})", spec.display_name).dimmed());
    println!("{}", spec.description);

    if spec.has_mcp_servers() {
        println!();
        println!("{}", "MCP servers".bold());
        for server in &spec.mcp_servers {
            println!("  {} {}", server.name, server.url.dimmed());
        }
    }

    if spec.has_plugins() {
        println!();
        println!("{}: {}", "Plugins".bold(), spec.plugins.join(", "));
    }
}

/// Print one generated file with a header rule.
pub fn print_file(file: &GeneratedFile, dir: Option<&Path>) {
    let shown = match dir {
        Some(dir) => dir.join(&file.name).display().to_string(),
        None => file.name.clone(),
    };
    println!("{} {}", "→".dimmed(), shown.bold());
    println!("{}", "─".repeat(40));
    println!("{}", file.content);
}

/// Summarize a shutdown.
pub fn print_stop_report(report: &StopReport) {
    if report.is_clean() {
        println!(
            "{} Stopped {} service(s)",
            "✓".green().bold(),
            report.stopped.len()
        );
        return;
    }

    println!(
        "{} Stopped {} service(s) with {} failure(s):",
        "!".yellow().bold(),
        report.stopped.len(),
        report.failures.len()
    );
    for failure in &report.failures {
        println!("  {} {}", failure.service.red(), failure.error);
    }
}
