use colored::{ColoredString, Colorize};
use declarative::{Action, ExecuteReport, Outcome};
use serde_json::Value;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

// ============================================================================
// Outcomes
// ============================================================================

/// Diff-style marker for an action
pub fn action_symbol(action: Action) -> ColoredString {
    match action {
        Action::Created => "+".green(),
        Action::Updated => "~".yellow(),
        Action::Deleted => "-".red(),
        Action::None => "○".dimmed(),
    }
}

/// Render a JSON value for display: bare strings, `(none)` for null
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "(none)".to_string(),
        Value::String(s) if s.is_empty() => "\"\"".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => format!("[{}]", items.iter().map(format_value).collect::<Vec<_>>().join(", ")),
        other => other.to_string(),
    }
}

/// Print one outcome and its field changes
pub fn print_outcome(outcome: &Outcome) {
    let verb = if outcome.dry_run && outcome.action.is_change() {
        format!("would be {}", outcome.action)
    } else {
        outcome.action.to_string()
    };

    println!(
        "  {} {} {}",
        action_symbol(outcome.action),
        outcome.id(),
        format!("({verb})").dimmed()
    );

    for change in &outcome.changes {
        println!(
            "      {}: {} → {}",
            change.param,
            format_value(&change.from).red(),
            format_value(&change.to).green()
        );
    }
}

/// Print a resource that can only be checked once earlier changes are applied
pub fn print_deferred(id: &str) {
    println!("  {} {} {}", "?".cyan(), id, "(depends on earlier changes)".dimmed());
}

/// Print the result of a whole run
pub fn print_report(report: &ExecuteReport, dry_run: bool) {
    let summary = &report.summary;

    header("Resources");
    for outcome in &report.outcomes {
        print_outcome(outcome);
    }
    for id in &report.deferred {
        print_deferred(id);
    }
    for failure in &report.failures {
        println!("  {} {}.{}", "✗".red(), failure.kind, failure.name);
        println!("      {}", failure.error.red());
    }

    println!();
    if report.declined {
        warn("Aborted, no changes made");
    } else if dry_run {
        info(&format!("Dry run - {} change(s) pending", summary.total_changes()));
    } else if report.is_success() {
        success("Jira configuration applied");
    } else {
        warn("Jira configuration applied with errors");
    }

    if summary.created > 0 {
        println!("    • {} created", summary.created);
    }
    if summary.updated > 0 {
        println!("    • {} updated", summary.updated);
    }
    if summary.deleted > 0 {
        println!("    • {} deleted", summary.deleted);
    }
    if summary.unchanged > 0 {
        println!("    • {} unchanged", summary.unchanged);
    }
    if summary.skipped > 0 {
        println!("    • {} skipped", summary.skipped);
    }
    if summary.failed > 0 {
        println!("    • {} {}", summary.failed, "failed".red());
    }
}
