//! `apply` and `diff`: reconcile the resources of a manifest

use anyhow::{Result, bail};
use declarative::{ExecuteOptions, execute};
use std::path::PathBuf;

use super::connect;
use crate::Context;
use crate::cli::{ApplyArgs, ConnectionArgs, DiffArgs};
use crate::config::{self, Manifest};
use crate::progress::{BarProgress, Prompt};
use crate::ui;

/// Everything `apply` and `diff` have in common
struct Run {
    file: Option<PathBuf>,
    target: Option<String>,
    dry_run: bool,
    yes: bool,
    keep_going: bool,
    json: bool,
}

pub fn apply(ctx: &Context, conn: &ConnectionArgs, args: ApplyArgs) -> Result<()> {
    run(
        ctx,
        conn,
        Run {
            file: args.file,
            target: args.target,
            dry_run: args.dry_run,
            yes: args.yes,
            keep_going: args.keep_going,
            json: args.json,
        },
    )
}

/// Dry-run every resource, continuing past failures
pub fn diff(ctx: &Context, conn: &ConnectionArgs, args: DiffArgs) -> Result<()> {
    run(
        ctx,
        conn,
        Run {
            file: args.file,
            target: args.target,
            dry_run: true,
            yes: true,
            keep_going: true,
            json: args.json,
        },
    )
}

fn run(ctx: &Context, conn: &ConnectionArgs, run: Run) -> Result<()> {
    let path = config::find_manifest(run.file.as_deref())?;
    let manifest = Manifest::load(&path)?;
    let plan = manifest.plan().filter_by_target(run.target.as_deref());
    let chatty = !ctx.quiet && !run.json;

    if chatty && ctx.verbose > 0 {
        ui::kv("Manifest", &path.display().to_string());
    }

    if plan.is_empty() {
        if run.json {
            println!("{}", serde_json::to_string_pretty(&declarative::ExecuteReport::default())?);
        } else if !ctx.quiet {
            ui::info("No resources to reconcile");
        }
        return Ok(());
    }

    let client = connect(conn, manifest.connection.clone())?;
    if chatty && ctx.verbose > 0 {
        ui::kv("Jira", client.base_url());
        ui::kv("Resources", &plan.total_resources().to_string());
    }

    let opts = ExecuteOptions {
        dry_run: run.dry_run,
        keep_going: run.keep_going,
    };
    let mut progress = BarProgress::new(!chatty, !run.dry_run);
    let mut prompt = Prompt { assume_yes: run.yes };

    let report = execute(&plan, &client, opts, &mut progress, &mut prompt)?;

    if run.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !ctx.quiet {
        ui::print_report(&report, run.dry_run);
    }

    if !report.is_success() {
        bail!("{} of {} resources failed", report.summary.failed, plan.total_resources());
    }
    Ok(())
}
