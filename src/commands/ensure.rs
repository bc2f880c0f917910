//! `ensure`: reconcile one resource described on the command line

use anyhow::{Context as AnyhowContext, Result};
use declarative::{ReconcileOptions, apply_resource};
use serde_json::Value;

use super::{connect, parse_params};
use crate::Context;
use crate::cli::{ConnectionArgs, EnsureArgs, StateArg};
use crate::config;
use crate::resource::ResourceSpec;
use crate::ui;

pub fn run(ctx: &Context, conn: &ConnectionArgs, args: EnsureArgs) -> Result<()> {
    let mut params = parse_params(&args.params)?;
    if let Some(state) = args.state {
        let state = match state {
            StateArg::Present => "present",
            StateArg::Absent => "absent",
        };
        params.insert("state".to_string(), Value::String(state.to_string()));
    }

    let resource = ResourceSpec::from_params(&args.kind, Value::Object(params))?.into_resource();
    let client = connect(conn, config::ambient_connection())?;

    let options = ReconcileOptions { dry_run: args.check };
    let outcome = apply_resource(resource.as_ref(), &client, options)
        .with_context(|| format!("Failed to reconcile {}", resource.id()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if !ctx.quiet {
        ui::print_outcome(&outcome);
    }
    Ok(())
}
