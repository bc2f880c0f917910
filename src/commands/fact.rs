//! `fact`: read-only lookups

use anyhow::{Context as AnyhowContext, Result};
use jirakit::{Fact, Fetched};
use serde_json::Value;

use super::{connect, parse_params};
use crate::Context;
use crate::cli::{ConnectionArgs, FactArgs};
use crate::config;
use crate::ui;

pub fn run(ctx: &Context, conn: &ConnectionArgs, args: FactArgs) -> Result<()> {
    let fact = build(&args.fact, &args.params)?;
    let client = connect(conn, config::ambient_connection())?;

    let value = match fact.gather(&client)? {
        Fetched::Found(value) => value,
        Fetched::Absent => {
            if !ctx.quiet && !args.json {
                ui::warn(&format!("{} found nothing", fact.name()));
            }
            Value::Null
        }
    };

    if args.json {
        println!("{}", serde_json::to_string(&value)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}

/// Parse a fact from its name and `name=value` parameters.
fn build(name: &str, pairs: &[String]) -> Result<Fact> {
    let mut params = parse_params(pairs)?;
    params.insert("fact".to_string(), Value::String(name.to_string()));
    serde_json::from_value(Value::Object(params)).with_context(|| format!("Invalid fact '{name}'"))
}
