use anyhow::{Context, Result, bail};
use clap::Parser;
use serde_json::{Map, Value, json};
use std::fs;

use sempctl::cli::{Cli, Command, ConnectionArgs, EnsureArgs, ListArgs};
use sempctl::client::SempClient;
use sempctl::config::{BrokerConfig, parse_key_values};
use sempctl::engine::{EnsureRequest, reconcile};
use sempctl::resource::{GenericAdapter, registry};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Request/response dumps appear at -vv.
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let client = SempClient::new(&broker_config(&cli.connection));

    match cli.command {
        Command::Ensure(args) => ensure(&client, &args),
        Command::List(args) => list(&client, &args),
        Command::Resources => {
            resources();
            Ok(())
        }
    }
}

fn broker_config(conn: &ConnectionArgs) -> BrokerConfig {
    BrokerConfig::new(
        &conn.host,
        conn.port,
        conn.secure,
        &conn.username,
        &conn.password,
        conn.timeout,
        &conn.x_broker,
    )
}

fn ensure(client: &SempClient, args: &EnsureArgs) -> Result<()> {
    let spec = registry::find(&args.resource)
        .ok_or_else(|| sempctl::Error::UnknownResource(args.resource.clone()))?;
    let identity = parse_key_values(&args.params)?;
    let settings = load_settings(args)?;

    let adapter = GenericAdapter::new(spec);
    let result = reconcile(
        client,
        &adapter,
        &EnsureRequest {
            lookup: &args.name,
            identity: &identity,
            settings,
            state: args.state,
            dry_run: args.dry_run,
        },
    )?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn list(client: &SempClient, args: &ListArgs) -> Result<()> {
    let spec = registry::find(&args.resource)
        .ok_or_else(|| sempctl::Error::UnknownResource(args.resource.clone()))?;
    let identity = parse_key_values(&args.params)?;
    let query = parse_key_values(&args.query)?;

    let segments = spec.collection_path(&identity)?;
    let items = client.get_list(&segments, &query)?;

    let output = json!({
        "result_list_count": items.len(),
        "result_list": items,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn resources() {
    for spec in registry::SPECS {
        let params = if spec.identity_params.is_empty() {
            String::from("-")
        } else {
            spec.identity_params.join(", ")
        };
        println!("{:<24} key={:<24} params: {params}", spec.name, spec.natural_key);
    }
}

/// Load desired settings from `--settings` or `--settings-file`.
fn load_settings(args: &EnsureArgs) -> Result<Option<Map<String, Value>>> {
    let raw = match (&args.settings, &args.settings_file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?,
        (None, None) => return Ok(None),
    };
    let value: Value = serde_json::from_str(&raw).context("parsing settings as JSON")?;
    match value {
        Value::Object(map) => Ok(Some(map)),
        other => bail!("settings must be a JSON object, got {other}"),
    }
}
