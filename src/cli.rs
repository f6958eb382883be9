//! Command-line interface definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::engine::TargetState;

#[derive(Parser)]
#[command(name = "sempctl")]
#[command(version)]
#[command(about = "Declarative configuration management for SEMP v2 message brokers", long_about = None)]
pub struct Cli {
    /// Verbosity level (repeat for request/response dumps)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Broker connection flags, shared by every subcommand.
#[derive(Args)]
pub struct ConnectionArgs {
    /// Hostname of the broker management endpoint
    #[arg(long, global = true, default_value = "localhost")]
    pub host: String,

    /// Management port
    #[arg(long, global = true, default_value_t = 8080)]
    pub port: u16,

    /// Use https instead of http
    #[arg(long, global = true)]
    pub secure: bool,

    /// Administrator username
    #[arg(long, global = true, default_value = "admin")]
    pub username: String,

    /// Administrator password
    #[arg(long, global = true, env = "SEMPCTL_PASSWORD", default_value = "admin")]
    pub password: String,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 1.0, value_parser = parse_timeout)]
    pub timeout: f64,

    /// x-broker-name header value, for proxied management access
    #[arg(long, global = true, default_value = "")]
    pub x_broker: String,
}

fn parse_timeout(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number of seconds"))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("timeout must be a positive number of seconds, got '{s}'"));
    }
    Ok(value)
}

#[derive(Subcommand)]
pub enum Command {
    /// Reconcile one resource instance to a target state
    Ensure(EnsureArgs),

    /// List a resource collection in a single bulk request
    List(ListArgs),

    /// Show the registered resource types
    Resources,
}

#[derive(Args)]
pub struct EnsureArgs {
    /// Resource type (see `sempctl resources`)
    pub resource: String,

    /// Natural-key value of the target instance
    #[arg(long)]
    pub name: String,

    /// Identity parameter, repeatable: --param msg_vpn=default
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Desired settings as a JSON object
    #[arg(long, conflicts_with = "settings_file")]
    pub settings: Option<String>,

    /// Read desired settings from a JSON file
    #[arg(long, value_name = "PATH")]
    pub settings_file: Option<PathBuf>,

    /// Target state
    #[arg(long, default_value = "present")]
    pub state: TargetState,

    /// Compute the decision but skip every mutating request
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Resource type (see `sempctl resources`)
    pub resource: String,

    /// Identity parameter, repeatable: --param msg_vpn=default
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Query parameter passed to the broker, repeatable:
    /// --query select=queueName --query where=accessType==exclusive
    #[arg(long = "query", value_name = "KEY=VALUE")]
    pub query: Vec<String>,
}
