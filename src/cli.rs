use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use crate::config::{ConfigPatch, GateConfig, ENV_LEVEL};
use crate::gate::DebugGate;
use crate::level::Severity;
use crate::logging;
use crate::sink::{StdFormat, StdSink};

#[derive(Debug, Parser)]
#[command(author, version, about = "Runtime-switchable console debug logging")]
pub struct Cli {
    /// Write one JSON object per line instead of plain text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or_default()
    }

    pub fn format(&self) -> StdFormat {
        if self.json {
            StdFormat::Json
        } else {
            StdFormat::Text
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the usage banner
    Banner,
    /// Print the configuration resolved from the environment as JSON
    Status,
    /// Send one message through the gate
    Emit(EmitArgs),
}

impl Default for Command {
    fn default() -> Self {
        Command::Banner
    }
}

#[derive(Debug, Args, Clone)]
pub struct EmitArgs {
    /// Severity name (debug, info, warn, error); anything else counts as info
    pub level: String,

    /// Message parts; each is parsed as JSON when possible
    pub parts: Vec<String>,

    /// Tag the message with a module name
    #[arg(short, long)]
    pub module: Option<String>,

    /// Force the gate on regardless of the environment
    #[arg(short, long)]
    pub enable: bool,

    /// Minimum severity to print
    #[arg(short, long)]
    pub threshold: Option<String>,

    /// Omit the [time] prefix
    #[arg(long)]
    pub no_timestamp: bool,

    /// Omit the [module] prefix
    #[arg(long)]
    pub no_module: bool,
}

impl EmitArgs {
    fn patch(&self) -> ConfigPatch {
        ConfigPatch {
            enabled: self.enable.then_some(true),
            level: self.threshold.as_deref().and_then(Severity::from_name),
            show_timestamp: self.no_timestamp.then_some(false),
            show_module: self.no_module.then_some(false),
        }
    }

    /// A `--threshold` value that is not a severity name.
    fn rejected_threshold(&self) -> Option<&str> {
        self.threshold
            .as_deref()
            .filter(|name| Severity::from_name(name).is_none())
    }

    fn values(&self) -> Vec<Value> {
        self.parts.iter().map(|raw| parse_part(raw)).collect()
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let mut config = GateConfig::from_env().with_context(|| {
        format!("failed to read gate configuration (checked {ENV_LEVEL} and related variables)")
    })?;
    let command = cli.command();
    if let Command::Emit(args) = &command {
        config.apply(&args.patch());
    }

    let gate = DebugGate::new(config, StdSink::new(cli.format()));
    logging::install(&gate);

    match command {
        Command::Banner => gate.print_banner(),
        Command::Status => {
            let status = serde_json::to_string_pretty(&gate.status())
                .context("failed to serialise gate status")?;
            println!("{status}");
        }
        Command::Emit(args) => {
            if let Some(name) = args.rejected_threshold() {
                // Reports the bad name on the warn sink and keeps the level.
                gate.set_level(name);
            }
            gate.emit(&args.level, args.module.as_deref(), &args.values());
        }
    }
    Ok(())
}

fn parse_part(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::from(raw))
}
