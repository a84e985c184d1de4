use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use catena_chain::{ChainExecutor, ChainSpec, builtin_registry};
use catena_config::CatenaConfig;
use catena_task::{ExecutionContext, Payload};

/// Catena - run chains of named tasks, each step feeding the next
#[derive(Parser)]
#[command(name = "catena")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the settings file (default: ~/.catena/config.json)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a chain against the JSON payload read from stdin
  Run {
    /// Path to the chain file (JSON)
    chain_file: PathBuf,

    /// Identifier of the job the chain belongs to
    #[arg(long, default_value = "cli")]
    watch_id: String,
  },

  /// Parse a chain and print its canonical form
  Check {
    /// Path to the chain file (JSON)
    chain_file: PathBuf,
  },

  /// List the registered task types
  Types,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let config = load_config(cli.config)?;
  init_logging(&config);

  match cli.command {
    Some(Commands::Run {
      chain_file,
      watch_id,
    }) => {
      let succeeded = run_chain(&config, chain_file, watch_id)?;
      if !succeeded {
        std::process::exit(1);
      }
    }
    Some(Commands::Check { chain_file }) => {
      check_chain(&config, chain_file)?;
    }
    Some(Commands::Types) => {
      for type_name in builtin_registry(&config).type_names() {
        println!("{}", type_name);
      }
    }
    None => {
      println!("catena - use --help to see available commands");
    }
  }

  Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<CatenaConfig> {
  match path {
    Some(path) => CatenaConfig::load(&path)
      .with_context(|| format!("failed to load config file: {}", path.display())),
    None => match dirs::home_dir() {
      Some(home) => {
        let path = home.join(".catena").join("config.json");
        CatenaConfig::load_or_default(&path)
          .with_context(|| format!("failed to load config file: {}", path.display()))
      }
      None => Ok(CatenaConfig::default()),
    },
  }
}

/// Log to stderr; `RUST_LOG` overrides the configured filter.
fn init_logging(config: &CatenaConfig) {
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.filter));
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .try_init();
}

/// Returns whether the chain succeeded.
fn run_chain(config: &CatenaConfig, chain_file: PathBuf, watch_id: String) -> Result<bool> {
  let registry = builtin_registry(config);
  let spec = ChainSpec::from_file(&registry, &chain_file)
    .with_context(|| format!("failed to parse chain file: {}", chain_file.display()))?;

  info!(steps = spec.len(), "loaded chain");

  let payload = read_payload_from_stdin()?;
  let ctx = ExecutionContext::new(watch_id);
  let result = ChainExecutor::new(&spec).execute(&ctx, &payload);

  println!("{}", serde_json::to_string_pretty(&result)?);

  Ok(result.is_success())
}

fn check_chain(config: &CatenaConfig, chain_file: PathBuf) -> Result<()> {
  let registry = builtin_registry(config);
  let spec = ChainSpec::from_file(&registry, &chain_file)
    .with_context(|| format!("failed to parse chain file: {}", chain_file.display()))?;

  println!("{}", spec.to_json_string());

  Ok(())
}

fn read_payload_from_stdin() -> Result<Payload> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    // No stdin pipe, use an empty payload
    return Ok(Payload::new());
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read payload from stdin")?;

  if input.trim().is_empty() {
    return Ok(Payload::new());
  }

  let value: serde_json::Value =
    serde_json::from_str(&input).context("failed to parse payload JSON from stdin")?;
  Payload::try_from(value).map_err(|other| {
    anyhow::anyhow!(
      "payload from stdin must be a JSON object, found {}",
      catena_task::describe_json(&other)
    )
  })
}
