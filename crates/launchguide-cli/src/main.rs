mod config;
mod generate_cmd;
mod plan_cmds;
mod serve_cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use launchguide_core::catalog::{SelectionPolicy, load_catalog};

use config::LaunchguideConfig;

#[derive(Parser)]
#[command(
    name = "launchguide",
    about = "Step-by-step marketing plans for early-stage founders"
)]
struct Cli {
    /// Directory holding the stored plan (overrides LAUNCHGUIDE_STORE_DIR)
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a launchguide config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
        /// Model provider: openai or offline
        #[arg(long, default_value = config::OPENAI_PROVIDER)]
        provider: String,
        /// Base URL of an OpenAI-compatible API
        #[arg(long)]
        base_url: Option<String>,
        /// Model identifier
        #[arg(long)]
        model: Option<String>,
        /// API key (stored in the config file, mode 0600)
        #[arg(long)]
        api_key: Option<String>,
    },
    /// List the marketing channel catalog
    Channels,
    /// Generate a marketing plan from an onboarding record
    Generate {
        /// Onboarding record (.toml or .json)
        #[arg(long)]
        record: PathBuf,
        /// Channel to plan for, in priority order (repeatable)
        #[arg(long = "channel", required = true)]
        channels: Vec<String>,
        /// Selection rule: three_to_five or at_least_one
        #[arg(long)]
        policy: Option<SelectionPolicy>,
        /// Use the offline provider regardless of configuration
        #[arg(long)]
        offline: bool,
    },
    /// Stored plan management
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Serve the onboarding form and plan checklist over HTTP
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 3000)]
        port: u16,
        /// Use the offline provider regardless of configuration
        #[arg(long)]
        offline: bool,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Show the stored plan as a checklist
    Show,
    /// Remove the stored plan
    Clear,
}

/// Execute the `launchguide init` command: write config file.
fn cmd_init(
    force: bool,
    provider: &str,
    base_url: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }
    if provider != config::OPENAI_PROVIDER && provider != config::OFFLINE_PROVIDER {
        anyhow::bail!(
            "unknown provider {provider:?} (expected {} or {})",
            config::OPENAI_PROVIDER,
            config::OFFLINE_PROVIDER
        );
    }

    let mut cfg = config::ConfigFile::default();
    cfg.provider.name = provider.to_string();
    if let Some(url) = base_url {
        cfg.provider.base_url = url;
    }
    if let Some(model) = model {
        cfg.provider.model = model;
    }
    cfg.provider.api_key = api_key;

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  provider.name = {}", cfg.provider.name);
    println!("  provider.base_url = {}", cfg.provider.base_url);
    println!("  provider.model = {}", cfg.provider.model);
    match &cfg.provider.api_key {
        Some(key) => {
            let prefix: String = key.chars().take(4).collect();
            println!("  provider.api_key = {prefix}...");
        }
        None => println!(
            "  provider.api_key = (unset; set {} or plans use the offline provider)",
            config::ENV_API_KEY
        ),
    }

    Ok(())
}

/// Execute the `launchguide channels` command.
fn cmd_channels() {
    let catalog = load_catalog();
    let width = catalog.iter().map(|c| c.name.len()).max().unwrap_or(0);
    for channel in catalog {
        println!("{:<width$}  {}", channel.name, channel.description);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            force,
            provider,
            base_url,
            model,
            api_key,
        } => {
            cmd_init(force, &provider, base_url, model, api_key)?;
        }
        Commands::Channels => cmd_channels(),
        Commands::Generate {
            record,
            channels,
            policy,
            offline,
        } => {
            let resolved = LaunchguideConfig::resolve(cli.store_dir)?;
            let options = generate_cmd::GenerateOptions {
                record,
                channels,
                policy: policy.unwrap_or(resolved.policy),
                offline,
            };
            generate_cmd::run_generate(&resolved, options).await?;
        }
        Commands::Plan { command } => {
            let resolved = LaunchguideConfig::resolve(cli.store_dir)?;
            let store = resolved.open_store()?;
            plan_cmds::run_plan_command(command, &store)?;
        }
        Commands::Serve {
            bind,
            port,
            offline,
        } => {
            let resolved = LaunchguideConfig::resolve(cli.store_dir)?;
            let state = serve_cmd::AppState::new(
                resolved.build_aggregator(offline)?,
                std::sync::Arc::new(resolved.open_store()?),
                resolved.policy,
            )?;
            serve_cmd::run_serve(state, &bind, port).await?;
        }
    }

    Ok(())
}
