//! ScyllaDB probe
//!
//! Opens a session the same way services do (from a config file or `SCYLLA_*`
//! environment variables) and reports whether the cluster answers.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, FromEnv};
use eyre::{Result, WrapErr};
use scylladbh::{
    Configuration, DockerInspect, check_health_detailed, get_cluster_info, new_docker_session,
    new_session, resolve_configuration,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "scylla-probe")]
#[command(about = "Open a ScyllaDB session from configuration and report cluster health")]
struct Cli {
    /// Configuration file (.toml or .json). Defaults to SCYLLA_* environment variables.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Treat nodes as container names and connect to their IP addresses
    #[arg(short, long, global = true)]
    docker: bool,

    /// `docker inspect` template path holding the container IP (used by --docker and resolve)
    #[arg(long, global = true)]
    inspect_path: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect and print health and cluster information
    Check,

    /// Print the effective configuration (password redacted)
    PrintConfig {
        #[arg(short, long, value_enum, default_value_t = Format::Toml)]
        format: Format,
    },

    /// Resolve container names to IP addresses without connecting
    Resolve,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Toml,
    Json,
}

fn load_configuration(path: Option<&PathBuf>) -> Result<Configuration> {
    match path {
        Some(path) => Configuration::from_file(path)
            .wrap_err_with(|| format!("Failed to load {}", path.display())),
        None => Configuration::from_env().wrap_err("Failed to load configuration from environment"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let environment = Environment::from_env();
    init_tracing(&environment);

    let cli = Cli::parse();
    let config = load_configuration(cli.config.as_ref())?;

    match cli.command {
        Commands::Check => {
            let session = if cli.docker {
                new_docker_session(&config, cli.inspect_path.as_deref()).await?
            } else {
                new_session(&config).await?
            };

            let health = check_health_detailed(&session).await;
            let cluster = get_cluster_info(&session).await?;

            info!(healthy = health.healthy, "Health check finished");

            let report = serde_json::json!({
                "healthy": health.healthy,
                "message": health.message,
                "responseTimeMs": health.response_time_ms,
                "version": health.version,
                "clusterName": cluster.cluster_name,
                "datacenter": cluster.datacenter,
                "rack": cluster.rack,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);

            if !health.healthy {
                eyre::bail!("cluster is unhealthy");
            }
        }

        Commands::PrintConfig { format } => {
            let mut redacted = config;
            if !redacted.password.is_empty() {
                redacted.password = "***".to_string();
            }

            let rendered = match format {
                Format::Toml => toml::to_string_pretty(&redacted)?,
                Format::Json => serde_json::to_string_pretty(&redacted)?,
            };
            println!("{}", rendered);
        }

        Commands::Resolve => {
            let resolver = DockerInspect::new(cli.inspect_path.as_deref());
            let resolved = resolve_configuration(&config, &resolver).await?;

            let containers = config.nodes.iter().filter(|n| !n.trim().is_empty());
            for (container, ip) in containers.zip(resolved.nodes.iter()) {
                println!("{}\t{}", container, ip);
            }
        }
    }

    Ok(())
}
