use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use crdeploy::config::{ClientOptions, Config, DeployConfig};
use crdeploy::gcp::auth;
use crdeploy::run::Deployer;
use crdeploy::DeployError;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Deploy Cloud Run Services and Jobs from manifests
#[derive(Parser, Debug)]
#[command(name = "crdeploy", version, about, long_about = None)]
struct Args {
    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or replace the resources described by the manifests
    Deploy {
        #[command(flatten)]
        target: TargetArgs,

        /// Name of the configuration the manifests belong to
        #[arg(long, default_value = "default")]
        config_name: String,

        /// Run identifier attached to logs and trackers
        #[arg(long)]
        run_id: Option<String>,
    },
    /// Delete the Service described by a single manifest
    Delete {
        #[command(flatten)]
        target: TargetArgs,

        /// Print the service that would be deleted instead of deleting it
        #[arg(long)]
        dry_run: bool,
    },
    /// Persist default settings
    Config {
        #[arg(long)]
        project: Option<String>,

        #[arg(long)]
        region: Option<String>,

        #[arg(long)]
        endpoint: Option<String>,
    },
}

#[derive(ClapArgs, Debug)]
struct TargetArgs {
    /// Manifest files (YAML or JSON), deployed in order
    #[arg(short = 'f', long = "filename", required = true)]
    manifests: Vec<PathBuf>,

    /// GCP project to deploy into, overriding manifest namespaces
    #[arg(short, long)]
    project: Option<String>,

    /// Cloud Run region
    #[arg(short, long)]
    region: Option<String>,

    /// Cloud Run API endpoint override
    #[arg(long)]
    endpoint: Option<String>,

    /// Access token to use instead of Application Default Credentials
    #[arg(long, env = "CLOUDSDK_AUTH_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {:?}: {}", log_path, e);
            return None;
        },
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("crdeploy started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("crdeploy").join("crdeploy.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".crdeploy").join("crdeploy.log");
    }
    PathBuf::from("crdeploy.log")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    match run(args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<DeployError>() {
                Some(deploy_err) => eprintln!("[{}] {}", deploy_err.code(), deploy_err),
                None => eprintln!("Error: {err:?}"),
            }
            ExitCode::FAILURE
        },
    }
}

async fn run(command: Command) -> Result<()> {
    let config = Config::load();

    match command {
        Command::Deploy {
            target,
            config_name,
            run_id,
        } => {
            let manifests = read_manifests(&target.manifests)?;
            let run_id = run_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let mut deployer = Deployer::new(deploy_config(&config, &target, config_name)?, &run_id);

            let cancel = cancel_on_ctrl_c();
            deployer
                .deploy(&cancel, &mut io::stdout(), &manifests)
                .await?;

            for name in deployer.monitor().resources() {
                tracing::info!("deployed {}", name);
            }
            Ok(())
        },
        Command::Delete { target, dry_run } => {
            let manifests = read_manifests(&target.manifests)?;
            let deployer = Deployer::new(deploy_config(&config, &target, String::new())?, "");

            let cancel = cancel_on_ctrl_c();
            deployer
                .cleanup(&cancel, &mut io::stdout(), dry_run, &manifests)
                .await?;
            Ok(())
        },
        Command::Config {
            project,
            region,
            endpoint,
        } => {
            let mut config = config;
            if project.is_some() {
                config.project_id = project;
            }
            if region.is_some() {
                config.region = region;
            }
            if endpoint.is_some() {
                config.endpoint = endpoint;
            }
            config.save().context("Failed to save configuration")?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        },
    }
}

fn deploy_config(config: &Config, target: &TargetArgs, config_name: String) -> Result<DeployConfig> {
    let project = config.effective_project(target.project.as_deref());
    if !project.is_empty() && !auth::validate_project_id(&project) {
        tracing::warn!("Project override {:?} does not look like a GCP project id", project);
    }

    let region = config
        .effective_region(target.region.as_deref())
        .context("No Cloud Run region configured. Use --region or set CLOUDSDK_RUN_REGION")?;

    tracing::info!(
        "Using project override: {:?}, region: {}",
        project,
        region
    );

    Ok(DeployConfig {
        config_name,
        project,
        region,
        client_options: ClientOptions {
            endpoint: config.effective_endpoint(target.endpoint.as_deref()),
            access_token: target.access_token.clone(),
            ..ClientOptions::default()
        },
    })
}

fn read_manifests(paths: &[PathBuf]) -> Result<Vec<Vec<u8>>> {
    paths
        .iter()
        .map(|path| std::fs::read(path).with_context(|| format!("Failed to read manifest {:?}", path)))
        .collect()
}

/// Token cancelled when the user presses Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling in-flight Cloud Run call");
            trigger.cancel();
        }
    });
    cancel
}
