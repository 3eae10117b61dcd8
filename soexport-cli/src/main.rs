use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use soexport::ObjectRef;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "soexport")]
#[command(about = "soexport - dependency-ordered saved object exports")]
#[command(version)]
struct Cli {
    /// Configuration file path (default: ~/.soexport/config.toml)
    #[arg(short, long, global = true, env = "SOEXPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Log format (overrides the config file)
    #[arg(long, global = true, env = "LOG_FORMAT", value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn as_str(self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// Where saved objects are read from. Overrides the `[store]` config section.
#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// NDJSON file to use as the store
    #[arg(long, conflicts_with = "url")]
    pub store_file: Option<PathBuf>,

    /// Dashboards base URL to use as the store
    #[arg(long, env = "SOEXPORT_URL")]
    pub url: Option<String>,

    /// Basic auth user for the remote store
    #[arg(long, env = "SOEXPORT_USERNAME")]
    pub username: Option<String>,

    /// Basic auth password for the remote store
    #[arg(long, env = "SOEXPORT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Security tenant to export from
    #[arg(long)]
    pub tenant: Option<String>,

    /// Sign remote requests with AWS SigV4 for this region
    #[arg(long, conflicts_with = "username")]
    pub aws_region: Option<String>,

    /// SigV4 service name (default: es)
    #[arg(long, requires = "aws_region")]
    pub aws_service: Option<String>,

    /// SigV4 access key
    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub aws_access_key_id: Option<String>,

    /// SigV4 secret key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub aws_secret_access_key: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export saved objects as NDJSON
    Export {
        #[command(flatten)]
        store: StoreArgs,

        /// Object types to export (repeatable)
        #[arg(short = 't', long = "type")]
        types: Vec<String>,

        /// Export every type the store allows
        #[arg(long, conflicts_with = "types")]
        all_types: bool,

        /// Search filter for type exports
        #[arg(short, long)]
        search: Option<String>,

        /// Namespace to export from
        #[arg(short, long)]
        namespace: Option<String>,

        /// Object to export as TYPE:ID (repeatable)
        #[arg(long = "object")]
        objects: Vec<ObjectRef>,

        /// Also export everything the objects reference
        #[arg(long)]
        include_references_deep: bool,

        /// Workspaces for object exports (repeatable)
        #[arg(long = "workspace")]
        workspaces: Vec<String>,

        /// Omit the trailing summary line
        #[arg(long)]
        exclude_export_details: bool,

        /// Maximum number of objects to export
        #[arg(long)]
        size_limit: Option<usize>,

        /// Identities per bulk get request (0 = unchunked)
        #[arg(long)]
        batch_size: Option<usize>,

        /// JSON export request body to start from
        #[arg(long)]
        request: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List security tenants of a remote store
    Tenants {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// List exportable object types
    Types {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Print the effective configuration as TOML
    Config {
        #[command(flatten)]
        store: StoreArgs,
    },
}

fn init_logging(format: &str, level: &str) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string()),
    );
    let json = format == "json";

    // stdout carries export data, so logs go to stderr.
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(soexport::config::default_config_path);
    let mut config = soexport::Config::load_or_default(&config_path)?;
    if let Some(format) = cli.log_format {
        config.observability.log_format = format.as_str().to_string();
    }
    init_logging(
        &config.observability.log_format,
        &config.observability.log_level,
    );
    tracing::debug!("Using config {}", config_path.display());

    match cli.command {
        Commands::Export {
            store,
            types,
            all_types,
            search,
            namespace,
            objects,
            include_references_deep,
            workspaces,
            exclude_export_details,
            size_limit,
            batch_size,
            request,
            output,
        } => {
            commands::apply_store_args(&mut config.store, &store)?;
            if let Some(batch) = batch_size {
                config.export.batch_size = batch;
            }
            let args = commands::export::ExportArgs {
                types,
                all_types,
                search,
                namespace,
                objects,
                include_references_deep,
                workspaces,
                exclude_export_details,
                size_limit,
                request,
                output,
            };
            commands::run_export(&config, args).await?;
        }
        Commands::Tenants { store } => {
            commands::apply_store_args(&mut config.store, &store)?;
            commands::run_tenants(&config).await?;
        }
        Commands::Types { store } => {
            commands::apply_store_args(&mut config.store, &store)?;
            commands::run_types(&config).await?;
        }
        Commands::Config { store } => {
            commands::apply_store_args(&mut config.store, &store)?;
            commands::run_config(&config)?;
        }
    }

    Ok(())
}
