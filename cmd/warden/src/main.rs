//! Warden CLI - policy authoring and policy-constrained chat simulation.
//!
//! Commands:
//! - `warden init` - Write the sample catalog to disk
//! - `warden list` - Summarize policies and products
//! - `warden show` - Print a policy brief
//! - `warden compile` - Print the system instruction for a policy
//! - `warden suggest` - Generate test prompts for a policy (uses Claude)
//! - `warden register` - Register a product from a requirements document (uses Claude)
//! - `warden console` - Interactive console with the policy simulator (uses Claude)

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use warden_policy::ProductType;

mod commands;

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Author AI assistant policies and test them against Claude")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Catalog snapshot (YAML or JSON); the sample catalog is used when absent
    #[arg(short, long, global = true, env = "WARDEN_CATALOG")]
    catalog: Option<PathBuf>,

    #[command(flatten)]
    service: commands::ServiceArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the sample catalog to <path>/catalog.yaml
    Init {
        /// Target directory
        #[arg(default_value = ".")]
        path: String,
    },

    /// Summarize the catalog
    List,

    /// Print a policy brief
    Show {
        /// Policy id
        policy: String,
    },

    /// Print the system instruction compiled from a policy
    Compile {
        /// Policy id
        policy: String,

        /// Write the instruction to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate test prompts for a policy
    Suggest {
        /// Policy id
        policy: String,
    },

    /// Register a product from a requirements document
    Register {
        /// Product name
        #[arg(short, long)]
        name: String,

        /// Target platform
        #[arg(short = 't', long = "type", value_enum, default_value = "web")]
        product_type: Platform,

        /// Path to the requirements document
        #[arg(short, long)]
        prd: PathBuf,

        /// Write the registered product and its policies as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Interactive console
    Console,
}

impl Commands {
    /// Whether the command talks to the model.
    const fn needs_service(&self) -> bool {
        matches!(
            self,
            Self::Suggest { .. } | Self::Register { .. } | Self::Console
        )
    }
}

/// Product platform as accepted on the command line.
#[derive(Clone, Copy, ValueEnum)]
enum Platform {
    /// Web application
    Web,
    /// Native mobile application
    Mobile,
}

impl From<Platform> for ProductType {
    fn from(platform: Platform) -> Self {
        match platform {
            Platform::Web => Self::WebApplication,
            Platform::Mobile => Self::NativeMobile,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    if cli.command.needs_service() {
        cli.service.validate()?;
    }

    let catalog = cli.catalog.as_deref();
    match cli.command {
        Commands::Init { path } => commands::init::run(&path),
        Commands::List => commands::list::run(catalog),
        Commands::Show { policy } => commands::show::run(catalog, &policy),
        Commands::Compile { policy, output } => {
            commands::compile::run(catalog, &policy, output.as_deref())
        }
        Commands::Suggest { policy } => commands::suggest::run(catalog, &cli.service, &policy).await,
        Commands::Register {
            name,
            product_type,
            prd,
            output,
        } => {
            commands::register::run(
                catalog,
                &cli.service,
                commands::register::Request {
                    name,
                    product_type: product_type.into(),
                    prd_path: prd,
                    output,
                },
            )
            .await
        }
        Commands::Console => commands::console::run(catalog, &cli.service).await,
    }
}
