use std::io;
use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use paradox_cli::commands::{run_init, run_list, run_subscribers, run_validate};
use paradox_cli::server::config::StorageBackend;
use paradox_cli::{run_serve, ServeArgs};
use paradox_lib::ItemKind;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "paradox")]
#[command(version)]
#[command(about = "Content catalog and mailing list for the Paradox showcase", long_about = None)]
struct Args {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the default dataset (three seed items, admin/paradox)
    Init {
        /// Path to the data file
        #[arg(short = 'd', long = "data", default_value = "data.json")]
        data: String,

        /// Overwrite an existing data file
        #[arg(long = "force")]
        force: bool,
    },
    /// Print the items in a data file
    List {
        /// Path to the data file
        #[arg(short = 'd', long = "data", default_value = "data.json")]
        data: String,

        /// Include inactive items
        #[arg(short = 'a', long = "all")]
        all: bool,

        /// Only items of this type (art, article, product)
        #[arg(short = 't', long = "type")]
        kind: Option<ItemKind>,
    },
    /// Print the mailing list
    Subscribers {
        /// Path to the data file
        #[arg(short = 'd', long = "data", default_value = "data.json")]
        data: String,
    },
    /// Check that a data file parses, without resetting it
    Validate {
        /// Path to the data file
        #[arg(short = 'd', long = "data", default_value = "data.json")]
        data: String,
    },
    /// Run the HTTP API
    Serve {
        /// Path to the data file (file storage)
        #[arg(short = 'd', long = "data")]
        data: Option<String>,

        /// Port to listen on
        #[arg(short = 'p', long = "port")]
        port: Option<u16>,

        /// Address to bind
        #[arg(long = "hostname")]
        hostname: Option<String>,

        /// Storage backend: file, sled or memory
        #[arg(short = 's', long = "storage")]
        storage: Option<StorageBackend>,

        /// Path to config file
        #[arg(short = 'c', long = "config", env = "PARADOX_CONFIG", default_value = "paradox.toml")]
        config: String,

        /// Enable verbose debug logging
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Args::parse();
    let mut out = io::stdout();
    let result = match cli.cmd {
        Command::Init { data, force } => run_init(Path::new(&data), force, &mut out).await,
        Command::List { data, all, kind } => run_list(Path::new(&data), all, kind, &mut out).await,
        Command::Subscribers { data } => run_subscribers(Path::new(&data), &mut out).await,
        Command::Validate { data } => run_validate(Path::new(&data), &mut out).await,
        Command::Serve {
            data,
            port,
            hostname,
            storage,
            config,
            verbose,
        } => {
            init_logging(verbose);
            let args = ServeArgs {
                config_path: config,
                data_file: data,
                port,
                hostname,
                storage,
            };
            run_serve(args).await
        }
    };

    if let Err(e) = result {
        eprintln!("{:#}", e);
        process::exit(1);
    }
}
