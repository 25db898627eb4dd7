//! cbind CLI — generate Python `ctypes` bindings from C declaration modules.

mod commands;
mod config;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::{CbindConfig, Overrides};

#[derive(Parser)]
#[command(name = "cbind", version, about = "Binding generator for C declaration modules")]
struct Cli {
    /// Log pipeline progress at debug level
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the bindings and loader modules for a module
    Generate {
        /// Module JSON produced by the C front end
        module: PathBuf,
        /// Loader class name
        #[arg(long)]
        name: Option<String>,
        /// Shared library name without platform suffix
        #[arg(long)]
        binary: Option<String>,
        /// Output directory (default: [output] dir in cbind.toml, else the current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the emission order of a module's elements
    Order {
        /// Module JSON produced by the C front end
        module: PathBuf,
    },
    /// Print the module with unreachable declarations removed
    Prune {
        /// Module JSON produced by the C front end
        module: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("cbind=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cbind=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let (config, config_dir) = load_config_optional(&cwd)?;

    match cli.command {
        Commands::Generate {
            module,
            name,
            binary,
            out,
        } => {
            let out_dir = out
                .or_else(|| config_dir.as_deref().and_then(|dir| config.output_dir(dir)))
                .unwrap_or(cwd);
            let overrides = Overrides {
                name,
                binary_name: binary,
            };
            let files = commands::generate::run(&module, &config, &overrides, &out_dir)?;
            println!("{}", files.bindings.display());
            println!("{}", files.loader.display());
            Ok(())
        }
        Commands::Order { module } => commands::order::run(&module, &config),
        Commands::Prune { module } => commands::prune::run(&module, &config),
    }
}

fn load_config_optional(cwd: &Path) -> anyhow::Result<(CbindConfig, Option<PathBuf>)> {
    match CbindConfig::find_and_load(cwd)? {
        Some((config, dir)) => Ok((config, Some(dir))),
        None => Ok((CbindConfig::default(), None)),
    }
}
