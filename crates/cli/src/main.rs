mod commands;
mod logging;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "prerender-kit")]
#[command(version, about = "Pre-render a web app's routes to static HTML", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Write a starter prerender.toml
    Init {
        /// Project directory
        path: PathBuf,
    },

    /// Check prerender.toml and its declared routes
    Validate {
        /// Project directory
        path: PathBuf,
    },

    /// Start the app and print every URL a build would fetch
    Routes {
        /// Project directory
        path: PathBuf,
    },

    /// Pre-render every route to static HTML
    Build {
        /// Project directory
        path: PathBuf,

        /// Output directory (overrides build.output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pages fetched at once (overrides build.concurrency)
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,

        /// Remove the output directory first
        #[arg(long)]
        clean: bool,
    },

    /// Serve a built output directory
    Preview {
        /// Output directory to serve
        dir: PathBuf,

        /// Port to serve on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Command::Init { path } => commands::init::run(path).await,
        Command::Validate { path } => commands::validate::run(path).await,
        Command::Routes { path } => commands::routes::run(path).await,
        Command::Build {
            path,
            output,
            concurrency,
            clean,
        } => commands::build::run(path, output, concurrency, clean).await,
        Command::Preview { dir, port } => commands::preview::run(dir, port).await,
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "prerender-kit", &mut io::stdout());
            Ok(())
        }
    }
}
