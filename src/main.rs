use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use codeforge::Result;
use colored::Colorize;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "codeforge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "AI code-generation orchestrator", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full generation workflow from a requirements file
    Generate {
        /// Requirements text file (default: the configured requirements file)
        requirements: Option<PathBuf>,

        /// Directory where artifacts materialize (default: from config)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Skip the human checkpoint and auto-approve every iteration
        #[arg(short, long)]
        yes: bool,
    },

    /// Start the upload/download server
    Serve {
        /// Port to listen on (default: from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show the persisted state of a workflow run
    Status {
        /// Artifact root to inspect (default: from config)
        root: Option<PathBuf>,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime");

    if let Err(e) = runtime.block_on(run_async(cli)) {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

async fn run_async(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate {
            requirements,
            root,
            yes,
        } => {
            codeforge::cli::generate::run(requirements.as_deref(), root.as_deref(), yes).await?;
        }

        Commands::Serve { port } => {
            codeforge::cli::serve::run(port).await?;
        }

        Commands::Status { root, json } => {
            codeforge::cli::status::run(root.as_deref(), json)?;
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "codeforge", &mut io::stdout());
        }
    }

    Ok(())
}
