use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use ziprepo::core::error_help::format_error_with_help;
use ziprepo::core::ZiprepoError;

mod cli;

#[derive(Parser)]
#[command(name = "ziprepo")]
#[command(about = "Publish ZIP archives and folders to GitHub repositories")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload archives, files or a folder to a repository
    Upload {
        /// ZIP archives, plain files, or a single folder
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Target repository name
        #[arg(short, long)]
        repo: String,
        /// Update an existing repository through a pull request
        #[arg(short, long)]
        existing: bool,
        /// Description for a newly created repository
        #[arg(short, long, conflicts_with = "existing")]
        description: Option<String>,
        /// Create the repository as private
        #[arg(short, long, conflicts_with = "existing")]
        private: bool,
        /// Initialize the new repository with a README
        #[arg(long, conflicts_with = "existing")]
        readme: bool,
    },
    /// Create an empty repository
    Create {
        /// Repository name
        name: String,
        /// Repository description
        #[arg(short, long)]
        description: Option<String>,
        /// Create the repository as private
        #[arg(short, long)]
        private: bool,
        /// Initialize with a README
        #[arg(long)]
        readme: bool,
    },
    /// List your repositories
    List,
    /// Store a GitHub token in the system keychain
    Login,
    /// Remove the stored GitHub token
    Logout,
    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Print the configuration file location
    Path,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Upload {
            inputs,
            repo,
            existing,
            description,
            private,
            readme,
        } => {
            cli::upload::run(cli::upload::UploadOptions {
                inputs,
                repo,
                existing,
                description,
                private,
                readme,
            })
            .await
        }
        Commands::Create {
            name,
            description,
            private,
            readme,
        } => cli::create::run(name, description, private, readme).await,
        Commands::List => cli::list::run().await,
        Commands::Login => cli::login::run().await,
        Commands::Logout => cli::logout::run(),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => cli::config::show(),
            ConfigCommands::Path => cli::config::path(),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(ZiprepoError::Cancelled) => {
            eprintln!("\nUpload cancelled. Files written before the interruption remain.");
            ExitCode::from(130)
        }
        Err(e) => {
            eprintln!("\n{}", format_error_with_help(&e));
            ExitCode::FAILURE
        }
    }
}
