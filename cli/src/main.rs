use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::AppContext;
use config::Config;

#[derive(Debug, Parser)]
#[command(name = "agentkit")]
#[command(about = "Tools for AI agents: idempotent GitHub repositories, Reddit digests, speech")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create, delete, or list agent-owned repositories.
    Repo {
        #[command(subcommand)]
        command: RepoCommand,
    },

    /// Read posts from Reddit.
    Reddit {
        #[command(subcommand)]
        command: RedditCommand,
    },

    /// Convert text to speech and save the audio.
    Speak {
        /// Text to synthesize.
        text: String,

        /// Where to write the audio; defaults to the configured output path.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect agent definitions.
    Agents {
        #[command(subcommand)]
        command: AgentsCommand,
    },

    /// Inspect or invoke the built-in tools.
    Tools {
        #[command(subcommand)]
        command: ToolsCommand,
    },
}

#[derive(Debug, Subcommand)]
enum RepoCommand {
    /// Create a repository unless it already exists.
    Create {
        /// Repository name; the configured prefix is added when missing.
        name: String,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        private: bool,
    },

    /// Delete a repository if it exists. The name is used verbatim.
    Delete { name: String },

    /// List repositories carrying the configured prefix.
    List,
}

#[derive(Debug, Subcommand)]
enum RedditCommand {
    /// Show today's top posts.
    Top {
        #[arg(required = true)]
        subreddits: Vec<String>,

        #[arg(short, long, default_value_t = agentkit_tools::reddit::DEFAULT_POST_LIMIT)]
        limit: u32,
    },
}

#[derive(Debug, Subcommand)]
enum AgentsCommand {
    /// List agent definitions.
    List,

    /// Report invalid definitions and dangling references.
    Check,
}

#[derive(Debug, Subcommand)]
enum ToolsCommand {
    /// List the built-in tools.
    List,

    /// Invoke a tool with JSON arguments.
    Call {
        name: String,

        #[arg(short, long, default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _ = dotenvy::dotenv();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("agentkit={log_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let ctx = AppContext::new(config)?;

    match cli.command {
        Command::Repo { command } => match command {
            RepoCommand::Create {
                name,
                description,
                private,
            } => commands::repo_create(&ctx, &name, description.as_deref(), private).await?,
            RepoCommand::Delete { name } => commands::repo_delete(&ctx, &name).await?,
            RepoCommand::List => commands::repo_list(&ctx).await?,
        },
        Command::Reddit { command } => match command {
            RedditCommand::Top { subreddits, limit } => {
                commands::reddit_top(&ctx, &subreddits, limit).await?
            }
        },
        Command::Speak { text, output } => commands::speak(&ctx, &text, output).await?,
        Command::Agents { command } => match command {
            AgentsCommand::List => commands::agents_list(&ctx)?,
            AgentsCommand::Check => commands::agents_check(&ctx)?,
        },
        Command::Tools { command } => match command {
            ToolsCommand::List => commands::tools_list(&ctx),
            ToolsCommand::Call { name, args } => commands::tools_call(&ctx, &name, &args).await?,
        },
    }

    Ok(())
}
