use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use agentkit_agents::AgentRegistry;
use agentkit_lifecycle::OperationOutcome;
use agentkit_lifecycle::ReqwestTransport;
use agentkit_lifecycle::ResourceLifecycleManager;
use agentkit_lifecycle::Transport;
use agentkit_tools::RedditClient;
use agentkit_tools::SpeechClient;
use agentkit_tools::ToolRegistry;
use agentkit_tools::builtin_registry;
use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use owo_colors::OwoColorize;
use serde_json::Value as JsonValue;
use serde_json::to_string_pretty;

use crate::config::Config;

/// Clients shared by every command, built once from the loaded config.
pub struct AppContext {
    manager: ResourceLifecycleManager,
    reddit: RedditClient,
    speech: SpeechClient,
    tools: ToolRegistry,
    agents_dir: PathBuf,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(
            ReqwestTransport::new(config.timeout()).context("failed to build HTTP client")?,
        );
        let manager = ResourceLifecycleManager::new(config.lifecycle_config(), transport.clone());
        let reddit = RedditClient::new(config.reddit_config(), transport.clone());
        let speech = SpeechClient::new(config.speech_config(), transport);
        let tools = builtin_registry(manager.clone(), reddit.clone(), speech.clone())?;

        Ok(Self {
            manager,
            reddit,
            speech,
            tools,
            agents_dir: config.agents_dir(),
        })
    }
}

pub async fn repo_create(
    ctx: &AppContext,
    name: &str,
    description: Option<&str>,
    private: bool,
) -> Result<()> {
    let outcome = ctx
        .manager
        .create_resource(name, description.unwrap_or_default(), private)
        .await
        .with_context(|| format!("failed to create repository `{name}`"))?;
    print_outcome(outcome)
}

pub async fn repo_delete(ctx: &AppContext, name: &str) -> Result<()> {
    let outcome = ctx
        .manager
        .delete_resource(name)
        .await
        .with_context(|| format!("failed to delete repository `{name}`"))?;
    print_outcome(outcome)
}

fn print_outcome(outcome: OperationOutcome) -> Result<()> {
    match outcome.into_result()? {
        OperationOutcome::Created(descriptor) => {
            let json = descriptor.as_json();
            let full_name = descriptor.full_name().unwrap_or("repository");
            let mut line = format!("{} {full_name}", "created".green());
            if let Some(url) = json.get("html_url").and_then(JsonValue::as_str) {
                let _ = write!(line, " ({url})");
            }
            println!("{line}");
        }
        OperationOutcome::AlreadyExists { resource } => {
            println!("{} {resource}", "already exists".yellow());
        }
        OperationOutcome::Deleted { resource } => {
            println!("{} {resource}", "deleted".green());
        }
        OperationOutcome::NotFound { resource } => {
            println!("{} {resource}", "not found".yellow());
        }
        OperationOutcome::Failed(cause) => return Err(cause.into()),
    }
    Ok(())
}

pub async fn repo_list(ctx: &AppContext) -> Result<()> {
    let repositories = ctx
        .manager
        .list_resources()
        .await
        .context("failed to list repositories")?;
    if repositories.is_empty() {
        println!(
            "No repositories with prefix `{}`.",
            ctx.manager.naming().prefix()
        );
        return Ok(());
    }
    for repository in repositories {
        let json = repository.as_json();
        let mut line = format!("- {}", repository.name().unwrap_or_default().green());
        if json.get("private").and_then(JsonValue::as_bool) == Some(true) {
            let _ = write!(line, " {}", "(private)".dimmed());
        }
        if let Some(description) = json.get("description").and_then(JsonValue::as_str) {
            let _ = write!(line, ": {description}");
        }
        println!("{line}");
    }
    Ok(())
}

pub async fn reddit_top(ctx: &AppContext, subreddits: &[String], limit: u32) -> Result<()> {
    let posts = ctx
        .reddit
        .top_posts(subreddits, limit)
        .await
        .context("failed to fetch top posts")?;
    for (subreddit, posts) in posts {
        println!("{}", format!("r/{subreddit}").bold());
        if posts.is_empty() {
            println!("  (no posts)");
        }
        for post in posts {
            println!("  - {}", post.title);
            println!("    {}", post.link.dimmed());
        }
    }
    Ok(())
}

pub async fn speak(ctx: &AppContext, text: &str, output: Option<PathBuf>) -> Result<()> {
    let path = ctx
        .speech
        .synthesize(text, output)
        .await
        .context("text-to-speech failed")?;
    println!("{} {}", "wrote".green(), path.display());
    Ok(())
}

fn load_agents(ctx: &AppContext) -> Result<AgentRegistry> {
    let mut registry = AgentRegistry::new(&ctx.agents_dir);
    registry
        .reload()
        .with_context(|| format!("failed to scan {}", ctx.agents_dir.display()))?;
    Ok(registry)
}

fn print_parse_errors(registry: &AgentRegistry) {
    if registry.parse_errors().is_empty() {
        return;
    }
    eprintln!("\nErrors:");
    for error in registry.parse_errors() {
        eprintln!("  {}: {}", error.path.display(), error.message.red());
    }
}

pub fn agents_list(ctx: &AppContext) -> Result<()> {
    let registry = load_agents(ctx)?;
    if registry.is_empty() {
        println!(
            "No agents discovered. Add Markdown definitions under {}.",
            registry.dir().display()
        );
    } else {
        println!("Available agents:\n");
        for spec in registry.agents() {
            let mut line = String::new();
            let _ = write!(line, "- {} [{}]", spec.name().green(), spec.kind);
            if let Some(desc) = spec.description() {
                let _ = write!(line, ": {desc}");
            }
            if let Some(model) = spec.model() {
                let _ = write!(line, " (model: {model})");
            }
            println!("{line}");
        }
    }
    print_parse_errors(&registry);
    Ok(())
}

pub fn agents_check(ctx: &AppContext) -> Result<()> {
    let registry = load_agents(ctx)?;
    let issues = registry.check_references(&ctx.tools.names());
    print_parse_errors(&registry);
    for issue in &issues {
        eprintln!("  {}", issue.to_string().red());
    }

    let problems = registry.parse_errors().len() + issues.len();
    if problems > 0 {
        bail!("{problems} problem(s) found in {}", registry.dir().display());
    }
    println!("{} {} agent(s) checked", "ok".green(), registry.len());
    Ok(())
}

pub fn tools_list(ctx: &AppContext) {
    for definition in ctx.tools.definitions() {
        println!("{}: {}", definition.name.green(), definition.description);
    }
}

pub async fn tools_call(ctx: &AppContext, name: &str, args: &str) -> Result<()> {
    let args: JsonValue =
        serde_json::from_str(args).context("--args must be a JSON object")?;
    let result = ctx
        .tools
        .invoke(name, args)
        .await
        .with_context(|| format!("tool `{name}` failed"))?;
    println!("{}", to_string_pretty(&result)?);
    Ok(())
}
