//! Daily top posts from a list of subreddits.

use std::sync::Arc;

use agentkit_lifecycle::HttpRequest;
use agentkit_lifecycle::Transport;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;
use serde_json::json;

use crate::error::ToolError;
use crate::error::ToolResult;
use crate::registry::Tool;
use crate::registry::parse_args;

pub const GET_TOP_POSTS: &str = "get_top_posts";
pub const DEFAULT_REDDIT_BASE: &str = "https://www.reddit.com";
pub const DEFAULT_REDDIT_USER_AGENT: &str = concat!("agentkit/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_POST_LIMIT: u32 = 5;
const MAX_POST_LIMIT: u32 = 100;
const PERMALINK_HOST: &str = "https://www.reddit.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub title: String,
    pub link: String,
}

#[derive(Debug, Clone)]
pub struct RedditConfig {
    pub base_url: String,
    pub user_agent: String,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REDDIT_BASE.to_string(),
            user_agent: DEFAULT_REDDIT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Listing {
    #[serde(default)]
    data: ListingData,
}

#[derive(Debug, Default, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    #[serde(default)]
    data: PostData,
}

#[derive(Debug, Default, Deserialize)]
struct PostData {
    #[serde(default)]
    title: String,
    #[serde(default)]
    permalink: String,
}

#[derive(Clone)]
pub struct RedditClient {
    config: RedditConfig,
    transport: Arc<dyn Transport>,
}

impl RedditClient {
    pub fn new(config: RedditConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// Fetches up to `limit` of today's top posts for each subreddit,
    /// keyed by subreddit in request order.
    pub async fn top_posts(
        &self,
        subreddits: &[String],
        limit: u32,
    ) -> ToolResult<IndexMap<String, Vec<Post>>> {
        if subreddits.is_empty() {
            return Err(ToolError::invalid_arguments(
                GET_TOP_POSTS,
                "at least one subreddit is required",
            ));
        }
        if !(1..=MAX_POST_LIMIT).contains(&limit) {
            return Err(ToolError::invalid_arguments(
                GET_TOP_POSTS,
                format!("limit must be between 1 and {MAX_POST_LIMIT}, got {limit}"),
            ));
        }

        let names = subreddits
            .iter()
            .map(String::as_str)
            .map(normalize_subreddit)
            .collect::<ToolResult<Vec<_>>>()?;

        let mut results = IndexMap::new();
        for subreddit in names {
            let posts = self.fetch(subreddit, limit).await?;
            results.insert(subreddit.to_string(), posts);
        }
        Ok(results)
    }

    async fn fetch(&self, subreddit: &str, limit: u32) -> ToolResult<Vec<Post>> {
        let url = format!(
            "{}/r/{subreddit}/top.json",
            self.config.base_url.trim_end_matches('/')
        );
        let request = HttpRequest::get(url)
            .header("User-Agent", self.config.user_agent.as_str())
            .query("t", "day")
            .query("limit", limit.to_string());

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(ToolError::Remote {
                service: "reddit",
                subject: subreddit.to_string(),
                status: response.status,
                body: response.text(),
            });
        }

        let listing: Listing = response.json().map_err(|err| ToolError::Decode {
            service: "reddit",
            message: err.to_string(),
        })?;
        let posts: Vec<Post> = listing
            .data
            .children
            .into_iter()
            .map(|child| Post {
                title: child.data.title,
                link: format!("{PERMALINK_HOST}{}", child.data.permalink),
            })
            .collect();
        tracing::debug!(subreddit, count = posts.len(), "fetched top posts");
        Ok(posts)
    }
}

/// Strips an optional `r/` prefix; names are limited to ASCII letters,
/// digits and underscores so they cannot alter the request path.
fn normalize_subreddit(raw: &str) -> ToolResult<&str> {
    let name = raw.trim();
    let name = name.strip_prefix("r/").unwrap_or(name);
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(name)
    } else {
        Err(ToolError::invalid_arguments(
            GET_TOP_POSTS,
            format!("invalid subreddit name `{raw}`"),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct TopPostsArgs {
    subreddits: Vec<String>,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_POST_LIMIT
}

#[derive(Clone)]
pub struct TopPostsTool {
    client: RedditClient,
}

impl TopPostsTool {
    pub fn new(client: RedditClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for TopPostsTool {
    fn name(&self) -> &str {
        GET_TOP_POSTS
    }

    fn description(&self) -> &str {
        "Return up to `limit` top posts of the day for each subreddit as {subreddit: [{title, link}]}"
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "subreddits": {"type": "array", "items": {"type": "string"}},
                "limit": {"type": "integer", "minimum": 1, "maximum": MAX_POST_LIMIT, "default": DEFAULT_POST_LIMIT}
            },
            "required": ["subreddits"]
        })
    }

    async fn invoke(&self, args: JsonValue) -> ToolResult<JsonValue> {
        let args: TopPostsArgs = parse_args(self.name(), args)?;
        let posts = self.client.top_posts(&args.subreddits, args.limit).await?;
        serde_json::to_value(posts).map_err(|err| ToolError::Decode {
            service: "reddit",
            message: err.to_string(),
        })
    }
}
