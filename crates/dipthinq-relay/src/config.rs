use clap::Parser;

pub const DEFAULT_UPSTREAM_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_APP_TITLE: &str = "DipThinq";

/// Relay settings, from flags or the environment.
#[derive(Parser, Debug, Clone)]
#[command(name = "dipthinq-relay")]
#[command(version, about = "DipThinq chat relay", long_about = None)]
pub struct RelayConfig {
    /// Address to bind
    #[arg(long, env = "DIPTHINQ_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(short, long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// OpenRouter API key. The relay starts without one but every chat
    /// request then fails with a configuration error.
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible upstream
    #[arg(long, env = "OPENROUTER_BASE_URL", default_value = DEFAULT_UPSTREAM_URL)]
    pub upstream_url: String,

    /// Sent upstream as `HTTP-Referer`
    #[arg(long, env = "PUBLIC_BASE_URL", default_value = DEFAULT_PUBLIC_BASE_URL)]
    pub public_base_url: String,

    /// Sent upstream as `X-Title`
    #[arg(long, env = "DIPTHINQ_APP_TITLE", default_value = DEFAULT_APP_TITLE)]
    pub app_title: String,
}

impl RelayConfig {
    /// Configuration pointing at `upstream_url`, without reading flags or env.
    pub fn new(upstream_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            api_key,
            upstream_url: upstream_url.into(),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            app_title: DEFAULT_APP_TITLE.to_string(),
        }
    }

    /// The API key, treating an empty value as unset.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `{upstream}/chat/completions`, tolerating a trailing slash on the base.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.upstream_url.trim_end_matches('/'))
    }
}
