use clap::Args;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_PORT: u16 = 8080;

/// Hosted model settings. Every flag falls back to an environment variable.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct AdvisorConfig {
    #[arg(long = "gemini-api-key", env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    #[arg(long = "gemini-model", env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub model: String,
    #[arg(
        long = "gemini-endpoint",
        env = "GEMINI_ENDPOINT",
        default_value = DEFAULT_GEMINI_ENDPOINT,
        help = "Base URL of the generative language API"
    )]
    pub endpoint: String,
    #[arg(
        long = "advisor-timeout-secs",
        env = "ADVISOR_TIMEOUT_SECS",
        default_value_t = 60,
        help = "Give up on an advice request after this many seconds"
    )]
    pub timeout_secs: u64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    #[command(flatten)]
    pub advisor: AdvisorConfig,
}

/// Installs the global subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
