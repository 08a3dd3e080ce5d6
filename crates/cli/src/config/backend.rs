//! Backend Config

use std::time::Duration;

use clap::Args;

use dealcart::backend::HttpBackendConfig;

/// Cart API settings. Without a URL the cart stays a guest cart.
#[derive(Debug, Args)]
pub(crate) struct BackendConfig {
    /// Cart API base URL
    #[arg(long, env = "DEALCART_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token of the signed-in shopper
    #[arg(long, env = "DEALCART_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Cart API request timeout in seconds.
    #[arg(long, env = "DEALCART_API_TIMEOUT_SECONDS", default_value_t = 10u64)]
    pub api_timeout_seconds: u64,
}

impl BackendConfig {
    /// HTTP client settings, when an API URL is configured.
    pub(crate) fn http_config(&self) -> Option<HttpBackendConfig> {
        let base_url = self.api_url.clone()?;

        Some(HttpBackendConfig {
            base_url,
            token: self.api_token.clone(),
            timeout: Some(Duration::from_secs(self.api_timeout_seconds)),
        })
    }
}
