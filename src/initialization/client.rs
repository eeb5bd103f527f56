//! HTTP client initialization.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

/// Initializes the HTTP client used for redirect probing.
///
/// Creates a `reqwest::Client` configured with:
/// - Redirect following disabled, so each hop's `Location` header is visible
/// - No proxy (environment proxies are ignored)
/// - `hop_timeout` applied to every request, connect included
/// - The given User-Agent
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_redirect_client(
    hop_timeout: Duration,
    user_agent: &str,
) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .connect_timeout(hop_timeout)
        .timeout(hop_timeout)
        .user_agent(user_agent)
        .build()?;
    Ok(Arc::new(client))
}
