//! HTTP redirect chain resolution.
//!
//! Redirects are followed by hand, one request per hop, so the hop count and
//! per-hop timeout stay under our control.

use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::Url;

use crate::error_handling::{categorize_reqwest_error, ResolutionError};

/// Result of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Last URL reached: the first one without a `Location`, or the one reached
    /// when the hop bound ran out.
    pub canonical_url: String,
    /// Every URL visited, starting with the input. `chain.len() == hops + 1`.
    pub chain: Vec<String>,
}

impl Resolution {
    /// Number of redirects followed.
    pub fn hops(&self) -> usize {
        self.chain.len().saturating_sub(1)
    }
}

/// Resolves a raw URL to its canonical destination.
#[async_trait]
pub trait UrlResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> Result<Resolution, ResolutionError>;

    /// Hop bound applied by this resolver.
    fn max_redirects(&self) -> usize;
}

/// Resolver probing real HTTP endpoints.
///
/// The client must have redirects disabled; see
/// [`crate::initialization::init_redirect_client`].
pub struct HttpResolver {
    client: std::sync::Arc<reqwest::Client>,
    max_redirects: usize,
}

impl HttpResolver {
    pub fn new(client: std::sync::Arc<reqwest::Client>, max_redirects: usize) -> Self {
        HttpResolver {
            client,
            max_redirects,
        }
    }
}

#[async_trait]
impl UrlResolver for HttpResolver {
    async fn resolve(&self, url: &str) -> Result<Resolution, ResolutionError> {
        let (canonical_url, chain) =
            resolve_redirect_chain(url, self.max_redirects, &self.client).await?;
        Ok(Resolution {
            canonical_url,
            chain,
        })
    }

    fn max_redirects(&self) -> usize {
        self.max_redirects
    }
}

/// Follows the redirect chain of `start_url` for at most `max_hops` redirects.
///
/// Each hop is a single request; any response carrying a non-empty `Location`
/// header counts as a redirect, whatever its status. Relative locations are
/// joined against the URL that produced them.
///
/// Returns `(final_url, chain)` where `chain` holds every URL visited, the final
/// one included. Reaching `max_hops` is not an error: the URL reached after the
/// last hop is returned without being probed.
///
/// # Errors
///
/// Any transport error, timeout or unparseable URL ends resolution immediately.
/// Nothing is retried.
pub async fn resolve_redirect_chain(
    start_url: &str,
    max_hops: usize,
    client: &reqwest::Client,
) -> Result<(String, Vec<String>), ResolutionError> {
    let mut current = start_url.to_string();
    let mut current_url = parse_url(&current)?;
    let mut chain = vec![current.clone()];
    let mut hops = 0;

    while hops < max_hops {
        let resp = client
            .get(current_url.clone())
            .send()
            .await
            .map_err(|e| categorize_reqwest_error(&current, e))?;

        let location = match resp.headers().get(LOCATION) {
            Some(value) => value
                .to_str()
                .map_err(|e| ResolutionError::InvalidUrl {
                    url: current.clone(),
                    reason: format!("unreadable Location header: {e}"),
                })?
                .trim()
                .to_string(),
            None => String::new(),
        };

        if location.is_empty() {
            log::debug!("{} resolved after {} hop(s)", current, hops);
            return Ok((current, chain));
        }

        // Absolute locations are kept verbatim; relative ones are joined
        let (next, next_url) = match Url::parse(&location) {
            Ok(absolute) => (location, absolute),
            Err(_) => {
                let joined =
                    current_url
                        .join(&location)
                        .map_err(|e| ResolutionError::InvalidUrl {
                            url: location.clone(),
                            reason: e.to_string(),
                        })?;
                (joined.to_string(), joined)
            }
        };
        log::trace!("{} -> {} ({})", current, next, resp.status());

        current = next;
        current_url = next_url;
        chain.push(current.clone());
        hops += 1;
    }

    log::debug!(
        "Stopped following {} after {} hops at {}",
        start_url,
        max_hops,
        current
    );
    Ok((current, chain))
}

fn parse_url(url: &str) -> Result<Url, ResolutionError> {
    Url::parse(url.trim()).map_err(|e| ResolutionError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
