//! Domain classification.
//!
//! Maps the host of a canonical URL to a routing tag using a fixed set of
//! media hostnames. Matching is exact and case-sensitive: `youtube.com` and
//! `www.youtube.com` are different hosts.

use std::collections::HashSet;
use std::sync::Arc;

use url::Url;

use crate::error_handling::ResolutionError;
use crate::models::Classification;

/// Immutable set of hostnames routed to the media channel.
///
/// Cheap to clone; every worker shares the same underlying set.
#[derive(Debug, Clone, Default)]
pub struct ClassificationSet {
    hosts: Arc<HashSet<String>>,
}

impl ClassificationSet {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ClassificationSet {
            hosts: Arc::new(hosts.into_iter().map(Into::into).collect()),
        }
    }

    pub fn contains(&self, host: &str) -> bool {
        self.hosts.contains(host)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Classifies a host: members are `Media`, everything else `Article`.
    pub fn classify_host(&self, host: &str) -> Classification {
        if self.contains(host) {
            Classification::Media
        } else {
            Classification::Article
        }
    }

    /// Extracts the host of `canonical_url` and classifies it.
    ///
    /// Returns the host alongside the tag so callers can record it.
    ///
    /// # Errors
    ///
    /// `ResolutionError::InvalidUrl` if the URL does not parse or has no host.
    pub fn classify(&self, canonical_url: &str) -> Result<(String, Classification), ResolutionError> {
        let host = extract_host(canonical_url)?;
        let class = self.classify_host(&host);
        Ok((host, class))
    }
}

/// Returns the host component of `url` as written (IPv6 literals keep their brackets).
pub fn extract_host(url: &str) -> Result<String, ResolutionError> {
    let parsed = Url::parse(url).map_err(|e| ResolutionError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    parsed
        .host_str()
        .map(str::to_string)
        .ok_or_else(|| ResolutionError::InvalidUrl {
            url: url.to_string(),
            reason: "URL has no host component".to_string(),
        })
}

#[cfg(test)]
mod tests;
