//! Redirect resolution.
//!
//! This module follows short-link redirect chains to their canonical
//! destination with a bounded hop count and a per-hop timeout.

mod redirects;

pub use redirects::{resolve_redirect_chain, HttpResolver, Resolution, UrlResolver};
