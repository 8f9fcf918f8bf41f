//! Target URL resolution and path handling for relayed requests

use crate::domain::UpstreamBaseUrl;
use crate::proxy::headers::{paths, upstream};
use crate::proxy::types::*;
use http::Uri;
use reqwest::Url;

/// Strategy for mapping inbound paths onto the upstream API
pub struct UrlResolver;

impl UrlResolver {
    /// Strip the `/proxy` mount point from an inbound path, exactly once
    ///
    /// Returns `None` when the path is not under the mount point. The prefix
    /// only matches a whole segment, so `/proxyfoo` is not forwarded.
    pub fn strip_mount(path: &str) -> Option<&str> {
        let rest = path.strip_prefix(paths::PROXY)?;
        if rest.is_empty() || rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }

    /// Join a path onto the upstream base with exactly one separating slash
    ///
    /// Repeated slashes inside `path` collapse to one; a trailing slash is kept.
    pub fn join(base: &UpstreamBaseUrl, path: &str) -> String {
        let base = base.as_ref().trim_end_matches('/');
        let mut joined = String::with_capacity(base.len() + path.len() + 1);
        joined.push_str(base);
        joined.push('/');

        let mut previous_slash = true;
        for c in path.chars() {
            if c == '/' {
                if !previous_slash {
                    joined.push(c);
                }
                previous_slash = true;
            } else {
                joined.push(c);
                previous_slash = false;
            }
        }

        joined
    }

    /// Whether `segment` is `.` or `..`, percent-encoded or not
    ///
    /// URL parsing resolves these, which would let a path climb above the base.
    pub fn is_dot_segment(segment: &str) -> bool {
        let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
        decoded == "." || decoded == ".."
    }

    /// Resolve the upstream URL for an inbound `/proxy/...` request
    ///
    /// The inbound query string is carried over verbatim. Paths containing dot
    /// segments are not forwarded.
    pub fn resolve_target_url(base: &UpstreamBaseUrl, inbound: &Uri) -> RelayResult<Url> {
        let remainder = Self::strip_mount(inbound.path())
            .filter(|rest| !rest.split('/').any(Self::is_dot_segment))
            .ok_or_else(|| RelayError::NotFound(inbound.path().to_string()))?;

        let mut target = Self::join(base, remainder);
        if let Some(query) = inbound.query() {
            target.push('?');
            target.push_str(query);
        }

        Url::parse(&target).map_err(|e| RelayError::InvalidTargetUrl(format!("{target}: {e}")))
    }

    /// URL of the upstream token exchange endpoint
    pub fn access_token_url(base: &UpstreamBaseUrl) -> RelayResult<Url> {
        let target = Self::join(base, upstream::ACCESS_TOKEN);
        Url::parse(&target).map_err(|e| RelayError::InvalidTargetUrl(format!("{target}: {e}")))
    }
}
