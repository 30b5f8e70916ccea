//! Newer-release lookup against the GitHub releases API.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

const RELEASES_URL: &str = "https://api.github.com/repos/phsym/kmip-explorer/releases/latest";

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
}

async fn latest_tag() -> Result<String, reqwest::Error> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .user_agent(concat!("kmip-explorer/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let release: Release = client
        .get(RELEASES_URL)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(release.tag_name)
}

/// The latest release tag if it is newer than `current`. Lookup failures
/// are logged and yield `None`.
pub async fn newer_release(current: &str) -> Option<String> {
    match latest_tag().await {
        Ok(tag) if is_newer(current, &tag) => {
            debug!(%tag, current, "newer release available");
            Some(tag)
        }
        Ok(tag) => {
            debug!(%tag, current, "running the latest release");
            None
        }
        Err(error) => {
            warn!(%error, "update check failed");
            None
        }
    }
}

/// Parse `v1.2.3` or `1.2.3`, ignoring any pre-release or build suffix.
fn parse_version(text: &str) -> Option<(u64, u64, u64)> {
    let text = text.trim().trim_start_matches('v');
    let core = text.split(['-', '+']).next()?;
    let mut parts = core.split('.').map(str::parse::<u64>);
    let major = parts.next()?.ok()?;
    let minor = parts.next().unwrap_or(Ok(0)).ok()?;
    let patch = parts.next().unwrap_or(Ok(0)).ok()?;
    Some((major, minor, patch))
}

/// Whether `candidate` is a strictly higher version than `current`.
/// Unparseable versions never count as newer.
pub fn is_newer(current: &str, candidate: &str) -> bool {
    match (parse_version(current), parse_version(candidate)) {
        (Some(current), Some(candidate)) => candidate > current,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_compare_numerically() {
        assert!(is_newer("0.3.0", "v0.10.0"));
        assert!(is_newer("v1.2.3", "1.3"));
        assert!(!is_newer("1.2.3", "v1.2.3"));
        assert!(!is_newer("1.2.3", "1.2.2"));
    }

    #[test]
    fn suffixes_and_garbage() {
        assert!(is_newer("0.3.0", "v0.4.0-rc1"));
        assert!(!is_newer("0.3.0", "nightly"));
        assert!(!is_newer("dev", "v9.9.9"));
        assert_eq!(parse_version("v2"), Some((2, 0, 0)));
    }
}
