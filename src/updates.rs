use crate::store::Store;
use crate::AppResult;
use chrono::{DateTime, Duration, Utc};
use rvstruct::ValueStruct;
use serde::Deserialize;

pub const RELEASES_URL: &str =
    "https://api.github.com/repos/snaptext-dev/snaptext/releases/latest";

pub fn update_check_interval() -> Duration {
    Duration::hours(24)
}

#[derive(Debug, Clone, ValueStruct)]
pub struct DownloadUrl(String);

#[derive(Debug, Clone, Deserialize)]
struct ReleaseInfo {
    tag_name: String,
    #[serde(default)]
    body: Option<String>,
    html_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
}

impl Version {
    pub fn current() -> AppResult<Self> {
        env!("CARGO_PKG_VERSION")
            .parse()
            .map_err(|message| crate::errors::AppError::SystemError { message })
    }

    pub fn is_newer_than(&self, other: &Version) -> bool {
        self > other
    }
}

impl std::str::FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix('v').unwrap_or(s);
        let mut parts = stripped.split('.');
        let mut next_part = |name: &str| {
            parts
                .next()
                .ok_or_else(|| format!("Version {} is missing its {} part", s, name))?
                .parse::<u64>()
                .map_err(|e| format!("Failed to parse version {}: {}", s, e))
        };
        let version = Version {
            major: next_part("major")?,
            minor: next_part("minor")?,
            patch: next_part("patch")?,
        };
        if parts.next().is_some() {
            return Err(format!("Version {} has too many parts", s));
        }
        Ok(version)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateAvailability {
    pub latest_version: Version,
    pub download_url: DownloadUrl,
}

pub struct UpdateChecker<'a> {
    store: &'a Store,
    client: reqwest::Client,
    url: String,
    current: Version,
}

impl<'a> UpdateChecker<'a> {
    pub fn new(store: &'a Store, current: Version) -> Self {
        Self {
            store,
            client: reqwest::Client::new(),
            url: RELEASES_URL.to_string(),
            current,
        }
    }

    pub fn with_url(store: &'a Store, current: Version, url: String) -> Self {
        Self {
            store,
            client: reqwest::Client::new(),
            url,
            current,
        }
    }

    /// Background variant: never surfaces failures to the user.
    pub async fn check_silently(&self) {
        if let Err(error) = self.check(false).await {
            tracing::debug!("Update check failed: {}", error);
        }
    }

    /// Fetches release metadata, at most once per interval unless forced.
    /// Returns the update when the published version is newer.
    pub async fn check(&self, force: bool) -> AppResult<Option<UpdateAvailability>> {
        let now = Utc::now();
        if !force && !should_check(self.store.update_state().last_check, now) {
            tracing::debug!("Update check skipped, checked recently");
            return Ok(None);
        }

        let release: ReleaseInfo = self
            .client
            .get(&self.url)
            .header("User-Agent", "snaptext")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let latest: Version =
            release
                .tag_name
                .parse()
                .map_err(|message| crate::errors::AppError::SystemError { message })?;

        let availability = if latest.is_newer_than(&self.current) {
            self.store.set_update_available(
                &latest.to_string(),
                release
                    .body
                    .as_deref()
                    .unwrap_or("No release notes available"),
                &release.html_url,
            )?;
            Some(UpdateAvailability {
                latest_version: latest,
                download_url: release.html_url.into(),
            })
        } else {
            None
        };
        self.store.set_last_update_check(now)?;
        Ok(availability)
    }
}

fn should_check(last_check: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_check {
        Some(last_check) => now - last_check >= update_check_interval(),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn test_version_comparison() {
        assert!(version("1.2.0").is_newer_than(&version("1.1.9")));
        assert!(!version("1.1.9").is_newer_than(&version("1.2.0")));
        assert!(!version("1.2.0").is_newer_than(&version("1.2.0")));
        assert!(version("2.0.0").is_newer_than(&version("1.9.9")));
        assert!(version("0.10.0").is_newer_than(&version("0.9.9")));
    }

    #[test]
    fn test_version_parses_leading_v() {
        assert_eq!(version("v1.2.3"), version("1.2.3"));
        assert_eq!(version("1.2.3").to_string(), "1.2.3");
    }

    #[test]
    fn test_malformed_versions_are_rejected() {
        assert!("1.2".parse::<Version>().is_err());
        assert!("1.2.3.4".parse::<Version>().is_err());
        assert!("1.2.x".parse::<Version>().is_err());
        assert!("".parse::<Version>().is_err());
    }

    #[test]
    fn test_check_is_throttled_to_the_interval() {
        let now = Utc::now();
        assert!(should_check(None, now));
        assert!(!should_check(Some(now - Duration::hours(1)), now));
        assert!(should_check(Some(now - Duration::hours(25)), now));
    }

    #[tokio::test]
    async fn test_recent_check_skips_the_network_entirely() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("state.json")).unwrap();
        store.set_last_update_check(Utc::now()).unwrap();
        // Unroutable URL: reaching the network would fail loudly.
        let checker = UpdateChecker::with_url(
            &store,
            version("1.0.0"),
            "http://127.0.0.1:1/releases/latest".to_string(),
        );
        let result = checker.check(false).await.unwrap();
        assert!(result.is_none());
        assert!(!store.update_state().update_available);
    }
}
