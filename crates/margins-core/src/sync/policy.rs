//! Cache trust policy

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// When the boot sequence trusts the cache instead of refetching
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshPolicy {
    /// Full refresh whenever the cached version differs from the remote one
    #[default]
    VersionChecked,
    /// Version-checked, plus an article index refresh on every boot
    AlwaysRefreshArticles,
    /// Trust any cache with navigation; always refresh the article index
    CacheIfValid,
}

impl RefreshPolicy {
    pub const ALL: [RefreshPolicy; 3] = [
        RefreshPolicy::VersionChecked,
        RefreshPolicy::AlwaysRefreshArticles,
        RefreshPolicy::CacheIfValid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshPolicy::VersionChecked => "version-checked",
            RefreshPolicy::AlwaysRefreshArticles => "always-refresh-articles",
            RefreshPolicy::CacheIfValid => "cache-if-valid",
        }
    }

    /// Whether the remote version marker is consulted at all
    pub fn checks_version(&self) -> bool {
        !matches!(self, RefreshPolicy::CacheIfValid)
    }

    /// Whether an adopted cache still gets a fresh article index
    pub fn refreshes_articles_on_adopt(&self) -> bool {
        !matches!(self, RefreshPolicy::VersionChecked)
    }
}

impl fmt::Display for RefreshPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RefreshPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown refresh policy '{}' (expected one of: version-checked, always-refresh-articles, cache-if-valid)",
                    s
                )
            })
    }
}
