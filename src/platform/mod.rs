use serde::{Deserialize, Serialize};
use url::Url;

/// Social platforms the extraction service accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Tiktok,
    Instagram,
    Facebook,
    Twitter,
}

impl Platform {
    /// All platforms, in the order they are reported to users
    pub fn all() -> &'static [Platform] {
        &[
            Platform::Youtube,
            Platform::Tiktok,
            Platform::Instagram,
            Platform::Facebook,
            Platform::Twitter,
        ]
    }

    /// Host domains that belong to this platform
    pub fn domains(&self) -> &'static [&'static str] {
        match self {
            Platform::Youtube => &["youtube.com", "youtu.be"],
            Platform::Tiktok => &["tiktok.com"],
            Platform::Instagram => &["instagram.com"],
            Platform::Facebook => &["facebook.com", "fb.watch"],
            Platform::Twitter => &["twitter.com", "x.com"],
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Youtube => "YouTube",
            Platform::Tiktok => "TikTok",
            Platform::Instagram => "Instagram",
            Platform::Facebook => "Facebook",
            Platform::Twitter => "Twitter/X",
        }
    }

    fn matches_host(&self, host: &str) -> bool {
        self.domains().iter().any(|domain| is_host(host, domain))
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Outcome of classifying a URL against the platform allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub supported: bool,
    pub platform: Option<Platform>,
}

impl Classification {
    fn unsupported() -> Self {
        Self {
            supported: false,
            platform: None,
        }
    }

    pub fn is_youtube(&self) -> bool {
        self.platform == Some(Platform::Youtube)
    }
}

/// Classify a URL by its host. Malformed URLs are unsupported, never an error.
pub fn classify(url: &str) -> Classification {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return Classification::unsupported(),
    };

    let host = match parsed.host_str() {
        Some(host) => host.to_lowercase(),
        None => return Classification::unsupported(),
    };

    match Platform::all().iter().find(|p| p.matches_host(&host)) {
        Some(platform) => Classification {
            supported: true,
            platform: Some(*platform),
        },
        None => Classification::unsupported(),
    }
}

/// Check whether a URL belongs to a supported platform
pub fn is_supported(url: &str) -> bool {
    classify(url).supported
}

/// Human-readable list of supported platforms, e.g. for error messages
pub fn supported_platforms_label() -> String {
    Platform::all()
        .iter()
        .map(|p| p.display_name())
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_host(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .map_or(false, |prefix| prefix.ends_with('.'))
}
