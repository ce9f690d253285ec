//! The fixed set of upstream favicon providers and the target-URL parsing
//! that feeds them.

use crate::error::FaviconError;
use reqwest::Url;
use tracing::debug;

/// One upstream favicon provider.
///
/// `url_template` may contain `{domain}`, `{size}` and `{url}`. `{url}` is
/// replaced with the percent-encoded full target URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaviconSource {
    pub name: String,
    pub url_template: String,
}

impl FaviconSource {
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
        }
    }

    /// Substitute placeholders in one pass; substituted text is never rescanned.
    pub fn render(&self, target: &FaviconTarget, size: &str) -> String {
        let encoded_url = urlencoding::encode(&target.url);
        let placeholders = [
            ("{domain}", target.domain.as_str()),
            ("{size}", size),
            ("{url}", encoded_url.as_ref()),
        ];

        let mut rendered = String::with_capacity(self.url_template.len());
        let mut rest = self.url_template.as_str();
        while let Some(start) = rest.find('{') {
            rendered.push_str(&rest[..start]);
            let tail = &rest[start..];
            match placeholders
                .iter()
                .find(|(placeholder, _)| tail.starts_with(placeholder))
            {
                Some((placeholder, value)) => {
                    rendered.push_str(value);
                    rest = &tail[placeholder.len()..];
                }
                None => {
                    rendered.push('{');
                    rest = &tail[1..];
                }
            }
        }
        rendered.push_str(rest);
        rendered
    }
}

/// Providers in response order.
pub fn default_sources() -> Vec<FaviconSource> {
    vec![
        FaviconSource::new("Direct Favicon", "https://{domain}/favicon.ico"),
        FaviconSource::new("DuckDuckGo", "https://icons.duckduckgo.com/ip3/{domain}.ico"),
        FaviconSource::new(
            "Google",
            "https://www.google.com/s2/favicons?domain={url}&sz={size}",
        ),
        FaviconSource::new("Icon Horse", "https://icon.horse/icon/{domain}"),
        FaviconSource::new("FaviconKit", "https://api.faviconkit.com/{domain}/{size}"),
    ]
}

/// A parsed request target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaviconTarget {
    /// The URL as it is passed to providers that take the full URL.
    pub url: String,
    /// Hostname only, without port.
    pub domain: String,
}

impl FaviconTarget {
    /// Parse the `url` query value.
    ///
    /// A value without a scheme (`example.com`) is read as `https://example.com`.
    pub fn parse(raw: &str) -> Result<Self, FaviconError> {
        let url = if has_scheme(raw) {
            raw.to_string()
        } else {
            debug!("No scheme in {}, assuming https", raw);
            format!("https://{raw}")
        };

        let parsed =
            Url::parse(&url).map_err(|e| FaviconError::InvalidUrl(format!("{raw}: {e}")))?;

        let domain = parsed
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| FaviconError::InvalidUrl(format!("{raw}: no host")))?
            .to_string();

        Ok(Self { url, domain })
    }
}

/// `://` only marks a scheme when it comes before the path, query and fragment.
fn has_scheme(raw: &str) -> bool {
    let authority_end = raw.find(|c| matches!(c, '/' | '?' | '#')).unwrap_or(raw.len());
    raw.find("://").is_some_and(|i| i < authority_end)
}
