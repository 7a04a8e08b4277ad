use crate::core::domain::{
    error::{NcpaResult, ValidationError},
    value_object::{ncpa_host::NcpaHost, ncpa_port::NcpaPort},
};
use std::fmt;
use url::Url;

const API_ROOT: &str = "api/";
const REDACTED: &str = "***";

/// Represents an NCPA API URL
///
/// Combines an [`NcpaHost`] and [`NcpaPort`] into the API root
/// (`https://{host}:{port}/api/`), from which endpoint URLs are derived.
/// Every endpoint URL carries the token and `units=B`, which makes the agent
/// report sized quantities in bytes.
///
/// # Examples
///
/// ```
/// use ncpa_agent::{NcpaHost, NcpaPort, NcpaUrl};
///
/// let host = NcpaHost::new("agent.example.com").unwrap();
/// let root = NcpaUrl::new(&host, NcpaPort::DEFAULT, true).unwrap();
/// let url = root.endpoint("memory", "secret", &[("aggregate", "avg")]).unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://agent.example.com:5693/api/memory?token=secret&units=B&aggregate=avg"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NcpaUrl {
    url: Url,
    // `Url` drops the scheme's default port; this keeps it spelled out.
    text: String,
}

impl NcpaUrl {
    /// Builds the API root URL for an agent.
    pub fn new(host: &NcpaHost, port: NcpaPort, secure: bool) -> NcpaResult<Self> {
        let scheme = if secure { "https" } else { "http" };
        let url = Url::parse(&format!("{}://{}:{}/{}", scheme, host, port, API_ROOT))
            .map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;
        Ok(Self::from_url(url))
    }

    /// Derives the URL of an endpoint below the API root.
    ///
    /// The endpoint is escaped as a single path segment, so `cpu/percent`
    /// becomes `cpu%2Fpercent`. Caller parameters are merged over the
    /// `token` and `units` defaults; on a key collision the caller wins.
    pub fn endpoint<K, V>(&self, endpoint: &str, token: &str, params: &[(K, V)]) -> NcpaResult<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut url = self.url.clone();

        if !endpoint.is_empty() {
            url.path_segments_mut()
                .map_err(|_| ValidationError::Format(format!("URL '{}' cannot be a base", self.text)))?
                .pop_if_empty()
                .push(endpoint);
        }

        url.query_pairs_mut()
            .clear()
            .extend_pairs(merge_query(token, params));

        Ok(Self::from_url(url))
    }

    fn from_url(url: Url) -> Self {
        let text = with_explicit_port(&url);
        Self { url, text }
    }

    /// Returns the URL as a string slice, always with an explicit port.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the underlying parsed URL.
    #[must_use]
    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// Returns the URL with the token value masked, for logging.
    #[must_use]
    pub fn redacted(&self) -> String {
        let mut url = self.url.clone();
        let pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .map(|(key, value)| {
                let value = if key == "token" {
                    REDACTED.to_string()
                } else {
                    value.into_owned()
                };
                (key.into_owned(), value)
            })
            .collect();
        if !pairs.is_empty() {
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }
        with_explicit_port(&url)
    }
}

fn with_explicit_port(url: &Url) -> String {
    let text = url.to_string();
    match (url.port(), url.port_or_known_default(), url.host_str()) {
        (None, Some(port), Some(host)) => {
            let authority = format!("{}://{}", url.scheme(), host);
            text.replacen(&authority, &format!("{}:{}", authority, port), 1)
        }
        _ => text,
    }
}

impl fmt::Display for NcpaUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn merge_query<K, V>(token: &str, params: &[(K, V)]) -> Vec<(String, String)>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut query = vec![
        ("token".to_string(), token.to_string()),
        ("units".to_string(), "B".to_string()),
    ];

    for (key, value) in params {
        let key: &str = key.as_ref();
        let value: &str = value.as_ref();
        match query.iter_mut().find(|entry| entry.0 == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => query.push((key.to_string(), value.to_string())),
        }
    }

    query
}

/// Returns the URL of an NCPA API endpoint.
///
/// This is the loosely typed entry point: the port may be anything
/// convertible into an [`NcpaPort`] and silently falls back to 5693 when
/// unusable, and the token is not checked.
///
/// # Errors
///
/// Fails only when `host` cannot be used as a URL host.
pub fn build_url(
    host: &str,
    port: impl Into<NcpaPort>,
    token: &str,
    endpoint: &str,
    params: &[(&str, &str)],
) -> NcpaResult<String> {
    let host = NcpaHost::new(host)?;
    let root = NcpaUrl::new(&host, port.into(), true)?;
    Ok(root.endpoint(endpoint, token, params)?.as_str().to_string())
}
