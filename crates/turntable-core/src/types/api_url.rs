//! API base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use url::{Host, Url};

use crate::error::{Error, InvalidInputError};

/// A validated base URL of the catalog backend API, e.g.
/// `https://api.example.com/api`.
///
/// The URL must be absolute and use HTTPS. Plain HTTP is accepted for
/// loopback and private-network hosts, which is how development servers
/// are usually reached.
///
/// # Example
///
/// ```
/// use turntable_core::ApiUrl;
///
/// let api = ApiUrl::new("https://api.example.com/api/").unwrap();
/// assert_eq!(api.endpoint("/collections/"), "https://api.example.com/api/collections/");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Create a new API URL from a string, validating the format.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        Ok(Self(url))
    }

    /// Returns the full URL for an endpoint path such as `/wishlists/items`.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn allows_plain_http(url: &Url) -> bool {
        match url.host() {
            Some(Host::Domain(domain)) => domain == "localhost",
            Some(Host::Ipv4(addr)) => addr.is_loopback() || addr.is_private(),
            Some(Host::Ipv6(addr)) => IpAddr::V6(addr).is_loopback(),
            None => false,
        }
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        let invalid = |reason: &str| -> Error {
            InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if url.cannot_be_a_base() {
            return Err(invalid("must be an absolute URL"));
        }

        if url.host_str().is_none() {
            return Err(invalid("must have a host"));
        }

        let scheme = url.scheme();
        if scheme != "https" && !(scheme == "http" && Self::allows_plain_http(url)) {
            return Err(invalid(
                "must use HTTPS (HTTP allowed only for local network hosts)",
            ));
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("must not carry a query or fragment"));
        }

        Ok(())
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ApiUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_url_with_path() {
        let api = ApiUrl::new("https://api.example.com/api").unwrap();
        assert_eq!(api.host(), Some("api.example.com"));
        assert_eq!(
            api.endpoint("/wishlists/items"),
            "https://api.example.com/api/wishlists/items"
        );
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let api = ApiUrl::new("https://api.example.com/api/").unwrap();
        assert_eq!(
            api.endpoint("collections/"),
            "https://api.example.com/api/collections/"
        );
    }

    #[test]
    fn plain_http_for_development_hosts() {
        assert!(ApiUrl::new("http://localhost:8000/api").is_ok());
        assert!(ApiUrl::new("http://127.0.0.1:8000/api").is_ok());
        assert!(ApiUrl::new("http://192.168.0.180:8000/api").is_ok());
        assert!(ApiUrl::new("http://[::1]:8000").is_ok());
    }

    #[test]
    fn plain_http_rejected_for_public_hosts() {
        assert!(ApiUrl::new("http://api.example.com").is_err());
        assert!(ApiUrl::new("http://8.8.8.8").is_err());
    }

    #[test]
    fn rejects_relative_and_query() {
        assert!(ApiUrl::new("/api").is_err());
        assert!(ApiUrl::new("https://api.example.com/api?x=1").is_err());
    }
}
