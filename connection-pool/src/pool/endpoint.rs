//! Endpoint identity: scheme, host and port of one backend node.
use std::{fmt, str::FromStr};

use url::Url;

use crate::pool::pool_error::PoolError;

/// A backend node that requests can be sent to, identified by scheme, host and port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint {
    scheme: String,
    host: String,
    port: u16,
    url: Url,
}

impl Endpoint {
    /// Creates a new `Endpoint` from a URI such as `http://node1:9200`.
    ///
    /// Only the scheme, host and port are kept. A missing port is filled in
    /// from the scheme's default.
    pub fn new(uri: impl AsRef<str>) -> Result<Self, PoolError> {
        let uri = uri.as_ref();
        let url = Url::parse(uri).map_err(|err| invalid(uri, err.to_string()))?;
        Self::from_url(&url)
    }

    /// Creates a new `Endpoint` from an already parsed [`Url`].
    pub fn from_url(url: &Url) -> Result<Self, PoolError> {
        let host = url
            .host_str()
            .ok_or_else(|| invalid(url.as_str(), "no host"))?
            .to_string();
        let port = url
            .port_or_known_default()
            .ok_or_else(|| invalid(url.as_str(), "no port and no default port for the scheme"))?;
        let scheme = url.scheme().to_string();
        // Rebuild from the parts so that paths, queries and credentials never leak into the key.
        let origin = Url::parse(&format!("{scheme}://{host}:{port}"))
            .map_err(|err| invalid(url.as_str(), err.to_string()))?;
        Ok(Self {
            scheme,
            host,
            port,
            url: origin,
        })
    }

    /// Returns the scheme, e.g. `http`.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the host name or address.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port, defaulted from the scheme if the URI had none.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the base URL requests to this endpoint should be built on.
    pub fn to_url(&self) -> Url {
        self.url.clone()
    }
}

impl From<&Endpoint> for Url {
    fn from(endpoint: &Endpoint) -> Self {
        endpoint.to_url()
    }
}

impl TryFrom<&Url> for Endpoint {
    type Error = PoolError;

    fn try_from(url: &Url) -> Result<Self, Self::Error> {
        Endpoint::from_url(url)
    }
}

impl FromStr for Endpoint {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Endpoint::new(s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

fn invalid(url: &str, reason: impl Into<String>) -> PoolError {
    PoolError::InvalidEndpoint {
        url: url.to_string(),
        reason: reason.into(),
    }
}
