use crate::core::domain::{
    error::NcpaResult,
    value_object::{NcpaHost, NcpaPort, NcpaToken, NcpaUrl},
};

/// Everything needed to address one agent.
#[derive(Debug, Clone)]
pub struct NcpaConnection {
    ncpa_host: NcpaHost,
    ncpa_port: NcpaPort,
    ncpa_token: NcpaToken,
    ncpa_secure: bool,
    ncpa_url: NcpaUrl,
}

impl NcpaConnection {
    pub fn new(
        ncpa_host: NcpaHost,
        ncpa_port: NcpaPort,
        ncpa_token: NcpaToken,
        ncpa_secure: bool,
    ) -> NcpaResult<Self> {
        let ncpa_url = NcpaUrl::new(&ncpa_host, ncpa_port, ncpa_secure)?;
        Ok(Self {
            ncpa_host,
            ncpa_port,
            ncpa_token,
            ncpa_secure,
            ncpa_url,
        })
    }

    pub fn ncpa_host(&self) -> &NcpaHost {
        &self.ncpa_host
    }

    pub fn ncpa_port(&self) -> NcpaPort {
        self.ncpa_port
    }

    pub fn ncpa_token(&self) -> &NcpaToken {
        &self.ncpa_token
    }

    pub fn is_connection_secure(&self) -> bool {
        self.ncpa_secure
    }

    /// The API root URL.
    pub fn ncpa_url(&self) -> &NcpaUrl {
        &self.ncpa_url
    }

    /// The authenticated URL of an endpoint below the API root.
    pub fn endpoint_url<K, V>(&self, endpoint: &str, params: &[(K, V)]) -> NcpaResult<NcpaUrl>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.ncpa_url
            .endpoint(endpoint, self.ncpa_token.as_str(), params)
    }
}
