//! Configuration for the QuorumKV client
//!
//! Centralized configuration with sensible defaults.

/// Main configuration for a client instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Cluster Identification
    // -------------------------------------------------------------------------
    /// Cluster identifier, sent in the connection prologue and the hello
    /// handshake; the server rejects mismatches
    pub cluster_id: String,

    /// Client identifier, sent in the hello handshake (shows up in server
    /// logs; useful to tell callers apart)
    pub client_id: String,

    /// Node addresses to try, in order, when connecting
    pub nodes: Vec<String>,

    // -------------------------------------------------------------------------
    // Transport Configuration
    // -------------------------------------------------------------------------
    /// TCP connect timeout (milliseconds, 0 = OS default)
    pub connect_timeout_ms: u64,

    /// Socket read timeout (milliseconds, 0 = no timeout)
    pub read_timeout_ms: u64,

    /// Socket write timeout (milliseconds, 0 = no timeout)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cluster_id: String::new(),
            client_id: "quorumkv-client".to_string(),
            nodes: Vec::new(),
            connect_timeout_ms: 5000,
            read_timeout_ms: 10000,
            write_timeout_ms: 10000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the config is usable for connecting
    pub fn validate(&self) -> crate::Result<()> {
        if self.cluster_id.is_empty() {
            return Err(crate::ClientError::Validation(
                "cluster_id must not be empty".to_string(),
            ));
        }
        if self.nodes.is_empty() {
            return Err(crate::ClientError::Validation(
                "at least one node address is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the cluster identifier
    pub fn cluster_id(mut self, id: impl Into<String>) -> Self {
        self.config.cluster_id = id.into();
        self
    }

    /// Set the client identifier
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.config.client_id = id.into();
        self
    }

    /// Add a node address to try when connecting
    pub fn node(mut self, addr: impl Into<String>) -> Self {
        self.config.nodes.push(addr.into());
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the socket read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the socket write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
