//! HTTP server configuration object.

use std::net::SocketAddr;

/// Builder-style configuration for creating the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    bind_addr: SocketAddr,
    database_url: Option<String>,
    pool_size: u32,
}

impl ServerConfig {
    /// Construct a configuration binding the given address, with no database
    /// configured and a pool size of 10.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            database_url: None,
            pool_size: 10,
        }
    }

    /// Attach a PostgreSQL connection URL.
    ///
    /// When absent, the server falls back to in-memory storage adapters.
    #[must_use]
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Set the maximum number of pooled database connections.
    #[must_use]
    pub fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Return the configured database URL, if any.
    #[must_use]
    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    /// Return the configured pool size.
    #[must_use]
    pub fn pool_size(&self) -> u32 {
        self.pool_size
    }
}
