//! Client Pool
//!
//! A fixed-size pool of independent clients. Each pooled client owns its
//! own connection and state machine, so concurrent callers never share a
//! decode buffer; checkout blocks until a client is free.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::client::Client;
use crate::config::Config;
use crate::error::{ClientError, Result};

#[derive(Debug)]
struct PoolInner {
    clients: Mutex<VecDeque<Client>>,
    available: Condvar,
}

/// A pool of blocking clients for one cluster
///
/// Clients are created disconnected and connect lazily on first checkout;
/// a client checked back in keeps its connection for the next caller.
#[derive(Debug, Clone)]
pub struct ClientPool {
    inner: Arc<PoolInner>,
}

impl ClientPool {
    /// Create a pool of `size` clients sharing one config
    pub fn new(config: Config, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(ClientError::Validation(
                "pool size must be at least 1".to_string(),
            ));
        }
        config.validate()?;

        let mut clients = VecDeque::with_capacity(size);
        for _ in 0..size {
            clients.push_back(Client::new(config.clone())?);
        }

        Ok(Self {
            inner: Arc::new(PoolInner {
                clients: Mutex::new(clients),
                available: Condvar::new(),
            }),
        })
    }

    /// Check out a client, blocking until one is free, and connect it if
    /// it is not connected yet
    pub fn checkout(&self) -> Result<PooledClient> {
        let mut client = {
            let mut clients = self.inner.clients.lock();
            loop {
                if let Some(client) = clients.pop_front() {
                    break client;
                }
                self.inner.available.wait(&mut clients);
            }
        };

        if let Err(e) = client.ensure_connected() {
            // Return the client before failing so the slot is not leaked
            self.checkin(client);
            return Err(e);
        }

        Ok(PooledClient {
            inner: Arc::clone(&self.inner),
            client: Some(client),
        })
    }

    fn checkin(&self, client: Client) {
        self.inner.clients.lock().push_back(client);
        self.inner.available.notify_one();
    }
}

/// A checked-out client; returns to the pool on drop
pub struct PooledClient {
    inner: Arc<PoolInner>,
    client: Option<Client>,
}

impl std::ops::Deref for PooledClient {
    type Target = Client;

    fn deref(&self) -> &Client {
        self.client.as_ref().expect("client present until drop")
    }
}

impl std::ops::DerefMut for PooledClient {
    fn deref_mut(&mut self) -> &mut Client {
        self.client.as_mut().expect("client present until drop")
    }
}

impl Drop for PooledClient {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            self.inner.clients.lock().push_back(client);
            self.inner.available.notify_one();
        }
    }
}
