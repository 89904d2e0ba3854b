//! Bounded pool of forwarding clients.
//!
//! The pool is sized once at construction and never grows or shrinks. Each
//! call to [`ClientPool::get_client`] advances a shared round-robin cursor,
//! so concurrent callers spread over every client without taking a lock.

use std::{num::NonZeroUsize, sync::Arc};

#[cfg(not(loom))]
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(loom)]
use loom::sync::atomic::{AtomicUsize, Ordering};
use log::warn;

use crate::{
    config::ForwardConfig,
    error::{ForwardError, TransportError},
    transport::{ClientFactory, TransportClient},
};

/// Name prefix for clients created by the forwarding producer pool.
pub const PRODUCER_NAME_PREFIX: &str = "PID_RMQ_PROXY_PUBLISH_MESSAGE_";

/// Fixed set of transport clients with round-robin selection.
pub struct ClientPool<C> {
    clients: Vec<Arc<C>>,
    cursor: AtomicUsize,
    worker_threads: usize,
}

impl<C: TransportClient> ClientPool<C> {
    /// Build `config.client_num()` clients through `factory`.
    ///
    /// Each client is named `{PRODUCER_NAME_PREFIX}{index}` and receives
    /// `config.worker_threads(available_parallelism)` worker threads.
    ///
    /// # Examples
    ///
    /// ```
    /// use mqforward::{ClientPool, ForwardConfig, config::available_parallelism};
    /// use mqforward_testing::FakeTransport;
    ///
    /// let factory = |name: &str, threads: usize| FakeTransport::new(name, threads);
    /// let pool = ClientPool::build(&ForwardConfig::default(), available_parallelism(), &factory);
    /// assert_eq!(pool.client_num(), 2);
    /// ```
    pub fn build<F>(config: &ForwardConfig, available_parallelism: NonZeroUsize, factory: &F) -> Self
    where
        F: ClientFactory<Client = C> + ?Sized,
    {
        let worker_threads = config.worker_threads(available_parallelism);
        let clients = (0..config.client_num())
            .map(|index| {
                let name = format!("{PRODUCER_NAME_PREFIX}{index}");
                Arc::new(factory.create(&name, worker_threads))
            })
            .collect();
        Self {
            clients,
            cursor: AtomicUsize::new(0),
            worker_threads,
        }
    }

    /// Wrap pre-built clients. An empty vector yields a pool whose
    /// selection always fails with [`ForwardError::PoolExhausted`].
    #[must_use]
    pub fn from_clients(clients: Vec<Arc<C>>, worker_threads: usize) -> Self {
        Self {
            clients,
            cursor: AtomicUsize::new(0),
            worker_threads: worker_threads.max(1),
        }
    }

    /// Select the next client in round-robin order.
    ///
    /// # Errors
    ///
    /// Returns [`ForwardError::PoolExhausted`] if the pool holds no clients.
    pub fn get_client(&self) -> Result<Arc<C>, ForwardError> {
        if self.clients.is_empty() {
            return Err(ForwardError::PoolExhausted);
        }
        // Only uniqueness of the slot matters; no other memory is published.
        let slot = self.cursor.fetch_add(1, Ordering::Relaxed) % self.clients.len();
        Ok(Arc::clone(&self.clients[slot]))
    }

    /// Number of clients held by the pool.
    #[must_use]
    pub fn client_num(&self) -> usize { self.clients.len() }

    /// Worker threads handed to each client on creation.
    #[must_use]
    pub fn worker_threads(&self) -> usize { self.worker_threads }

    /// Create a standalone client through `factory` using the pool's
    /// worker-thread count. The client is not added to the pool.
    pub fn create_client<F>(&self, factory: &F, name: &str) -> C
    where
        F: ClientFactory<Client = C> + ?Sized,
    {
        factory.create(name, self.worker_threads)
    }

    /// Iterate over the pooled clients in slot order.
    pub fn clients(&self) -> impl Iterator<Item = &Arc<C>> { self.clients.iter() }

    /// Run every client's start hook.
    ///
    /// All clients are started even if one fails.
    ///
    /// # Errors
    ///
    /// Returns the first [`TransportError`] reported.
    pub async fn start(&self) -> Result<(), TransportError> {
        let mut first = None;
        for (index, client) in self.clients.iter().enumerate() {
            if let Err(err) = client.start().await {
                warn!("failed to start forwarding client: index={index}, error={err}");
                if first.is_none() {
                    first = Some(err);
                }
            }
        }
        first.map_or(Ok(()), Err)
    }

    /// Run every client's shutdown hook.
    ///
    /// All clients are shut down even if one fails.
    ///
    /// # Errors
    ///
    /// Returns the first [`TransportError`] reported.
    pub async fn shutdown(&self) -> Result<(), TransportError> {
        let mut first = None;
        for (index, client) in self.clients.iter().enumerate() {
            if let Err(err) = client.shutdown().await {
                warn!("failed to shut down forwarding client: index={index}, error={err}");
                if first.is_none() {
                    first = Some(err);
                }
            }
        }
        first.map_or(Ok(()), Err)
    }
}

impl<C> std::fmt::Debug for ClientPool<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientPool")
            .field("client_num", &self.clients.len())
            .field("worker_threads", &self.worker_threads)
            .finish_non_exhaustive()
    }
}
