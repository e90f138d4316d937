// Database Connection Management
//
// A single shared tokio-postgres client, reconnected by a supervisor task when
// the driver's connection future ends.
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use native_tls::TlsConnector;
use parking_lot::RwLock;
use postgres_native_tls::MakeTlsConnector;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls};

use crate::config::DatabaseConfig;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database is not connected")]
    NotConnected,

    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("tls setup failed: {0}")]
    Tls(#[from] native_tls::Error),
}

impl DbError {
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DbError::Postgres(e) => e.code() == Some(&SqlState::UNIQUE_VIOLATION),
            _ => false,
        }
    }

    /// The session went away underneath the caller (closed socket or killed backend)
    pub fn is_connection_lost(&self) -> bool {
        match self {
            DbError::NotConnected => true,
            DbError::Postgres(e) => e.is_closed() || e.code() == Some(&SqlState::ADMIN_SHUTDOWN),
            DbError::Tls(_) => false,
        }
    }
}

/// How many times (and how often) to re-attempt a failing operation.
///
/// `max_retries` counts retries after the first attempt; `None` never gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: Option<u32>,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn bounded(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries: Some(max_retries), delay }
    }

    pub fn unbounded(delay: Duration) -> Self {
        Self { max_retries: None, delay }
    }

    fn exhausted(&self, retries: u32) -> bool {
        self.max_retries.is_some_and(|max| retries >= max)
    }
}

/// Run `op` until it succeeds or `policy` runs out, sleeping a fixed delay
/// between attempts. The last error is returned on exhaustion.
pub async fn retry<T, E, F, Fut>(policy: RetryPolicy, label: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut retries = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if policy.exhausted(retries) => {
                tracing::error!("{} failed after {} retries: {}", label, retries, e);
                return Err(e);
            }
            Err(e) => {
                retries += 1;
                tracing::warn!("{} failed ({}), retry #{} in {:?}", label, e, retries, policy.delay);
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}

type ConnectionTask = JoinHandle<Result<(), tokio_postgres::Error>>;

/// Database connection wrapper
pub struct DatabaseConnection {
    config: DatabaseConfig,
    client: RwLock<Option<Arc<Client>>>,
}

impl DatabaseConnection {
    /// Build an unconnected handle; call [`DatabaseConnection::connect`] before use.
    pub fn new(config: DatabaseConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            client: RwLock::new(None),
        })
    }

    /// Establish the connection, retrying per the configured connect policy,
    /// then hand the driver connection to a background supervisor.
    pub async fn connect(self: &Arc<Self>) -> Result<(), DbError> {
        tracing::info!("🔌 Connecting to database: {}", self.address());

        let (client, connection) =
            retry(self.config.connect_policy, "Database connection", || self.dial()).await?;
        self.install(client);

        tracing::info!("✅ Connected to database [{}]", self.address());

        let db = Arc::clone(self);
        tokio::spawn(async move { db.supervise(connection).await });
        Ok(())
    }

    /// True while a client is installed and its connection is still open
    pub fn is_connected(&self) -> bool {
        self.client.read().as_ref().is_some_and(|c| !c.is_closed())
    }

    /// Get the live client for issuing statements
    pub fn client(&self) -> Result<Arc<Client>, DbError> {
        match self.client.read().as_ref() {
            Some(client) if !client.is_closed() => Ok(Arc::clone(client)),
            _ => Err(DbError::NotConnected),
        }
    }

    fn address(&self) -> String {
        format!("{}:{}/{}", self.config.host, self.config.port, self.config.dbname)
    }

    fn install(&self, client: Client) {
        *self.client.write() = Some(Arc::new(client));
    }

    async fn dial(&self) -> Result<(Client, ConnectionTask), DbError> {
        let mut pg_config = tokio_postgres::Config::new();
        pg_config
            .host(&self.config.host)
            .port(self.config.port)
            .user(&self.config.user)
            .password(&self.config.password)
            .dbname(&self.config.dbname)
            .connect_timeout(Duration::from_secs(10));

        if self.config.ssl {
            let tls = MakeTlsConnector::new(TlsConnector::builder().build()?);
            let (client, connection) = pg_config.connect(tls).await?;
            Ok((client, tokio::spawn(connection)))
        } else {
            let (client, connection) = pg_config.connect(NoTls).await?;
            Ok((client, tokio::spawn(connection)))
        }
    }

    /// Wait for the driver connection to end, then redial per the reconnect
    /// policy. Stops (leaving the handle disconnected) once the policy is spent.
    async fn supervise(self: Arc<Self>, mut connection: ConnectionTask) {
        loop {
            match connection.await {
                Ok(Ok(())) => tracing::warn!("Database connection closed by server"),
                Ok(Err(e)) => tracing::error!("Database connection lost: {}", e),
                Err(e) => tracing::error!("Database connection task aborted: {}", e),
            }
            self.client.write().take();

            match retry(self.config.reconnect_policy, "Database reconnection", || self.dial()).await {
                Ok((client, next)) => {
                    self.install(client);
                    tracing::info!("✅ Reconnected to database [{}]", self.address());
                    connection = next;
                }
                Err(e) => {
                    tracing::error!(
                        "Giving up on database [{}]: {}. Requests will fail until restart",
                        self.address(),
                        e
                    );
                    return;
                }
            }
        }
    }
}
