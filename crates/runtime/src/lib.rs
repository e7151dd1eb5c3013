use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::info;

use hireloop_api::ApiClient;
use hireloop_config::ClientConfig;
use hireloop_realtime::{
    ConnectionManager, Connector, Dispatcher, Effect, MessageEmitter, Stores, WsConnector,
};
use hireloop_session::{FileStorage, MemoryStorage, Session, SessionStorage};

pub mod debounce;
pub mod scope;

pub use debounce::Debouncer;
pub use scope::{Scope, ScopeHandle};

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::TRACE)
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Everything a client process shares: one session, one REST client, one
/// channel and the state containers it feeds.
pub struct ClientServices {
    pub config: ClientConfig,
    pub session: Session,
    pub api: ApiClient,
    pub stores: Stores,
    pub connection: ConnectionManager,
    effects: Option<mpsc::UnboundedReceiver<Effect>>,
}

impl ClientServices {
    pub fn initialise(config: &ClientConfig) -> Result<Self> {
        let connector = Arc::new(WsConnector::new(config.realtime.url.clone()));
        Self::with_connector(config, connector)
    }

    pub fn with_connector(config: &ClientConfig, connector: Arc<dyn Connector>) -> Result<Self> {
        let storage: Arc<dyn SessionStorage> = match config.auth.token_store_path.as_deref() {
            Some(path) => Arc::new(
                FileStorage::open(path)
                    .with_context(|| format!("failed to open token store at {path}"))?,
            ),
            None => Arc::new(MemoryStorage::default()),
        };

        let session = Session::restore(storage);
        let api = ApiClient::new(&config.api, session.context())
            .context("failed to build api client")?;

        let stores = Stores::new();
        let (dispatcher, effects) = Dispatcher::new(session.clone(), stores.clone());
        let connection = ConnectionManager::new(connector, dispatcher);

        info!(
            api = %config.api.base_url,
            realtime = %config.realtime.url,
            signed_in = session.current().is_some(),
            "client services ready"
        );

        Ok(Self {
            config: config.clone(),
            session,
            api,
            stores,
            connection,
            effects: Some(effects),
        })
    }

    /// Redirects requested by the dispatcher. Can be taken once.
    pub fn take_effects(&mut self) -> Option<mpsc::UnboundedReceiver<Effect>> {
        self.effects.take()
    }

    pub fn emitter(&self) -> MessageEmitter {
        MessageEmitter::new(
            self.connection.clone(),
            self.session.context(),
            self.stores.chat.clone(),
        )
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
