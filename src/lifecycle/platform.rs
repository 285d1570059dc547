use crate::admin::PasswordGate;
use crate::clients::{ContentClient, EditorialClient};
use crate::config::{AppConfig, BackendConfig};
use crate::framework::{StoreActor, StoreClient};
use crate::gateway::{AuthProvider, ChangeFeed, Gateway, GatewayError, MemoryBackend, RestGateway};
use crate::query::NoteSearch;
use crate::store::{ContentState, EditorialState};
use crate::sync::{BootstrapReport, SyncController};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The backend seams a [`Platform`] runs against.
#[derive(Clone)]
pub struct Backends {
    pub gateway: Arc<dyn Gateway>,
    pub feed: Option<Arc<dyn ChangeFeed>>,
    pub auth: Option<Arc<dyn AuthProvider>>,
}

impl Backends {
    /// All three seams served by one in-process backend.
    pub fn memory(backend: Arc<MemoryBackend>) -> Self {
        Self {
            gateway: backend.clone(),
            feed: Some(backend.clone()),
            auth: Some(backend),
        }
    }

    /// HTTP reads and writes only; collections load once and on refresh.
    pub fn rest(config: &BackendConfig) -> Result<Self, GatewayError> {
        let gateway = RestGateway::new(&config.url, &config.anon_key)?;
        Ok(Self {
            gateway: Arc::new(gateway),
            feed: None,
            auth: None,
        })
    }
}

/// The running data layer: both stores, the command and query surfaces, and sync.
///
/// # Example
///
/// ```ignore
/// let backend = Arc::new(MemoryBackend::new());
/// let backends = Backends::memory(backend);
/// let (platform, report) = Platform::start(&AppConfig::default(), backends).await;
///
/// let note = platform.content.create_note(draft).await?;
/// let hits = platform.search.search(&NoteQuery::text("cardiac")).await?;
///
/// platform.shutdown().await?;
/// ```
pub struct Platform {
    pub content_store: StoreClient<ContentState>,
    pub editorial_store: StoreClient<EditorialState>,
    pub content: ContentClient,
    pub editorial: EditorialClient,
    pub search: NoteSearch,
    pub admin: PasswordGate,
    pub sync: SyncController,
    handles: Vec<JoinHandle<()>>,
}

impl Platform {
    /// Spawns the store actors, wires the clients, then bootstraps and starts syncing.
    pub async fn start(config: &AppConfig, backends: Backends) -> (Self, BootstrapReport) {
        let buffer = config.store.channel_buffer;
        let (content_actor, content_store) = StoreActor::<ContentState>::new(buffer);
        let (editorial_actor, editorial_store) = StoreActor::<EditorialState>::new(buffer);
        let handles = vec![
            tokio::spawn(content_actor.run()),
            tokio::spawn(editorial_actor.run()),
        ];

        let Backends {
            gateway,
            feed,
            auth,
        } = backends;
        let content = ContentClient::new(gateway.clone(), content_store.clone());
        let editorial = EditorialClient::new(gateway.clone(), editorial_store.clone());
        let search = NoteSearch::new(gateway.clone(), content_store.clone(), config.search.limit);
        let admin = PasswordGate::new(
            config.admin.password.clone(),
            config.admin.flag_path.clone(),
        );

        let (sync, report) = SyncController::start(
            gateway,
            feed,
            auth,
            content_store.clone(),
            editorial_store.clone(),
        )
        .await;

        let platform = Self {
            content_store,
            editorial_store,
            content,
            editorial,
            search,
            admin,
            sync,
            handles,
        };
        (platform, report)
    }

    /// Stops sync, closes the stores and waits for their actors to finish.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down platform...");

        // Sync tasks hold store clients; stop them first so the channels can close.
        self.sync.shutdown().await;
        drop(self.content);
        drop(self.editorial);
        drop(self.search);
        drop(self.content_store);
        drop(self.editorial_store);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Store task failed: {:?}", e);
                return Err(format!("Store task failed: {:?}", e));
            }
        }

        info!("Platform shutdown complete.");
        Ok(())
    }
}
