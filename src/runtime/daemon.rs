use super::config::DaemonConfig;
use crate::directory::{Directory, ResourceTree};
use crate::framework::{KindRegistry, Resource, ResourceKind, ResourceResult};
use crate::pipeline;
use crate::protocol::{CommandHandler, FrontEnd};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Name of the root resource every URI is resolved from.
pub const SESSION: &str = "session";

/// The runtime orchestrator for the resource daemon.
///
/// `Daemon` is responsible for:
/// - **Kind registration**: Building the kind registry the tree is made of
/// - **Tree wiring**: Creating the `session` root and its `pipelines` collection
/// - **Lifecycle**: Starting the front end and shutting it down
///
/// # Example
///
/// ```ignore
/// let mut daemon = Daemon::new(DaemonConfig::default())?;
/// let addr = daemon.start().await?;
/// // ... serve commands ...
/// daemon.shutdown().await;
/// ```
pub struct Daemon {
    config: DaemonConfig,
    registry: Arc<KindRegistry>,
    tree: Arc<ResourceTree>,
    front_end: FrontEnd,
}

impl Daemon {
    /// Builds the resource tree and a stopped front end.
    pub fn new(config: DaemonConfig) -> ResourceResult<Self> {
        let registry = Arc::new(KindRegistry::new());
        let collection = pipeline::register(&registry)?;

        let session_kind = ResourceKind::builder(SESSION).composite().build();
        registry.register(Arc::clone(&session_kind))?;

        let session = Arc::new(Resource::new(SESSION, session_kind));
        session.add_child(Arc::new(Resource::new(pipeline::COLLECTION_KIND, collection)))?;

        let tree = Arc::new(ResourceTree::new(session));
        let directory: Arc<dyn Directory> = tree.clone();
        let front_end = FrontEnd::new(Arc::new(CommandHandler::new(directory)))
            .with_bind_address(config.bind_address)
            .with_max_command_len(config.max_command_len);

        info!(kinds = ?registry.names(), "Daemon initialized");
        Ok(Self {
            config,
            registry,
            tree,
            front_end,
        })
    }

    pub fn config(&self) -> &DaemonConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<KindRegistry> {
        &self.registry
    }

    pub fn root(&self) -> &Arc<Resource> {
        self.tree.root()
    }

    pub fn front_end(&self) -> &FrontEnd {
        &self.front_end
    }

    /// Starts serving on the configured port.
    pub async fn start(&mut self) -> ResourceResult<SocketAddr> {
        self.start_on(self.config.port).await
    }

    /// Starts serving on `port`, replacing any running listener.
    pub async fn start_on(&mut self, port: u16) -> ResourceResult<SocketAddr> {
        self.front_end.start(port).await
    }

    /// Stops the front end and releases the tree.
    pub async fn shutdown(mut self) {
        info!("Shutting down daemon...");
        self.front_end.stop().await;
        info!(resources = self.root().children().len(), "Daemon shutdown complete.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::FrontEndState;

    #[test]
    fn test_tree_layout() {
        let daemon = Daemon::new(DaemonConfig::default()).unwrap();
        assert_eq!(daemon.root().name(), SESSION);
        assert_eq!(daemon.root().children(), vec![pipeline::COLLECTION_KIND.to_string()]);
        assert!(daemon.registry().get(pipeline::PIPELINE_KIND).is_some());
        assert_eq!(daemon.front_end().state(), FrontEndState::Stopped);
    }

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let mut daemon = Daemon::new(DaemonConfig::default()).unwrap();
        let addr = daemon.start_on(0).await.unwrap();
        assert_eq!(daemon.front_end().local_addr(), Some(addr));
        daemon.shutdown().await;
        assert!(tokio::net::TcpStream::connect(addr).await.is_err());
    }
}
