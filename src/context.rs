//! Explicit client context shared by the lifecycle components.

use std::sync::Arc;

use crate::config::schema::ClientConfig;
use crate::error::Result;
use crate::network::Network;
use crate::rpc::{AccountResolver, JsonRpcClient, RpcAccountResolver, RpcEndpoint};

/// Endpoint, network and account resolver passed into each component.
#[derive(Clone)]
pub struct ClientContext {
    pub endpoint: Arc<dyn RpcEndpoint>,
    pub network: Network,
    pub accounts: Arc<dyn AccountResolver>,
}

impl ClientContext {
    pub fn new(
        endpoint: Arc<dyn RpcEndpoint>,
        network: Network,
        accounts: Arc<dyn AccountResolver>,
    ) -> Self {
        Self {
            endpoint,
            network,
            accounts,
        }
    }

    /// Context whose accounts are read through the same endpoint.
    pub fn with_endpoint(endpoint: Arc<dyn RpcEndpoint>, network: Network) -> Self {
        let accounts = Arc::new(RpcAccountResolver::new(endpoint.clone()));
        Self::new(endpoint, network, accounts)
    }

    /// Build a JSON-RPC backed context from configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let client = JsonRpcClient::new(&config.rpc)?;
        Ok(Self::with_endpoint(Arc::new(client), config.network.resolve()))
    }

    pub fn network_id(&self) -> crate::xdr::Hash {
        self.network.network_id()
    }
}

impl std::fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientContext")
            .field("network", &self.network.name)
            .finish_non_exhaustive()
    }
}
