use crate::definitions::NodeId;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub struct SecurityManagerOptions {
    pub own_node_id: NodeId,
    pub network_key: Vec<u8>,
}

/// Shared state of the S0 security manager. The encryption primitives
/// themselves live with the transport; the controller core only needs the
/// network key and the free-nonce bookkeeping for the key exchange.
pub struct SecurityManagerStorage {
    own_node_id: NodeId,
    network_key: Vec<u8>,
    free_nonces: Mutex<BTreeMap<NodeId, Vec<u8>>>,
}

impl SecurityManagerStorage {
    pub fn new(options: SecurityManagerOptions) -> Self {
        Self {
            own_node_id: options.own_node_id,
            network_key: options.network_key,
            free_nonces: Mutex::default(),
        }
    }
}

#[derive(Clone)]
pub struct SecurityManager {
    storage: Arc<SecurityManagerStorage>,
}

impl SecurityManager {
    pub fn new(storage: Arc<SecurityManagerStorage>) -> Self {
        Self { storage }
    }

    pub fn own_node_id(&self) -> NodeId {
        self.storage.own_node_id
    }

    pub fn network_key(&self) -> &[u8] {
        &self.storage.network_key
    }

    pub fn store_free_nonce(&self, node_id: NodeId, nonce: Vec<u8>) {
        let mut nonces = self
            .storage
            .free_nonces
            .lock()
            .expect("lock on free nonces poisoned");
        nonces.insert(node_id, nonce);
    }

    pub fn take_free_nonce(&self, node_id: NodeId) -> Option<Vec<u8>> {
        let mut nonces = self
            .storage
            .free_nonces
            .lock()
            .expect("lock on free nonces poisoned");
        nonces.remove(&node_id)
    }
}
