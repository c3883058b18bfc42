//! Registry of live connections and their outbound handles.

use std::collections::HashMap;

use collab_core::ConnectionId;
use thiserror::Error;

use crate::types::{Frame, OutboundTx};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("connection {0} is already registered")]
    Duplicate(ConnectionId),

    #[error("connection {0} is not registered")]
    Unknown(ConnectionId),
}

/// Connected clients, keyed by id.
///
/// Owned by the state task alone, so registration, removal and fan-out
/// never interleave.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, OutboundTx>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        ConnectionRegistry::default()
    }

    pub fn register(&mut self, id: ConnectionId, outbound: OutboundTx) -> Result<(), RegistryError> {
        if self.connections.contains_key(&id) {
            return Err(RegistryError::Duplicate(id));
        }
        self.connections.insert(id, outbound);
        Ok(())
    }

    /// Remove `id`, handing back its outbound handle.
    pub fn unregister(&mut self, id: &ConnectionId) -> Result<OutboundTx, RegistryError> {
        self.connections
            .remove(id)
            .ok_or(RegistryError::Unknown(*id))
    }

    /// Queue `frame` for every registered connection.
    ///
    /// Never waits for delivery. Returns the ids whose handle is closed;
    /// one dead connection does not stop delivery to the rest.
    pub fn broadcast(&self, frame: &Frame) -> Vec<ConnectionId> {
        self.connections
            .iter()
            .filter_map(|(id, tx)| tx.send(frame.clone()).err().map(|_| *id))
            .collect()
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = ConnectionRegistry::new();
        let id = ConnectionId::generate();
        let (tx, _rx) = mpsc::unbounded_channel();

        registry.register(id, tx.clone()).unwrap();
        assert_eq!(registry.register(id, tx), Err(RegistryError::Duplicate(id)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_unknown_fails() {
        let mut registry = ConnectionRegistry::new();
        let id = ConnectionId::generate();
        assert_eq!(registry.unregister(&id).unwrap_err(), RegistryError::Unknown(id));
    }

    #[test]
    fn broadcast_reaches_every_live_connection_and_reports_dead_ones() {
        let mut registry = ConnectionRegistry::new();
        let (a, b, dead) = (
            ConnectionId::generate(),
            ConnectionId::generate(),
            ConnectionId::generate(),
        );
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let (tx_dead, rx_dead) = mpsc::unbounded_channel();
        drop(rx_dead);

        registry.register(a, tx_a).unwrap();
        registry.register(dead, tx_dead).unwrap();
        registry.register(b, tx_b).unwrap();

        let frame: Frame = "hello".into();
        let failed = registry.broadcast(&frame);

        assert_eq!(failed, vec![dead]);
        assert_eq!(rx_a.try_recv().unwrap().as_ref(), "hello");
        assert_eq!(rx_b.try_recv().unwrap().as_ref(), "hello");
    }

    #[test]
    fn unregistered_connection_gets_nothing() {
        let mut registry = ConnectionRegistry::new();
        let id = ConnectionId::generate();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register(id, tx).unwrap();

        // Keep the handle alive so a send would succeed if attempted.
        let _handle = registry.unregister(&id).unwrap();
        registry.broadcast(&Frame::from("late"));

        assert!(rx.try_recv().is_err());
    }
}
