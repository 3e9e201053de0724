use crate::HealNodeStatus;
use futures::channel::mpsc;
use std::collections::BTreeMap;
use std::sync::RwLock;
use zwnet_core::definitions::NodeId;

/// Everything observable that happens in the controller core
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    InclusionStarted { secure: bool },
    InclusionStopped,
    InclusionFailed,
    ExclusionStarted,
    ExclusionStopped,
    ExclusionFailed,
    NodeAdded { node_id: NodeId },
    NodeRemoved { node_id: NodeId, replaced: bool },
    HealNetworkProgress(BTreeMap<NodeId, HealNodeStatus>),
    HealNetworkDone(BTreeMap<NodeId, HealNodeStatus>),
}

/// Fans controller events out to all subscribers. Emission is synchronous,
/// so every subscriber observes events in emission order.
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<Vec<mpsc::UnboundedSender<ControllerEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ControllerEvent> {
        let (tx, rx) = mpsc::unbounded();
        self.listeners
            .write()
            .expect("lock on event listeners poisoned")
            .push(tx);
        rx
    }

    pub fn emit(&self, event: ControllerEvent) {
        let mut listeners = self
            .listeners
            .write()
            .expect("lock on event listeners poisoned");
        // Dropped receivers are cleaned out on the way
        listeners.retain(|tx| tx.unbounded_send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_all_subscribers_observe_events_in_order() {
        let bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.emit(ControllerEvent::InclusionStarted { secure: true });
        bus.emit(ControllerEvent::InclusionStopped);

        for receiver in [&mut first, &mut second] {
            assert_eq!(
                receiver.try_next().unwrap(),
                Some(ControllerEvent::InclusionStarted { secure: true })
            );
            assert_eq!(
                receiver.try_next().unwrap(),
                Some(ControllerEvent::InclusionStopped)
            );
        }
    }

    #[test]
    fn test_dropped_subscribers_are_cleaned_up() {
        let bus = EventBus::new();
        let receiver = bus.subscribe();
        drop(receiver);

        // Must not fail or leak the closed sender
        bus.emit(ControllerEvent::ExclusionStarted);
        assert!(
            bus.listeners
                .read()
                .expect("lock on event listeners poisoned")
                .is_empty()
        );
    }
}
