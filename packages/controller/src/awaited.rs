use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

pub type Predicate<T> = Box<dyn Fn(&T) -> bool + Sync + Send>;

#[derive(Debug, PartialEq, Eq)]
pub enum AwaitError {
    Timeout,
    /// The registry went away before the value arrived
    Dropped,
}

/// A registry of `Awaited` values, each of which is associated with a predicate that determines
/// whether a given value matches the awaited value.
///
/// Adding an entry hands out an `AwaitedRef`, which is used to receive the value when it is
/// available. The `AwaitedRef` is automatically removed from the registry when it is dropped.
pub struct AwaitedRegistry<T> {
    next_id: AtomicU64,
    store: Mutex<Vec<Awaited<T>>>,
}

impl<T> Default for AwaitedRegistry<T> {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            store: Mutex::default(),
        }
    }
}

impl<T> AwaitedRegistry<T> {
    /// Adds an entry to the registry with a given predicate, returning an `AwaitedRef` that can be
    /// used to receive the value when it is available.
    pub fn add(
        self: &Arc<Self>,
        predicate: Predicate<T>,
        timeout: Option<Duration>,
    ) -> AwaitedRef<T> {
        let (tx, rx) = oneshot::channel::<T>();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let awaited = Awaited {
            id,
            predicate,
            channel: tx,
        };
        {
            let mut vec = self.store.lock().expect("lock on AwaitedRegistry poisoned");
            vec.push(awaited);
        }
        AwaitedRef::new(id, self.clone(), timeout, rx)
    }

    /// Finds the first entry in the registry that matches the given value, returning the channel
    /// that can be used to receive the value when it is available.
    /// The entry is removed from the registry.
    pub fn take_matching(self: &Arc<Self>, value: &T) -> Option<oneshot::Sender<T>> {
        let mut vec = self.store.lock().expect("lock on AwaitedRegistry poisoned");
        let index = vec.iter().position(|a| (a.predicate)(value));
        index.map(|i| vec.remove(i).channel)
    }

    /// Removes an entry from the registry using the given `AwaitedRef`.
    pub fn remove(self: &Arc<Self>, awaited: &AwaitedRef<T>) {
        let mut vec = self.store.lock().expect("lock on AwaitedRegistry poisoned");
        vec.retain(|a| a.id != awaited.id);
    }
}

pub struct Awaited<T> {
    pub id: u64,
    pub predicate: Predicate<T>,
    pub channel: oneshot::Sender<T>,
}

pub struct AwaitedRef<T> {
    id: u64,
    registry: Arc<AwaitedRegistry<T>>,
    timeout: Option<Duration>,
    channel: Option<oneshot::Receiver<T>>,
}

impl<T> AwaitedRef<T> {
    pub fn new(
        id: u64,
        registry: Arc<AwaitedRegistry<T>>,
        timeout: Option<Duration>,
        channel: oneshot::Receiver<T>,
    ) -> Self {
        Self {
            id,
            registry,
            timeout,
            channel: Some(channel),
        }
    }

    /// Begins awaiting the value
    pub async fn try_await(mut self) -> Result<T, AwaitError> {
        let receiver = self
            .channel
            .take()
            .expect("try_await may only be called once");
        match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, receiver).await {
                Ok(result) => result.map_err(|_| AwaitError::Dropped),
                Err(_) => Err(AwaitError::Timeout),
            },
            None => receiver.await.map_err(|_| AwaitError::Dropped),
        }
    }
}

impl<T> Debug for AwaitedRef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwaitedRef").field("id", &self.id).finish()
    }
}

impl<T> Drop for AwaitedRef<T> {
    fn drop(&mut self) {
        self.registry.remove(self);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_take_matching_resolves_awaiter() {
        let registry: Arc<AwaitedRegistry<u8>> = Arc::new(AwaitedRegistry::default());
        let awaited = registry.add(Box::new(|value| *value == 7), None);

        assert!(registry.take_matching(&3).is_none());
        let channel = registry.take_matching(&7).expect("predicate should match");
        channel.send(7).unwrap();

        assert_eq!(awaited.try_await().await, Ok(7));
    }

    #[tokio::test]
    async fn test_timeout() {
        let registry: Arc<AwaitedRegistry<u8>> = Arc::new(AwaitedRegistry::default());
        let awaited = registry.add(Box::new(|_| true), Some(Duration::from_millis(5)));
        assert_eq!(awaited.try_await().await, Err(AwaitError::Timeout));
    }

    #[test]
    fn test_dropping_the_ref_deregisters() {
        let registry: Arc<AwaitedRegistry<u8>> = Arc::new(AwaitedRegistry::default());
        let awaited = registry.add(Box::new(|_| true), None);
        drop(awaited);
        assert!(registry.take_matching(&1).is_none());
    }
}
