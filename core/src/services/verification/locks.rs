//! Keyed async mutex serializing sends per (email, purpose)

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::entities::VerificationPurpose;

pub(crate) type SendKey = (String, VerificationPurpose);

type KeyMutex = Arc<tokio::sync::Mutex<()>>;

/// One async mutex per key, dropped again once nobody holds or waits on it
#[derive(Default)]
pub(crate) struct SendLocks {
    locks: Mutex<HashMap<SendKey, KeyMutex>>,
}

impl SendLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Lease on the mutex for `key`, creating it if needed
    ///
    /// The entry is pruned when the last lease drops, including when the
    /// owning future is cancelled.
    pub(crate) fn lease(&self, key: SendKey) -> SendLease<'_> {
        let handle = self
            .map()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone();
        SendLease {
            locks: self,
            key,
            handle,
        }
    }

    fn map(&self) -> MutexGuard<'_, HashMap<SendKey, KeyMutex>> {
        self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.map().len()
    }
}

/// Reference to one key's mutex, held for the duration of a send
pub(crate) struct SendLease<'a> {
    locks: &'a SendLocks,
    key: SendKey,
    handle: KeyMutex,
}

impl SendLease<'_> {
    pub(crate) async fn lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.handle.lock().await
    }
}

impl Drop for SendLease<'_> {
    fn drop(&mut self) {
        let mut map = self.locks.map();
        // Clones are only taken under the map lock, so 2 means map + this lease
        let idle = map
            .get(&self.key)
            .map(|current| Arc::ptr_eq(current, &self.handle) && Arc::strong_count(current) <= 2)
            .unwrap_or(false);
        if idle {
            map.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(email: &str) -> SendKey {
        (email.to_string(), VerificationPurpose::Register)
    }

    #[tokio::test]
    async fn test_entry_pruned_after_last_lease() {
        let locks = SendLocks::new();
        {
            let first = locks.lease(key("a@example.com"));
            let second = locks.lease(key("a@example.com"));
            assert_eq!(locks.len(), 1);
            drop(first);
            assert_eq!(locks.len(), 1);
            let _guard = second.lock().await;
        }
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_waiter_releases_entry() {
        let locks = SendLocks::new();
        let holder = locks.lease(key("b@example.com"));
        let _held = holder.lock().await;

        let waiter = async {
            let lease = locks.lease(key("b@example.com"));
            let _guard = lease.lock().await;
        };
        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(5), waiter).await;
        assert!(timed_out.is_err());
        assert_eq!(locks.len(), 1);

        drop(_held);
        drop(holder);
        assert_eq!(locks.len(), 0);
    }
}
