//! Checksum deduplication primitives.

use std::sync::Arc;

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tokio::sync::{Mutex, OwnedMutexGuard};

use mediavault_entity::asset::AssetScope;

/// Compute the SHA-256 content digest of a byte buffer, hex-encoded.
///
/// Deterministic over the exact byte sequence; file name and declared
/// content type never participate. Hash collisions are an accepted risk
/// here: the digest drives dedup convenience, not security.
pub fn content_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

type ScopeKey = (String, Option<String>, Option<String>);

/// Per-(digest, scope) critical sections for the dedup check.
///
/// The lookup-then-insert in the ingestion path must not race against
/// itself for the same content in the same scope, or two non-duplicate
/// rows could be created. The catalog's uniqueness constraint is the
/// backstop; this keeps the common path conflict-free.
///
/// Entries are evicted when the last guard for a key drops, so the map
/// never grows with the number of distinct digests seen over the
/// process lifetime, only with the number currently in flight.
#[derive(Debug, Default)]
pub struct ScopeLocks {
    locks: DashMap<ScopeKey, Arc<Mutex<()>>>,
}

impl ScopeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the critical section for one (digest, scope) key.
    ///
    /// The returned guard holds the key exclusively until dropped.
    pub async fn acquire(&self, digest: &str, scope: &AssetScope) -> ScopeGuard<'_> {
        let key: ScopeKey = (
            digest.to_string(),
            scope.client_id.clone(),
            scope.project_code.clone(),
        );
        let lock = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let permit = lock.lock_owned().await;
        ScopeGuard {
            locks: self,
            key,
            permit: Some(permit),
        }
    }

    /// Number of keys currently tracked (in-flight or contended).
    pub fn tracked_keys(&self) -> usize {
        self.locks.len()
    }
}

/// Exclusive hold on one (digest, scope) key. Dropping releases the
/// mutex and evicts the map entry once no other task holds or awaits it.
#[derive(Debug)]
pub struct ScopeGuard<'a> {
    locks: &'a ScopeLocks,
    key: ScopeKey,
    permit: Option<OwnedMutexGuard<()>>,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.permit.take();
        // The map's clone is the only remaining handle exactly when no
        // other guard or waiter exists; remove_if holds the shard lock
        // while checking, so a concurrent acquire cannot slip between
        // the count check and the removal.
        self.locks
            .locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic_and_content_only() {
        let a = content_digest(b"hello");
        let b = content_digest(b"hello");
        let c = content_digest(b"hello!");
        assert_eq!(a, b);
        assert_ne!(a, c);
        // SHA-256 hex is 64 chars.
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn known_vector() {
        assert_eq!(
            content_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[tokio::test]
    async fn same_key_serializes() {
        let locks = Arc::new(ScopeLocks::new());
        let scope = AssetScope::new(Some("acme".into()), None);

        let guard = locks.acquire("aa", &scope).await;
        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks
                    .acquire("aa", &AssetScope::new(Some("acme".into()), None))
                    .await;
            })
        };

        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
        assert_eq!(locks.tracked_keys(), 0);
    }

    #[tokio::test]
    async fn released_keys_are_evicted() {
        let locks = ScopeLocks::new();
        let scope = AssetScope::new(None, None);

        for i in 0..100 {
            let digest = format!("{i:064x}");
            let guard = locks.acquire(&digest, &scope).await;
            assert_eq!(locks.tracked_keys(), 1);
            drop(guard);
        }

        assert_eq!(locks.tracked_keys(), 0);
    }

    #[tokio::test]
    async fn scope_values_containing_separators_do_not_collide() {
        let locks = ScopeLocks::new();

        let a = locks
            .acquire("aa", &AssetScope::new(Some("a|b".into()), Some("c".into())))
            .await;
        // Distinct scope, so this acquire must not block behind `a`.
        let b = locks
            .acquire("aa", &AssetScope::new(Some("a".into()), Some("b|c".into())))
            .await;

        assert_eq!(locks.tracked_keys(), 2);
        drop(a);
        drop(b);
        assert_eq!(locks.tracked_keys(), 0);
    }
}
