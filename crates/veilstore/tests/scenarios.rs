//! End-to-end scenarios against both storage backends.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use veilstore::core::{Notification, RecordFields, RecordId, RATING_SENTINEL};
use veilstore::gateway::{Gateway, GatewayConfig, LocalGateway};
use veilstore::store::RecordBackend;
use veilstore::Registry;
use veilstore_testkit::{
    acme_fields, memory_registry, memory_registry_with, multi_party_fixtures, sqlite_registry,
    wait_for_decrypted, TestParty,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Create Acme as Alice, read it back, decrypt as Alice, get refused as Bob.
async fn acme_lifecycle<B: RecordBackend>(registry: &Registry<B, LocalGateway>) -> Result<()> {
    let alice = TestParty::alice().identity();
    let bob = TestParty::bob().identity();
    let mut rx = registry.subscribe();

    let id = registry.create(acme_fields(), 7, false, alice).await?;
    assert_eq!(id, RecordId(1));

    let view = registry.read(id).await?;
    assert_eq!(view.rating, RATING_SENTINEL);
    assert_eq!(view.owner, alice);
    assert_eq!(view.contact, "a@x");

    let request = registry.request_decryption(id, &alice).await?;
    assert_eq!(wait_for_decrypted(&mut rx, request).await, Some(7));

    let err = registry.request_decryption(id, &bob).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(registry.coordinator().pending().is_empty());

    Ok(())
}

/// Out-of-bound update is rejected and the handle stays put.
async fn rejected_update<B: RecordBackend>(registry: &Registry<B, LocalGateway>) -> Result<()> {
    let alice = TestParty::alice().identity();
    let id = registry.create(acme_fields(), 7, false, alice).await?;
    let before = registry.handle_of(id, &alice).await?;

    let err = registry.update_rating(id, 11, &alice).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(registry.handle_of(id, &alice).await?, before);

    Ok(())
}

/// The flag stays hidden from non-owners.
async fn hidden_visibility<B: RecordBackend>(registry: &Registry<B, LocalGateway>) -> Result<()> {
    let alice = TestParty::alice().identity();
    let bob = TestParty::bob().identity();
    let id = registry.create(acme_fields(), 7, false, alice).await?;

    registry.update_visibility(id, true, &alice).await?;
    assert!(!registry.read_visibility(id, &bob).await?);
    assert!(registry.read_visibility(id, &alice).await?);

    Ok(())
}

#[tokio::test]
async fn acme_lifecycle_memory() -> Result<()> {
    init_tracing();
    acme_lifecycle(&memory_registry()).await
}

#[tokio::test]
async fn acme_lifecycle_sqlite() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    acme_lifecycle(&sqlite_registry(dir.path().join("acme.db"))?).await
}

#[tokio::test]
async fn rejected_update_memory() -> Result<()> {
    rejected_update(&memory_registry()).await
}

#[tokio::test]
async fn rejected_update_sqlite() -> Result<()> {
    let dir = tempfile::tempdir()?;
    rejected_update(&sqlite_registry(dir.path().join("update.db"))?).await
}

#[tokio::test]
async fn hidden_visibility_memory() -> Result<()> {
    hidden_visibility(&memory_registry()).await
}

#[tokio::test]
async fn hidden_visibility_sqlite() -> Result<()> {
    let dir = tempfile::tempdir()?;
    hidden_visibility(&sqlite_registry(dir.path().join("visibility.db"))?).await
}

#[tokio::test]
async fn old_handle_cannot_reveal_new_rating() -> Result<()> {
    init_tracing();
    let registry = memory_registry();
    let alice = TestParty::alice().identity();
    let mut rx = registry.subscribe();

    let id = registry.create(acme_fields(), 3, false, alice).await?;
    let old = registry.handle_of(id, &alice).await?;

    registry.update_rating(id, 9, &alice).await?;
    let new = registry.handle_of(id, &alice).await?;
    assert_ne!(old, new);

    // Unsealing the abandoned handle still yields the old value only.
    let (tx, done) = tokio::sync::oneshot::channel();
    registry.gateway().request_unseal(&old, &alice, tx).await?;
    let stale = tokio::time::timeout(Duration::from_secs(5), done).await??;
    assert_eq!(stale.plaintext, 3);

    let request = registry.request_decryption(id, &alice).await?;
    assert_eq!(wait_for_decrypted(&mut rx, request).await, Some(9));
    Ok(())
}

#[tokio::test]
async fn repeated_requests_are_independent() -> Result<()> {
    let registry = memory_registry_with(
        GatewayConfig::default()
            .with_unseal_delay(Duration::from_millis(5))
            .with_unseal_jitter(Duration::from_millis(40)),
    );
    let alice = TestParty::alice().identity();
    let id = registry.create(acme_fields(), 6, false, alice).await?;

    let mut rx = registry.subscribe();
    let mut requests = Vec::new();
    for _ in 0..5 {
        requests.push(registry.request_decryption(id, &alice).await?);
    }

    let mut resolved = Vec::new();
    while resolved.len() < requests.len() {
        let n = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await??;
        if let Notification::Decrypted {
            request_id, rating, ..
        } = n
        {
            assert_eq!(rating, 6);
            resolved.push(request_id);
        }
    }

    resolved.sort();
    assert_eq!(resolved, requests);
    assert!(registry.coordinator().pending().is_empty());
    Ok(())
}

#[tokio::test]
async fn persisted_records_survive_reopen() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("reopen.db");
    let alice = TestParty::alice().identity();

    {
        let registry = sqlite_registry(&path)?;
        registry.create(acme_fields(), 4, true, alice).await?;
        registry
            .create(RecordFields::new("Bolt", "Hardware", "b@y"), 8, false, alice)
            .await?;
    }

    let registry = sqlite_registry(&path)?;
    assert_eq!(registry.count().await?, 2);
    assert_eq!(registry.read(RecordId(2)).await?.name, "Bolt");
    assert!(registry.read_visibility(RecordId(1), &alice).await?);
    assert_eq!(registry.records_of(&alice).await?, vec![RecordId(1), RecordId(2)]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_allocate_dense_ids() -> Result<()> {
    let registry = Arc::new(memory_registry());
    let parties = multi_party_fixtures(8);

    let mut tasks = Vec::new();
    for (i, party) in parties.iter().enumerate() {
        let registry = Arc::clone(&registry);
        let owner = party.identity();
        tasks.push(tokio::spawn(async move {
            registry
                .create(acme_fields(), (i % 10) as i64 + 1, false, owner)
                .await
        }));
    }

    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await??);
    }
    ids.sort();

    let expected: Vec<_> = (1..=parties.len() as u64).map(RecordId).collect();
    assert_eq!(ids, expected);
    assert_eq!(registry.count().await?, parties.len() as u64);

    for party in &parties {
        let owned = registry.records_of(&party.identity()).await?;
        assert_eq!(owned.len(), 1);
        let handle = registry.handle_of(owned[0], &party.identity()).await?;
        assert!(registry.gateway().is_granted(&handle, &party.identity()).await?);
    }
    Ok(())
}
