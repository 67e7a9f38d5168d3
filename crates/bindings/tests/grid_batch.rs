//! Grid binding behaviour with batched reads enabled

use async_trait::async_trait;
use gridbench_bindings::{GridClient, GridConfig, GridShared};
use gridbench_core::{Db, Error, Fields, Properties, Result, Status};
use gridbench_store::{
    Binary, BinaryRecord, EntryProcessor, KeyValueStore, MemoryStore, RecordBuilder,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

const TABLE: &str = "usertable";
const TOTAL_KEYS: usize = 4;

struct Harness {
    store: Arc<MemoryStore<BinaryRecord>>,
    binary: Binary,
    client: GridClient,
}

fn harness(props: &Properties) -> Harness {
    let store: Arc<MemoryStore<BinaryRecord>> = Arc::new(MemoryStore::new(TABLE));
    let binary = Binary::new();
    let config = GridConfig::from_properties(props).unwrap();
    let shared = GridShared::new(config, store.clone(), binary.clone());
    Harness {
        store,
        binary,
        client: GridClient::new(shared),
    }
}

/// A store whose every data operation fails
struct UnreachableStore;

#[async_trait]
impl KeyValueStore<BinaryRecord> for UnreachableStore {
    fn name(&self) -> &str {
        TABLE
    }

    async fn get(&self, key: &str) -> Result<Option<BinaryRecord>> {
        Err(Error::store("get", key, "connection refused"))
    }

    async fn get_all(&self, _keys: &HashSet<String>) -> Result<HashMap<String, BinaryRecord>> {
        Err(Error::store("get_all", "*", "connection refused"))
    }

    async fn put(&self, key: &str, _value: BinaryRecord) -> Result<()> {
        Err(Error::store("put", key, "connection refused"))
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        Err(Error::store("remove", key, "connection refused"))
    }

    async fn contains_key(&self, key: &str) -> Result<bool> {
        Err(Error::store("contains_key", key, "connection refused"))
    }

    async fn invoke(&self, key: &str, _processor: &dyn EntryProcessor<BinaryRecord>) -> Result<()> {
        Err(Error::store("invoke", key, "connection refused"))
    }

    async fn size(&self) -> Result<usize> {
        Ok(0)
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }
}

fn unreachable(props: &Properties) -> GridClient {
    let config = GridConfig::from_properties(props).unwrap();
    GridClient::new(GridShared::new(config, Arc::new(UnreachableStore), Binary::new()))
}

fn batched() -> Harness {
    harness(&Properties::new().with("fetchsize", "2"))
}

fn fields(pairs: &[(&str, &str)]) -> Fields {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn names(list: &[&str]) -> HashSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Store a record with `field3` explicitly null, bypassing the binding
async fn seed_with_null(h: &Harness, key: &str) {
    let mut builder = RecordBuilder::new("CustomType");
    builder
        .set_field("field0", "value1")
        .set_field("field1", "value2A")
        .set_null("field3");
    let record = builder.build();
    h.binary.register(&record);
    h.store.put(key, record).await.unwrap();
}

#[tokio::test]
async fn insert_stores_every_key() {
    let mut h = batched();
    for index in 0..TOTAL_KEYS {
        let input = fields(&[
            ("field0", format!("value1{index}").as_str()),
            ("field1", format!("value2{index}").as_str()),
        ]);
        let status = h.client.insert(TABLE, &format!("key{index}"), &input).await;
        assert_eq!(status, Status::Ok);
    }
    assert_eq!(h.store.len(), TOTAL_KEYS);
}

#[tokio::test]
async fn second_read_flushes_and_returns_the_triggering_record() {
    let mut h = batched();
    for index in 0..TOTAL_KEYS {
        let input = fields(&[
            ("field0", format!("value1{index}").as_str()),
            ("field1", format!("value2{index}").as_str()),
        ]);
        h.client.insert(TABLE, &format!("key{index}"), &input).await;
    }

    let requested = names(&["field0", "field1"]);
    let mut result = Fields::new();
    let first = h.client.read(TABLE, "key0", Some(&requested), &mut result).await;
    assert_eq!(first, Status::BatchedOk);
    assert!(result.is_empty());

    let second = h.client.read(TABLE, "key1", Some(&requested), &mut result).await;
    assert_eq!(second, Status::Ok);
    assert_eq!(result, fields(&[("field0", "value11"), ("field1", "value21")]));
    assert_eq!(h.store.stats().multi_gets, 1);
    assert_eq!(h.client.served(), 2);
}

#[tokio::test]
async fn null_fields_are_left_out_of_results() {
    let mut h = batched();
    for index in 0..TOTAL_KEYS {
        seed_with_null(&h, &format!("key{index}")).await;
    }

    let requested = names(&["field0", "field1", "field3"]);
    let mut result = Fields::new();
    assert_eq!(
        h.client.read(TABLE, "key0", Some(&requested), &mut result).await,
        Status::BatchedOk
    );
    assert_eq!(
        h.client.read(TABLE, "key1", Some(&requested), &mut result).await,
        Status::Ok
    );
    assert_eq!(result, fields(&[("field0", "value1"), ("field1", "value2A")]));
}

#[tokio::test]
async fn empty_field_set_reads_all_fields() {
    let mut h = batched();
    seed_with_null(&h, "key0").await;

    let mut result = Fields::new();
    h.client.read(TABLE, "key1", Some(&HashSet::new()), &mut result).await;
    let status = h.client.read(TABLE, "key0", Some(&HashSet::new()), &mut result).await;

    assert_eq!(status, Status::Ok);
    assert_eq!(result, fields(&[("field0", "value1"), ("field1", "value2A")]));
}

#[tokio::test]
async fn batch_with_no_existing_keys_is_not_found() {
    let mut h = batched();
    seed_with_null(&h, "key").await;

    let mut result = Fields::new();
    h.client.read(TABLE, "newKey0", None, &mut result).await;
    let status = h.client.read(TABLE, "newKey1", None, &mut result).await;

    assert_eq!(status, Status::NotFound);
    assert!(result.is_empty());
}

#[tokio::test]
async fn delete_is_idempotent() {
    let mut h = batched();
    let input = fields(&[("field0", "value1"), ("field1", "value2")]);
    h.client.insert(TABLE, "key1", &input).await;
    h.client.insert(TABLE, "key2", &input).await;
    assert_eq!(h.store.len(), 2);

    assert_eq!(h.client.delete(TABLE, "key2").await, Status::Ok);
    assert_eq!(h.store.len(), 1);
    assert_eq!(h.client.delete(TABLE, "key2").await, Status::Ok);
    assert_eq!(h.client.delete(TABLE, "never-inserted").await, Status::Ok);
    assert_eq!(h.store.len(), 1);
}

#[tokio::test]
async fn insert_into_another_table_fails() {
    let mut h = batched();
    let status = h
        .client
        .insert("othertable", "key0", &fields(&[("field0", "v")]))
        .await;
    assert_eq!(status, Status::Error);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn update_overwrites_only_supplied_fields() {
    let mut h = harness(&Properties::new());
    h.client
        .insert(TABLE, "key0", &fields(&[("field0", "a"), ("field1", "b")]))
        .await;

    assert_eq!(
        h.client.update(TABLE, "key0", &fields(&[("field1", "c")])).await,
        Status::Ok
    );

    let mut result = Fields::new();
    assert_eq!(h.client.read(TABLE, "key0", None, &mut result).await, Status::Ok);
    assert_eq!(result, fields(&[("field0", "a"), ("field1", "c")]));
}

#[tokio::test]
async fn update_creates_missing_record() {
    let mut h = harness(&Properties::new());
    assert_eq!(
        h.client.update(TABLE, "fresh", &fields(&[("field0", "v")])).await,
        Status::Ok
    );
    let stored = h.store.get("fresh").await.unwrap().unwrap();
    assert_eq!(stored.type_name(), "CustomType");
    assert_eq!(stored.field("field0"), Some("v"));
}

#[tokio::test]
async fn unbatched_read_of_missing_key_is_not_found() {
    let mut h = harness(&Properties::new());
    let mut result = Fields::new();
    assert_eq!(
        h.client.read(TABLE, "missing", None, &mut result).await,
        Status::NotFound
    );
}

#[tokio::test]
async fn concurrent_updates_keep_every_field() {
    let store: Arc<MemoryStore<BinaryRecord>> = Arc::new(MemoryStore::new(TABLE));
    let shared = GridShared::new(GridConfig::default(), store.clone(), Binary::new());

    let tasks: Vec<_> = (0..8)
        .map(|worker| {
            let mut client = GridClient::new(Arc::clone(&shared));
            tokio::spawn(async move {
                let values = fields(&[(format!("field{worker}").as_str(), "v")]);
                client.update(TABLE, "hot", &values).await
            })
        })
        .collect();

    for status in futures::future::join_all(tasks).await {
        assert_eq!(status.unwrap(), Status::Ok);
    }
    let stored = store.get("hot").await.unwrap().unwrap();
    assert_eq!(stored.len(), 8);
}

#[tokio::test]
async fn fields_added_by_update_appear_in_full_reads() {
    let mut h = harness(&Properties::new());
    h.client.insert(TABLE, "key0", &fields(&[("field0", "a")])).await;

    let mut result = Fields::new();
    assert_eq!(h.client.read(TABLE, "key0", None, &mut result).await, Status::Ok);
    assert_eq!(result, fields(&[("field0", "a")]));

    assert_eq!(
        h.client.update(TABLE, "key0", &fields(&[("field1", "b")])).await,
        Status::Ok
    );

    let mut result = Fields::new();
    assert_eq!(h.client.read(TABLE, "key0", None, &mut result).await, Status::Ok);
    assert_eq!(result, fields(&[("field0", "a"), ("field1", "b")]));
}

#[tokio::test]
async fn wider_records_inserted_later_read_back_whole() {
    let mut h = harness(&Properties::new());
    h.client.insert(TABLE, "narrow", &fields(&[("field0", "x")])).await;
    let mut result = Fields::new();
    h.client.read(TABLE, "narrow", None, &mut result).await;

    let wide = fields(&[("field0", "y"), ("field9", "z")]);
    h.client.insert(TABLE, "wide", &wide).await;

    let mut result = Fields::new();
    assert_eq!(h.client.read(TABLE, "wide", None, &mut result).await, Status::Ok);
    assert_eq!(result, wide);
}

#[tokio::test]
async fn failed_batch_fetch_is_an_error_and_clears_pending() {
    let mut client = unreachable(&Properties::new().with("fetchsize", "2"));

    let mut result = Fields::new();
    assert_eq!(
        client.read(TABLE, "key0", None, &mut result).await,
        Status::BatchedOk
    );
    assert_eq!(client.pending(), 1);
    assert_eq!(client.read(TABLE, "key1", None, &mut result).await, Status::Error);
    assert_eq!(client.pending(), 0);
    assert_eq!(client.served(), 0);
    assert!(result.is_empty());

    // The next read starts a fresh batch
    assert_eq!(
        client.read(TABLE, "key2", None, &mut result).await,
        Status::BatchedOk
    );
}

#[tokio::test]
async fn store_failures_surface_as_errors() {
    let mut client = unreachable(&Properties::new());
    let values = fields(&[("field0", "v")]);

    let mut result = Fields::new();
    assert_eq!(client.read(TABLE, "key0", None, &mut result).await, Status::Error);
    assert_eq!(client.update(TABLE, "key0", &values).await, Status::Error);
    assert_eq!(client.insert(TABLE, "key0", &values).await, Status::Error);
    assert_eq!(client.delete(TABLE, "key0").await, Status::Error);
    assert!(result.is_empty());
}
