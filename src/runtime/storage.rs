use std::{io::Cursor, path::Path};

use anyhow::Result as AnyResult;
use bon::Builder;
use indexmap::IndexMap;
use libsql::Connection;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    database::{
        new_connection, new_memory_connection,
        queries::{
            count_contracts_by_deployer, get_contract, get_contract_state_value_at,
            get_latest_contract_state_value, insert_call, insert_contract, insert_contract_state,
            insert_event, select_calls, select_events,
        },
        types::{CallRow, ContractRow, ContractStateRow, EventRow},
    },
    runtime::{Address, Error, Event, EventRecord, dot_path_buf::DotPathBuf, stack::Stack},
};

pub fn serialize_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, Error> {
    let mut buffer = Vec::new();
    ciborium::into_writer(value, &mut buffer).map_err(|e| Error::Storage(e.to_string()))?;
    Ok(buffer)
}

pub fn deserialize_cbor<T: DeserializeOwned>(buffer: &[u8]) -> Result<T, Error> {
    ciborium::from_reader(&mut Cursor::new(buffer)).map_err(|e| Error::Storage(e.to_string()))
}

type Key = (Address, String);

/// Writes and events staged by one frame of a call tree. `None` marks a delete.
#[derive(Debug, Default)]
struct Layer {
    writes: IndexMap<Key, Option<Vec<u8>>>,
    events: Vec<(Address, Event)>,
}

/// Staging area for a single top-level call tree.
///
/// The base layer belongs to the top-level call; every nested call opens a
/// savepoint layer on top of it. Nothing reaches the database until the whole
/// tree is handed to [`Storage::commit`].
#[derive(Debug)]
pub struct Transaction {
    layers: Vec<Layer>,
    deployments: Vec<ContractRow>,
    pub(crate) stack: Stack<Address>,
}

impl Transaction {
    pub fn new(max_call_depth: usize) -> Self {
        Self {
            layers: vec![Layer::default()],
            deployments: Vec::new(),
            stack: Stack::new(max_call_depth),
        }
    }

    /// `Some(None)` when the key was deleted within this tree.
    pub fn staged(&self, address: &Address, path: &str) -> Option<Option<&[u8]>> {
        let key = (*address, path.to_string());
        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.writes.get(&key))
            .map(|value| value.as_deref())
    }

    pub fn write(&mut self, address: Address, path: String, value: Vec<u8>) {
        self.top().writes.insert((address, path), Some(value));
    }

    pub fn delete(&mut self, address: Address, path: String) {
        self.top().writes.insert((address, path), None);
    }

    pub fn emit(&mut self, address: Address, event: Event) {
        self.top().events.push((address, event));
    }

    pub fn register(&mut self, contract: ContractRow) {
        self.deployments.push(contract);
    }

    pub fn deployed(&self, address: &Address) -> Option<&ContractRow> {
        self.deployments.iter().find(|c| &c.address == address)
    }

    pub fn savepoint(&mut self) {
        self.layers.push(Layer::default());
    }

    /// Folds the innermost savepoint into its parent.
    pub fn release(&mut self) {
        if self.layers.len() < 2 {
            return;
        }
        if let Some(layer) = self.layers.pop() {
            let parent = self.top();
            for (key, value) in layer.writes {
                parent.writes.insert(key, value);
            }
            parent.events.extend(layer.events);
        }
    }

    /// Discards the innermost savepoint.
    pub fn rollback(&mut self) {
        if self.layers.len() > 1 {
            self.layers.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn top(&mut self) -> &mut Layer {
        if self.layers.is_empty() {
            self.layers.push(Layer::default());
        }
        let last = self.layers.len() - 1;
        &mut self.layers[last]
    }

    fn into_changes(mut self) -> (Layer, Vec<ContractRow>) {
        while self.layers.len() > 1 {
            self.release();
        }
        (self.layers.pop().unwrap_or_default(), self.deployments)
    }
}

/// Versioned, address-scoped key/value store backing every contract instance.
#[derive(Builder, Clone)]
pub struct Storage {
    pub conn: Connection,
}

impl Storage {
    pub async fn open(path: &Path) -> AnyResult<Self> {
        Ok(Self::builder().conn(new_connection(path).await?).build())
    }

    pub async fn in_memory() -> AnyResult<Self> {
        Ok(Self::builder().conn(new_memory_connection().await?).build())
    }

    /// Reads through the staged writes of `tx` to the latest committed version.
    pub async fn get(
        &self,
        tx: &Transaction,
        address: &Address,
        path: &DotPathBuf,
    ) -> Result<Option<Vec<u8>>, Error> {
        let path = path.to_string();
        if let Some(staged) = tx.staged(address, &path) {
            return Ok(staged.map(<[u8]>::to_vec));
        }
        Ok(get_latest_contract_state_value(&self.conn, address, &path).await?)
    }

    pub async fn get_committed(
        &self,
        address: &Address,
        path: &DotPathBuf,
    ) -> Result<Option<Vec<u8>>, Error> {
        Ok(get_latest_contract_state_value(&self.conn, address, &path.to_string()).await?)
    }

    pub async fn get_at(
        &self,
        address: &Address,
        path: &DotPathBuf,
        version: i64,
    ) -> Result<Option<Vec<u8>>, Error> {
        Ok(get_contract_state_value_at(&self.conn, address, &path.to_string(), version).await?)
    }

    pub async fn contract(&self, address: &Address) -> Result<Option<ContractRow>, Error> {
        Ok(get_contract(&self.conn, address).await?)
    }

    pub async fn deployment_count(&self, deployer: &Address) -> Result<u64, Error> {
        Ok(count_contracts_by_deployer(&self.conn, deployer).await?)
    }

    /// Flushes a finished call tree in one database transaction and returns
    /// the version its writes were stamped with.
    pub async fn commit(&self, tx: Transaction, call: CallRow) -> Result<i64, Error> {
        let (layer, deployments) = tx.into_changes();
        self.conn.execute("BEGIN TRANSACTION", ()).await?;
        match self.flush(layer, deployments, call).await {
            Ok(version) => {
                self.conn.execute("COMMIT", ()).await?;
                debug!("Committed version {}", version);
                Ok(version)
            }
            Err(e) => {
                self.conn.execute("ROLLBACK", ()).await?;
                Err(e)
            }
        }
    }

    async fn flush(
        &self,
        layer: Layer,
        deployments: Vec<ContractRow>,
        call: CallRow,
    ) -> Result<i64, Error> {
        let version = insert_call(&self.conn, call).await?;
        for contract in deployments {
            insert_contract(&self.conn, ContractRow { version, ..contract }).await?;
        }
        for ((address, path), value) in layer.writes {
            let row = ContractStateRow::builder()
                .address(address)
                .path(path)
                .version(version);
            insert_contract_state(
                &self.conn,
                match value {
                    Some(value) => row.value(value).build(),
                    None => row.deleted(true).build(),
                },
            )
            .await?;
        }
        for (contract, event) in layer.events {
            insert_event(
                &self.conn,
                EventRow::builder()
                    .version(version)
                    .contract(contract)
                    .value(serialize_cbor(&event)?)
                    .build(),
            )
            .await?;
        }
        Ok(version)
    }

    /// Logs a call whose effects were rolled back.
    pub async fn record_failure(&self, call: CallRow) -> Result<i64, Error> {
        Ok(insert_call(&self.conn, call).await?)
    }

    pub async fn calls(&self) -> Result<Vec<CallRow>, Error> {
        Ok(select_calls(&self.conn).await?)
    }

    pub async fn events(&self, contract: &Address) -> Result<Vec<EventRecord>, Error> {
        select_events(&self.conn, contract)
            .await?
            .into_iter()
            .map(|row| {
                Ok(EventRecord {
                    version: row.version,
                    contract: row.contract,
                    event: deserialize_cbor(&row.value)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> DotPathBuf {
        s.parse().unwrap()
    }

    fn call(contract: Address) -> CallRow {
        CallRow::builder()
            .caller(Address::from_seed("caller"))
            .contract(contract)
            .selector("test".to_string())
            .ok(true)
            .value("()".to_string())
            .build()
    }

    #[test]
    fn test_nested_rollback_discards_only_inner_layer() {
        let a = Address::from_seed("a");
        let mut tx = Transaction::new(8);
        tx.write(a, "x".to_string(), vec![1]);
        tx.savepoint();
        tx.write(a, "x".to_string(), vec![2]);
        tx.write(a, "y".to_string(), vec![3]);
        assert_eq!(tx.staged(&a, "x"), Some(Some(&[2u8][..])));
        tx.rollback();
        assert_eq!(tx.staged(&a, "x"), Some(Some(&[1u8][..])));
        assert_eq!(tx.staged(&a, "y"), None);
    }

    #[test]
    fn test_release_merges_into_parent() {
        let a = Address::from_seed("a");
        let mut tx = Transaction::new(8);
        tx.savepoint();
        tx.delete(a, "x".to_string());
        tx.savepoint();
        tx.write(a, "y".to_string(), vec![7]);
        tx.release();
        tx.release();
        assert_eq!(tx.staged(&a, "x"), Some(None));
        assert_eq!(tx.staged(&a, "y"), Some(Some(&[7u8][..])));
        tx.rollback();
        assert_eq!(tx.staged(&a, "y"), Some(Some(&[7u8][..])));
    }

    #[tokio::test]
    async fn test_commit_is_versioned() -> AnyResult<()> {
        let storage = Storage::in_memory().await?;
        let a = Address::from_seed("a");

        let mut tx = Transaction::new(8);
        tx.write(a, "x".to_string(), serialize_cbor(&1u128)?);
        let v1 = storage.commit(tx, call(a)).await?;

        let mut tx = Transaction::new(8);
        tx.write(a, "x".to_string(), serialize_cbor(&2u128)?);
        let v2 = storage.commit(tx, call(a)).await?;

        let mut tx = Transaction::new(8);
        tx.delete(a, "x".to_string());
        let v3 = storage.commit(tx, call(a)).await?;

        let read = |bytes: Option<Vec<u8>>| bytes.map(|b| deserialize_cbor::<u128>(&b).unwrap());
        assert_eq!(read(storage.get_at(&a, &path("x"), v1).await?), Some(1));
        assert_eq!(read(storage.get_at(&a, &path("x"), v2).await?), Some(2));
        assert_eq!(storage.get_at(&a, &path("x"), v3).await?, None);
        assert_eq!(storage.get_committed(&a, &path("x")).await?, None);
        assert_eq!(storage.get_at(&a, &path("x"), v1 - 1).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_reads_see_staged_writes_before_commit() -> AnyResult<()> {
        let storage = Storage::in_memory().await?;
        let a = Address::from_seed("a");
        let b = Address::from_seed("b");
        let mut tx = Transaction::new(8);
        tx.write(a, "x".to_string(), vec![9]);
        assert_eq!(storage.get(&tx, &a, &path("x")).await?, Some(vec![9]));
        assert_eq!(storage.get(&tx, &b, &path("x")).await?, None);
        assert_eq!(storage.get_committed(&a, &path("x")).await?, None);
        drop(tx);
        assert_eq!(storage.get_committed(&a, &path("x")).await?, None);
        Ok(())
    }
}
