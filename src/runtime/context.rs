use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::runtime::{
    Address, Error, Event, Runtime, Transaction, Value, deserialize_cbor,
    dot_path_buf::DotPathBuf, serialize_cbor,
};

/// Storage reads scoped to the executing contract's subtree.
#[async_trait]
pub trait ReadContext: Sync {
    fn address(&self) -> Address;

    async fn get_bytes(&self, path: &DotPathBuf) -> Result<Option<Vec<u8>>, Error>;

    async fn get<T: DeserializeOwned + Send>(&self, path: &DotPathBuf) -> Result<Option<T>, Error> {
        match self.get_bytes(path).await? {
            Some(bytes) => Ok(Some(deserialize_cbor(&bytes)?)),
            None => Ok(None),
        }
    }
}

fn wrap(target: Address, selector: &str, e: Error) -> Error {
    Error::CallFailed {
        target,
        selector: selector.to_string(),
        source: Box::new(e),
    }
}

pub struct ViewContext<'a> {
    pub(crate) runtime: &'a Runtime,
    pub(crate) tx: &'a Transaction,
    pub(crate) contract: Address,
    pub(crate) caller: Option<Address>,
    pub(crate) depth: usize,
}

impl ViewContext<'_> {
    /// `None` for a query issued from outside any call tree.
    pub fn caller(&self) -> Option<Address> {
        self.caller
    }

    pub async fn query(
        &self,
        target: Address,
        selector: &str,
        args: Vec<Value>,
    ) -> Result<Value, Error> {
        self.runtime
            .query_in(
                self.tx,
                Some(self.contract),
                target,
                selector,
                args,
                self.depth + 1,
            )
            .await
            .map_err(|e| wrap(target, selector, e))
    }
}

#[async_trait]
impl ReadContext for ViewContext<'_> {
    fn address(&self) -> Address {
        self.contract
    }

    async fn get_bytes(&self, path: &DotPathBuf) -> Result<Option<Vec<u8>>, Error> {
        self.runtime.storage.get(self.tx, &self.contract, path).await
    }
}

pub struct ProcContext<'a> {
    pub(crate) runtime: &'a Runtime,
    pub(crate) tx: &'a mut Transaction,
    pub(crate) contract: Address,
    pub(crate) caller: Address,
}

impl ProcContext<'_> {
    /// Immediate caller: the account for a top-level call, otherwise the
    /// contract that issued the nested call.
    pub fn caller(&self) -> Address {
        self.caller
    }

    pub fn set<T: Serialize>(&mut self, path: &DotPathBuf, value: &T) -> Result<(), Error> {
        let value = serialize_cbor(value)?;
        self.tx.write(self.contract, path.to_string(), value);
        Ok(())
    }

    pub fn delete(&mut self, path: &DotPathBuf) {
        self.tx.delete(self.contract, path.to_string());
    }

    pub fn emit(&mut self, event: Event) {
        self.tx.emit(self.contract, event);
    }

    /// Calls another contract with this contract as the caller. A failure
    /// discards only the callee's writes; the error is returned so this
    /// contract can decide whether to propagate it.
    pub async fn call(
        &mut self,
        target: Address,
        selector: &str,
        args: Vec<Value>,
    ) -> Result<Value, Error> {
        self.runtime
            .call_in(self.tx, self.contract, target, selector, args)
            .await
            .map_err(|e| wrap(target, selector, e))
    }

    pub async fn query(
        &self,
        target: Address,
        selector: &str,
        args: Vec<Value>,
    ) -> Result<Value, Error> {
        self.view().query(target, selector, args).await
    }

    pub fn view(&self) -> ViewContext<'_> {
        ViewContext {
            runtime: self.runtime,
            tx: &*self.tx,
            contract: self.contract,
            caller: Some(self.caller),
            depth: self.tx.depth(),
        }
    }
}

#[async_trait]
impl ReadContext for ProcContext<'_> {
    fn address(&self) -> Address {
        self.contract
    }

    async fn get_bytes(&self, path: &DotPathBuf) -> Result<Option<Vec<u8>>, Error> {
        self.runtime.storage.get(&*self.tx, &self.contract, path).await
    }
}
