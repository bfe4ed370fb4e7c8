use std::{collections::HashMap, sync::Arc};

use crate::runtime::Contract;

/// Contract codes available for deployment, keyed by interface name.
#[derive(Clone, Default)]
pub struct Registry {
    codes: HashMap<&'static str, Arc<dyn Contract>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, contract: Arc<dyn Contract>) {
        self.codes.insert(contract.interface().name, contract);
    }

    pub fn with(mut self, contract: Arc<dyn Contract>) -> Self {
        self.register(contract);
        self
    }

    pub fn get(&self, code: &str) -> Option<Arc<dyn Contract>> {
        self.codes.get(code).cloned()
    }

    pub fn codes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.codes.keys().copied()
    }
}
