use bon::Builder;
use serde::Serialize;

use crate::runtime::Address;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Builder)]
pub struct ContractRow {
    pub address: Address,
    pub code: String,
    pub deployer: Address,
    #[builder(default = 0)]
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct ContractStateRow {
    pub address: Address,
    pub path: String,
    pub version: i64,
    #[builder(default)]
    pub value: Vec<u8>,
    #[builder(default = false)]
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct EventRow {
    pub version: i64,
    pub contract: Address,
    pub value: Vec<u8>,
}

/// Outcome of a top-level call or deployment. The row id of a successful
/// call is the version stamped on the state it committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Builder)]
pub struct CallRow {
    #[builder(default = 0)]
    pub id: i64,
    pub caller: Address,
    pub contract: Address,
    pub selector: String,
    pub ok: bool,
    pub value: String,
}
