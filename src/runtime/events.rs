use serde::{Deserialize, Serialize};

use crate::runtime::Address;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    Transfer {
        from: Option<Address>,
        to: Option<Address>,
        value: u128,
    },
    Approval {
        owner: Address,
        spender: Address,
        value: u128,
    },
    OwnershipTransferred {
        previous_owner: Option<Address>,
        new_owner: Address,
    },
}

/// A committed event and the version of the call tree that emitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    pub version: i64,
    pub contract: Address,
    pub event: Event,
}
