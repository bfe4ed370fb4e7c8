use serde::{Deserialize, Serialize};

use crate::runtime::{Address, EntryPoint, Error, Event, Param, Type};

pub const GET_OWNER: EntryPoint = EntryPoint::query("get_owner", &[], Type::Address);

pub const TRANSFER_OWNERSHIP: EntryPoint = EntryPoint::mutating(
    "transfer_ownership",
    &[Param::new("new_owner", Type::Address)],
    Type::Unit,
);

/// Single-owner capability, embedded by value in the state of the contract it
/// guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownable {
    owner: Address,
}

impl Ownable {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn only_owner_guard(&self, caller: &Address) -> Result<(), Error> {
        if caller != &self.owner {
            return Err(Error::Unauthorized(*caller));
        }
        Ok(())
    }

    /// Replaces the owner. The caller persists `self` and emits the returned
    /// event.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<Event, Error> {
        self.only_owner_guard(caller)?;
        let previous_owner = std::mem::replace(&mut self.owner, new_owner);
        Ok(Event::OwnershipTransferred {
            previous_owner: Some(previous_owner),
            new_owner,
        })
    }

    pub fn created(&self) -> Event {
        Event::OwnershipTransferred {
            previous_owner: None,
            new_owner: self.owner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_owner_guard() {
        let alice = Address::from_seed("alice");
        let bob = Address::from_seed("bob");
        let ownable = Ownable::new(alice);
        assert!(ownable.only_owner_guard(&alice).is_ok());
        assert_eq!(
            ownable.only_owner_guard(&bob),
            Err(Error::Unauthorized(bob))
        );
    }

    #[test]
    fn test_transfer_ownership() {
        let alice = Address::from_seed("alice");
        let bob = Address::from_seed("bob");
        let mut ownable = Ownable::new(alice);

        assert_eq!(
            ownable.transfer_ownership(&bob, bob),
            Err(Error::Unauthorized(bob))
        );
        assert_eq!(ownable.owner(), alice);

        let event = ownable.transfer_ownership(&alice, bob).unwrap();
        assert_eq!(
            event,
            Event::OwnershipTransferred {
                previous_owner: Some(alice),
                new_owner: bob,
            }
        );
        assert_eq!(ownable.owner(), bob);
        assert!(ownable.only_owner_guard(&alice).is_err());
    }
}
