use std::sync::Arc;

use crate::runtime::Registry;

pub mod ownable;
pub mod owner;
pub mod swap;
pub mod token;

/// Every contract code shipped with the host.
pub fn native() -> Registry {
    Registry::new()
        .with(Arc::new(token::Token))
        .with(Arc::new(swap::Swap))
        .with(Arc::new(owner::Owner))
        .with(Arc::new(owner_test::Flip))
}
