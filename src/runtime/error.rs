use thiserror::Error as ThisError;

use crate::{database::queries, runtime::Address};

/// Failure of an entry point, as seen by its immediate caller.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("insufficient allowance")]
    InsufficientAllowance,
    #[error("arithmetic overflow")]
    Overflow,
    #[error("arithmetic underflow")]
    Underflow,
    #[error("caller {0} is not the owner")]
    Unauthorized(Address),
    #[error("no contract at address {0}")]
    NoSuchContract(Address),
    #[error("unknown contract code: {0}")]
    UnknownCode(String),
    #[error("contract {code} has no entry point {selector}")]
    NoSuchEntryPoint { code: String, selector: String },
    #[error("call to {selector} on {target} failed: {source}")]
    CallFailed {
        target: Address,
        selector: String,
        source: Box<Error>,
    },
    #[error("entry point {0} mutates state and cannot be queried")]
    ReadOnly(String),
    #[error("reentrancy prevented: contract {0} already exists in the stack")]
    Reentrancy(Address),
    #[error("call depth limit of {0} exceeded")]
    CallDepthExceeded(usize),
    #[error("contract is disabled")]
    Disabled,
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InsufficientBalance,
    InsufficientAllowance,
    Overflow,
    Underflow,
    Unauthorized,
    NoSuchContract,
    UnknownCode,
    NoSuchEntryPoint,
    ReadOnly,
    Reentrancy,
    CallDepthExceeded,
    Disabled,
    InvalidArguments,
    Storage,
}

impl Error {
    /// The failure that started the chain, looking through nested call wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Error::CallFailed { source, .. } => source.root(),
            e => e,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InsufficientBalance => ErrorKind::InsufficientBalance,
            Error::InsufficientAllowance => ErrorKind::InsufficientAllowance,
            Error::Overflow => ErrorKind::Overflow,
            Error::Underflow => ErrorKind::Underflow,
            Error::Unauthorized(_) => ErrorKind::Unauthorized,
            Error::NoSuchContract(_) => ErrorKind::NoSuchContract,
            Error::UnknownCode(_) => ErrorKind::UnknownCode,
            Error::NoSuchEntryPoint { .. } => ErrorKind::NoSuchEntryPoint,
            Error::ReadOnly(_) => ErrorKind::ReadOnly,
            Error::Reentrancy(_) => ErrorKind::Reentrancy,
            Error::CallDepthExceeded(_) => ErrorKind::CallDepthExceeded,
            Error::Disabled => ErrorKind::Disabled,
            Error::InvalidArguments(_) => ErrorKind::InvalidArguments,
            Error::Storage(_) => ErrorKind::Storage,
            Error::CallFailed { source, .. } => source.kind(),
        }
    }
}

impl From<queries::Error> for Error {
    fn from(e: queries::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

impl From<libsql::Error> for Error {
    fn from(e: libsql::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_looks_through_nested_calls() {
        let target = Address::from_seed("token");
        let err = Error::CallFailed {
            target,
            selector: "balance_of".to_string(),
            source: Box::new(Error::CallFailed {
                target,
                selector: "transfer".to_string(),
                source: Box::new(Error::InsufficientBalance),
            }),
        };
        assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
        assert_eq!(err.root(), &Error::InsufficientBalance);
    }
}
