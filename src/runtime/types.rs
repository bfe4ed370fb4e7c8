use std::{fmt, str::FromStr};

use hex::FromHex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::runtime::Error;

/// Fixed-width identifier shared by accounts and deployed contract instances.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Address(#[serde(with = "hex::serde")] [u8; 32]);

impl Address {
    /// Account address for a human readable seed such as `"alice"`.
    pub fn from_seed(seed: &str) -> Self {
        Self(Sha256::digest(seed.as_bytes()).into())
    }

    /// Address of the `nonce`-th contract deployed by `deployer` from `code`.
    pub fn derive(deployer: &Address, nonce: u64, code: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(deployer.0);
        hasher.update(nonce.to_be_bytes());
        hasher.update(code.as_bytes());
        Self(hasher.finalize().into())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = hex::FromHexError;

    /// Accepts 64 hex characters, or `@seed` for a seeded account.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix('@') {
            Some(seed) => Ok(Self::from_seed(seed)),
            None => Ok(Self(<[u8; 32]>::from_hex(s)?)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Unit,
    Bool,
    U128,
    Address,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Unit => write!(f, "unit"),
            Type::Bool => write!(f, "bool"),
            Type::U128 => write!(f, "u128"),
            Type::Address => write!(f, "address"),
        }
    }
}

/// Argument and return value of an entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Unit,
    Bool(bool),
    U128(u128),
    Address(Address),
}

impl Value {
    pub fn ty(&self) -> Type {
        match self {
            Value::Unit => Type::Unit,
            Value::Bool(_) => Type::Bool,
            Value::U128(_) => Type::U128,
            Value::Address(_) => Type::Address,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::U128(n) => write!(f, "{}", n),
            Value::Address(a) => write!(f, "{}", a),
        }
    }
}

impl FromStr for Value {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "()" => Ok(Value::Unit),
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            s if s.starts_with('@') || s.len() == 64 => s
                .parse()
                .map(Value::Address)
                .map_err(|e| format!("invalid address {}: {}", s, e)),
            s => s
                .parse()
                .map(Value::U128)
                .map_err(|e| format!("invalid value {}: {}", s, e)),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<u128> for Value {
    fn from(n: u128) -> Self {
        Value::U128(n)
    }
}

impl From<Address> for Value {
    fn from(a: Address) -> Self {
        Value::Address(a)
    }
}

fn mismatch(expected: Type, value: &Value) -> Error {
    Error::InvalidArguments(format!("expected {}, found {}", expected, value.ty()))
}

impl TryFrom<Value> for () {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Unit => Ok(()),
            v => Err(mismatch(Type::Unit, &v)),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(b) => Ok(b),
            v => Err(mismatch(Type::Bool, &v)),
        }
    }
}

impl TryFrom<Value> for u128 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::U128(n) => Ok(n),
            v => Err(mismatch(Type::U128, &v)),
        }
    }
}

impl TryFrom<Value> for Address {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Address(a) => Ok(a),
            v => Err(mismatch(Type::Address, &v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_round_trips_through_hex() {
        let alice = Address::from_seed("alice");
        let parsed: Address = alice.to_string().parse().unwrap();
        assert_eq!(parsed, alice);
        assert_eq!("@alice".parse::<Address>().unwrap(), alice);
        assert!("abc".parse::<Address>().is_err());
    }

    #[test]
    fn test_derived_addresses_are_unique_per_nonce() {
        let deployer = Address::from_seed("deployer");
        let a = Address::derive(&deployer, 0, "erc20");
        let b = Address::derive(&deployer, 1, "erc20");
        let c = Address::derive(&deployer, 0, "erc20swap");
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, Address::derive(&deployer, 0, "erc20"));
    }

    #[test]
    fn test_value_parsing() {
        assert_eq!("true".parse::<Value>().unwrap(), Value::Bool(true));
        assert_eq!("1000000".parse::<Value>().unwrap(), Value::U128(1_000_000));
        assert_eq!(
            "@bob".parse::<Value>().unwrap(),
            Value::Address(Address::from_seed("bob"))
        );
        assert!("-1".parse::<Value>().is_err());
    }

    #[test]
    fn test_value_conversion_mismatch() {
        let err = u128::try_from(Value::Bool(true)).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidArguments("expected u128, found bool".to_string())
        );
    }
}
