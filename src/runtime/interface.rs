use async_trait::async_trait;
use serde::Serialize;

use crate::runtime::{Error, ProcContext, Type, Value, ViewContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Query,
    Mutating,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Param {
    pub name: &'static str,
    pub ty: Type,
}

impl Param {
    pub const fn new(name: &'static str, ty: Type) -> Self {
        Self { name, ty }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EntryPoint {
    pub name: &'static str,
    pub kind: Kind,
    pub params: &'static [Param],
    pub returns: Type,
}

impl EntryPoint {
    pub const fn query(name: &'static str, params: &'static [Param], returns: Type) -> Self {
        Self {
            name,
            kind: Kind::Query,
            params,
            returns,
        }
    }

    pub const fn mutating(name: &'static str, params: &'static [Param], returns: Type) -> Self {
        Self {
            name,
            kind: Kind::Mutating,
            params,
            returns,
        }
    }
}

/// Static description of a contract code: its constructor and entry points.
#[derive(Debug, Serialize)]
pub struct Interface {
    pub name: &'static str,
    pub constructor: &'static [Param],
    pub entry_points: &'static [EntryPoint],
}

impl Interface {
    pub fn entry_point(&self, selector: &str) -> Result<&'static EntryPoint, Error> {
        self.entry_points
            .iter()
            .find(|e| e.name == selector)
            .ok_or_else(|| Error::NoSuchEntryPoint {
                code: self.name.to_string(),
                selector: selector.to_string(),
            })
    }
}

/// Positional arguments, already checked against the entry point's params.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Args(Vec<Value>);

impl Args {
    pub fn check(values: Vec<Value>, params: &[Param]) -> Result<Self, Error> {
        if values.len() != params.len() {
            return Err(Error::InvalidArguments(format!(
                "expected {} arguments, found {}",
                params.len(),
                values.len()
            )));
        }
        for (value, param) in values.iter().zip(params) {
            if value.ty() != param.ty {
                return Err(Error::InvalidArguments(format!(
                    "{} must be {}, found {}",
                    param.name,
                    param.ty,
                    value.ty()
                )));
            }
        }
        Ok(Self(values))
    }

    pub fn get<T: TryFrom<Value, Error = Error>>(&self, index: usize) -> Result<T, Error> {
        self.0
            .get(index)
            .cloned()
            .ok_or_else(|| Error::InvalidArguments(format!("missing argument {}", index)))?
            .try_into()
    }
}

/// Code shared by every instance deployed from it. Instances differ only in
/// the storage subtree the dispatcher binds the context to.
#[async_trait]
pub trait Contract: Send + Sync {
    fn interface(&self) -> &'static Interface;

    async fn construct(&self, ctx: &mut ProcContext<'_>, args: &Args) -> Result<(), Error>;

    async fn query(
        &self,
        ctx: &ViewContext<'_>,
        selector: &str,
        args: &Args,
    ) -> Result<Value, Error>;

    async fn execute(
        &self,
        ctx: &mut ProcContext<'_>,
        selector: &str,
        args: &Args,
    ) -> Result<Value, Error>;

    fn no_such_entry_point(&self, selector: &str) -> Error {
        Error::NoSuchEntryPoint {
            code: self.interface().name.to_string(),
            selector: selector.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Address;

    static PARAMS: [Param; 2] = [Param::new("to", Type::Address), Param::new("value", Type::U128)];

    #[test]
    fn test_check_arity_and_types() {
        let to = Address::from_seed("to");
        let args = Args::check(vec![to.into(), 5u128.into()], &PARAMS).unwrap();
        assert_eq!(args.get::<Address>(0).unwrap(), to);
        assert_eq!(args.get::<u128>(1).unwrap(), 5);

        assert!(matches!(
            Args::check(vec![to.into()], &PARAMS),
            Err(Error::InvalidArguments(_))
        ));
        assert!(matches!(
            Args::check(vec![5u128.into(), to.into()], &PARAMS),
            Err(Error::InvalidArguments(_))
        ));
    }
}
