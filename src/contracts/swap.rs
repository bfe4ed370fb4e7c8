use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    contracts::ownable::{GET_OWNER, Ownable, TRANSFER_OWNERSHIP},
    runtime::{
        Address, Args, Contract, DotPathBuf, EntryPoint, Error, Interface, Param, ProcContext,
        ReadContext, Type, Value, ViewContext,
    },
};

pub static INTERFACE: Interface = Interface {
    name: "erc20swap",
    constructor: &[
        Param::new("enabled", Type::Bool),
        Param::new("target", Type::Address),
    ],
    entry_points: &[
        EntryPoint::query("get", &[], Type::Address),
        EntryPoint::query("balance_of", &[Param::new("who", Type::Address)], Type::U128),
        EntryPoint::query("total_supply", &[], Type::U128),
        EntryPoint::query("is_enabled", &[], Type::Bool),
        EntryPoint::mutating(
            "set_enabled",
            &[Param::new("enabled", Type::Bool)],
            Type::Unit,
        ),
        EntryPoint::mutating(
            "transfer",
            &[Param::new("to", Type::Address), Param::new("value", Type::U128)],
            Type::Unit,
        ),
        GET_OWNER,
        TRANSFER_OWNERSHIP,
    ],
};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SwapState {
    target: Address,
    enabled: bool,
    ownable: Ownable,
}

fn state_path() -> DotPathBuf {
    DotPathBuf::new().push("state")
}

async fn load(ctx: &impl ReadContext) -> Result<SwapState, Error> {
    ctx.get(&state_path())
        .await?
        .ok_or_else(|| Error::Storage(format!("{} has no swap state", ctx.address())))
}

/// Proxy bound at construction to a deployed `erc20` instance. Queries are
/// forwarded to the target and relayed unchanged; it keeps no balances of its
/// own besides whatever the target credits to the proxy's address.
pub struct Swap;

#[async_trait]
impl Contract for Swap {
    fn interface(&self) -> &'static Interface {
        &INTERFACE
    }

    async fn construct(&self, ctx: &mut ProcContext<'_>, args: &Args) -> Result<(), Error> {
        let ownable = Ownable::new(ctx.caller());
        let state = SwapState {
            enabled: args.get(0)?,
            target: args.get(1)?,
            ownable,
        };
        ctx.set(&state_path(), &state)?;
        ctx.emit(ownable.created());
        Ok(())
    }

    async fn query(
        &self,
        ctx: &ViewContext<'_>,
        selector: &str,
        args: &Args,
    ) -> Result<Value, Error> {
        let state = load(ctx).await?;
        match selector {
            "get" => Ok(state.target.into()),
            "balance_of" => {
                ctx.query(state.target, "balance_of", vec![args.get::<Address>(0)?.into()])
                    .await
            }
            "total_supply" => ctx.query(state.target, "total_supply", vec![]).await,
            "is_enabled" => Ok(state.enabled.into()),
            "get_owner" => Ok(state.ownable.owner().into()),
            _ => Err(self.no_such_entry_point(selector)),
        }
    }

    async fn execute(
        &self,
        ctx: &mut ProcContext<'_>,
        selector: &str,
        args: &Args,
    ) -> Result<Value, Error> {
        let mut state = load(&*ctx).await?;
        let caller = ctx.caller();
        match selector {
            "set_enabled" => {
                state.ownable.only_owner_guard(&caller)?;
                state.enabled = args.get(0)?;
                ctx.set(&state_path(), &state)?;
                Ok(Value::Unit)
            }
            "transfer" => {
                state.ownable.only_owner_guard(&caller)?;
                if !state.enabled {
                    return Err(Error::Disabled);
                }
                let to: Address = args.get(0)?;
                let value: u128 = args.get(1)?;
                ctx.call(state.target, "transfer", vec![to.into(), value.into()])
                    .await
            }
            "transfer_ownership" => {
                let event = state.ownable.transfer_ownership(&caller, args.get(0)?)?;
                ctx.set(&state_path(), &state)?;
                ctx.emit(event);
                Ok(Value::Unit)
            }
            _ => Err(self.no_such_entry_point(selector)),
        }
    }
}

pub mod api {
    use crate::runtime::{Address, Error, Runtime};

    use super::INTERFACE;

    pub async fn deploy(
        runtime: &Runtime,
        deployer: Address,
        enabled: bool,
        target: Address,
    ) -> Result<Address, Error> {
        runtime
            .deploy(deployer, INTERFACE.name, vec![enabled.into(), target.into()])
            .await
    }

    pub async fn get(runtime: &Runtime, swap: Address) -> Result<Address, Error> {
        runtime.query(swap, "get", vec![]).await?.try_into()
    }

    pub async fn balance_of(runtime: &Runtime, swap: Address, who: Address) -> Result<u128, Error> {
        runtime
            .query(swap, "balance_of", vec![who.into()])
            .await?
            .try_into()
    }

    pub async fn total_supply(runtime: &Runtime, swap: Address) -> Result<u128, Error> {
        runtime.query(swap, "total_supply", vec![]).await?.try_into()
    }

    pub async fn is_enabled(runtime: &Runtime, swap: Address) -> Result<bool, Error> {
        runtime.query(swap, "is_enabled", vec![]).await?.try_into()
    }

    pub async fn set_enabled(
        runtime: &Runtime,
        swap: Address,
        caller: Address,
        enabled: bool,
    ) -> Result<(), Error> {
        runtime
            .execute(caller, swap, "set_enabled", vec![enabled.into()])
            .await?
            .try_into()
    }

    pub async fn transfer(
        runtime: &Runtime,
        swap: Address,
        caller: Address,
        to: Address,
        value: u128,
    ) -> Result<(), Error> {
        runtime
            .execute(caller, swap, "transfer", vec![to.into(), value.into()])
            .await?
            .try_into()
    }

    pub async fn get_owner(runtime: &Runtime, swap: Address) -> Result<Address, Error> {
        runtime.query(swap, "get_owner", vec![]).await?.try_into()
    }

    pub async fn transfer_ownership(
        runtime: &Runtime,
        swap: Address,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), Error> {
        runtime
            .execute(caller, swap, "transfer_ownership", vec![new_owner.into()])
            .await?
            .try_into()
    }
}
