use async_trait::async_trait;

use crate::runtime::{
    Address, Args, Contract, DotPathBuf, EntryPoint, Error, Event, Interface, Param, ProcContext,
    ReadContext, Type, Value, ViewContext,
};

pub static INTERFACE: Interface = Interface {
    name: "erc20",
    constructor: &[Param::new("initial_supply", Type::U128)],
    entry_points: &[
        EntryPoint::query("total_supply", &[], Type::U128),
        EntryPoint::query("balance_of", &[Param::new("who", Type::Address)], Type::U128),
        EntryPoint::query(
            "allowance",
            &[
                Param::new("owner", Type::Address),
                Param::new("spender", Type::Address),
            ],
            Type::U128,
        ),
        EntryPoint::mutating(
            "transfer",
            &[Param::new("to", Type::Address), Param::new("value", Type::U128)],
            Type::Unit,
        ),
        EntryPoint::mutating(
            "approve",
            &[
                Param::new("spender", Type::Address),
                Param::new("value", Type::U128),
            ],
            Type::Unit,
        ),
        EntryPoint::mutating(
            "transfer_from",
            &[
                Param::new("from", Type::Address),
                Param::new("to", Type::Address),
                Param::new("value", Type::U128),
            ],
            Type::Unit,
        ),
    ],
};

fn total_supply_path() -> DotPathBuf {
    DotPathBuf::new().push("total_supply")
}

fn balance_path(who: &Address) -> DotPathBuf {
    DotPathBuf::new().push("balances").push(who)
}

fn allowance_path(owner: &Address, spender: &Address) -> DotPathBuf {
    DotPathBuf::new()
        .push("allowances")
        .push(owner)
        .push(spender)
}

async fn total_supply(ctx: &impl ReadContext) -> Result<u128, Error> {
    Ok(ctx.get(&total_supply_path()).await?.unwrap_or_default())
}

async fn balance_of(ctx: &impl ReadContext, who: &Address) -> Result<u128, Error> {
    Ok(ctx.get(&balance_path(who)).await?.unwrap_or_default())
}

async fn allowance(
    ctx: &impl ReadContext,
    owner: &Address,
    spender: &Address,
) -> Result<u128, Error> {
    Ok(ctx
        .get(&allowance_path(owner, spender))
        .await?
        .unwrap_or_default())
}

/// Moves `value` from `from` to `to`. Both balances are checked before either
/// is written.
async fn move_balance(
    ctx: &mut ProcContext<'_>,
    from: Address,
    to: Address,
    value: u128,
) -> Result<(), Error> {
    let from_balance = balance_of(&*ctx, &from).await?;
    if from_balance < value {
        return Err(Error::InsufficientBalance);
    }

    if from != to && value > 0 {
        let debited = from_balance.checked_sub(value).ok_or(Error::Underflow)?;
        let credited = balance_of(&*ctx, &to)
            .await?
            .checked_add(value)
            .ok_or(Error::Overflow)?;
        ctx.set(&balance_path(&from), &debited)?;
        ctx.set(&balance_path(&to), &credited)?;
    }

    ctx.emit(Event::Transfer {
        from: Some(from),
        to: Some(to),
        value,
    });
    Ok(())
}

async fn transfer_from(
    ctx: &mut ProcContext<'_>,
    from: Address,
    to: Address,
    value: u128,
) -> Result<(), Error> {
    let spender = ctx.caller();
    let allowed = allowance(&*ctx, &from, &spender).await?;
    if allowed < value {
        return Err(Error::InsufficientAllowance);
    }
    move_balance(ctx, from, to, value).await?;
    let path = allowance_path(&from, &spender);
    match allowed - value {
        0 => ctx.delete(&path),
        remaining => ctx.set(&path, &remaining)?,
    }
    Ok(())
}

fn approve(ctx: &mut ProcContext<'_>, spender: Address, value: u128) -> Result<(), Error> {
    let owner = ctx.caller();
    ctx.set(&allowance_path(&owner, &spender), &value)?;
    ctx.emit(Event::Approval {
        owner,
        spender,
        value,
    });
    Ok(())
}

/// Fungible token ledger. The whole supply is minted to the deployer.
pub struct Token;

#[async_trait]
impl Contract for Token {
    fn interface(&self) -> &'static Interface {
        &INTERFACE
    }

    async fn construct(&self, ctx: &mut ProcContext<'_>, args: &Args) -> Result<(), Error> {
        let initial_supply: u128 = args.get(0)?;
        let deployer = ctx.caller();
        ctx.set(&total_supply_path(), &initial_supply)?;
        ctx.set(&balance_path(&deployer), &initial_supply)?;
        ctx.emit(Event::Transfer {
            from: None,
            to: Some(deployer),
            value: initial_supply,
        });
        Ok(())
    }

    async fn query(
        &self,
        ctx: &ViewContext<'_>,
        selector: &str,
        args: &Args,
    ) -> Result<Value, Error> {
        match selector {
            "total_supply" => Ok(total_supply(ctx).await?.into()),
            "balance_of" => Ok(balance_of(ctx, &args.get(0)?).await?.into()),
            "allowance" => Ok(allowance(ctx, &args.get(0)?, &args.get(1)?).await?.into()),
            _ => Err(self.no_such_entry_point(selector)),
        }
    }

    async fn execute(
        &self,
        ctx: &mut ProcContext<'_>,
        selector: &str,
        args: &Args,
    ) -> Result<Value, Error> {
        match selector {
            "transfer" => {
                let from = ctx.caller();
                move_balance(ctx, from, args.get(0)?, args.get(1)?).await?
            }
            "approve" => approve(ctx, args.get(0)?, args.get(1)?)?,
            "transfer_from" => {
                transfer_from(ctx, args.get(0)?, args.get(1)?, args.get(2)?).await?
            }
            _ => return Err(self.no_such_entry_point(selector)),
        }
        Ok(Value::Unit)
    }
}

pub mod api {
    use crate::runtime::{Address, Error, Runtime};

    use super::INTERFACE;

    pub async fn deploy(
        runtime: &Runtime,
        deployer: Address,
        initial_supply: u128,
    ) -> Result<Address, Error> {
        runtime
            .deploy(deployer, INTERFACE.name, vec![initial_supply.into()])
            .await
    }

    pub async fn total_supply(runtime: &Runtime, token: Address) -> Result<u128, Error> {
        runtime.query(token, "total_supply", vec![]).await?.try_into()
    }

    pub async fn balance_of(runtime: &Runtime, token: Address, who: Address) -> Result<u128, Error> {
        runtime
            .query(token, "balance_of", vec![who.into()])
            .await?
            .try_into()
    }

    pub async fn allowance(
        runtime: &Runtime,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<u128, Error> {
        runtime
            .query(token, "allowance", vec![owner.into(), spender.into()])
            .await?
            .try_into()
    }

    pub async fn transfer(
        runtime: &Runtime,
        token: Address,
        caller: Address,
        to: Address,
        value: u128,
    ) -> Result<(), Error> {
        runtime
            .execute(caller, token, "transfer", vec![to.into(), value.into()])
            .await?
            .try_into()
    }

    pub async fn approve(
        runtime: &Runtime,
        token: Address,
        caller: Address,
        spender: Address,
        value: u128,
    ) -> Result<(), Error> {
        runtime
            .execute(caller, token, "approve", vec![spender.into(), value.into()])
            .await?
            .try_into()
    }

    pub async fn transfer_from(
        runtime: &Runtime,
        token: Address,
        caller: Address,
        from: Address,
        to: Address,
        value: u128,
    ) -> Result<(), Error> {
        runtime
            .execute(
                caller,
                token,
                "transfer_from",
                vec![from.into(), to.into(), value.into()],
            )
            .await?
            .try_into()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;
    use crate::runtime::{Registry, Runtime, RuntimeConfig, Storage, Transaction, serialize_cbor};

    #[tokio::test]
    async fn test_move_balance_overflow_leaves_balances() -> Result<()> {
        let runtime = Runtime::new(
            Storage::in_memory().await?,
            Registry::new(),
            RuntimeConfig::default(),
        );
        let token = Address::from_seed("token");
        let sender = Address::from_seed("sender");
        let receiver = Address::from_seed("receiver");

        let mut tx = Transaction::new(8);
        tx.write(token, balance_path(&sender).to_string(), serialize_cbor(&10u128)?);
        tx.write(
            token,
            balance_path(&receiver).to_string(),
            serialize_cbor(&u128::MAX)?,
        );
        let mut ctx = ProcContext {
            runtime: &runtime,
            tx: &mut tx,
            contract: token,
            caller: sender,
        };

        assert!(matches!(
            move_balance(&mut ctx, sender, receiver, 1).await,
            Err(Error::Overflow)
        ));
        assert_eq!(balance_of(&ctx, &sender).await?, 10);
        assert_eq!(balance_of(&ctx, &receiver).await?, u128::MAX);
        Ok(())
    }
}
