use async_trait::async_trait;

use crate::{
    contracts::ownable::{GET_OWNER, Ownable, TRANSFER_OWNERSHIP},
    runtime::{
        Address, Args, Contract, DotPathBuf, Error, Interface, ProcContext, ReadContext, Value,
        ViewContext,
    },
};

pub static INTERFACE: Interface = Interface {
    name: "owner",
    constructor: &[],
    entry_points: &[GET_OWNER, TRANSFER_OWNERSHIP],
};

fn owner_path() -> DotPathBuf {
    DotPathBuf::new().push("owner")
}

async fn load(ctx: &impl ReadContext) -> Result<Ownable, Error> {
    ctx.get(&owner_path())
        .await?
        .ok_or_else(|| Error::Storage(format!("{} has no owner", ctx.address())))
}

/// Stand-alone ownership guard; the deployer is the first owner.
pub struct Owner;

#[async_trait]
impl Contract for Owner {
    fn interface(&self) -> &'static Interface {
        &INTERFACE
    }

    async fn construct(&self, ctx: &mut ProcContext<'_>, _args: &Args) -> Result<(), Error> {
        let ownable = Ownable::new(ctx.caller());
        ctx.set(&owner_path(), &ownable)?;
        ctx.emit(ownable.created());
        Ok(())
    }

    async fn query(
        &self,
        ctx: &ViewContext<'_>,
        selector: &str,
        _args: &Args,
    ) -> Result<Value, Error> {
        match selector {
            "get_owner" => Ok(load(ctx).await?.owner().into()),
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
            "transfer_ownership" => {
                let mut ownable = load(&*ctx).await?;
                let new_owner: Address = args.get(0)?;
                let event = ownable.transfer_ownership(&ctx.caller(), new_owner)?;
                ctx.set(&owner_path(), &ownable)?;
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

    pub async fn deploy(runtime: &Runtime, deployer: Address) -> Result<Address, Error> {
        runtime.deploy(deployer, INTERFACE.name, vec![]).await
    }

    pub async fn get_owner(runtime: &Runtime, contract: Address) -> Result<Address, Error> {
        runtime.query(contract, "get_owner", vec![]).await?.try_into()
    }

    pub async fn transfer_ownership(
        runtime: &Runtime,
        contract: Address,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), Error> {
        runtime
            .execute(caller, contract, "transfer_ownership", vec![new_owner.into()])
            .await?
            .try_into()
    }
}
