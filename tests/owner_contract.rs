use anyhow::Result;
use crosscall::{
    contracts::owner,
    runtime::{Error, Event},
    test_utils::{account, new_runtime},
};

#[tokio::test]
async fn test_owner_contract() -> Result<()> {
    let runtime = new_runtime().await?;
    let deployer = account("deployer");
    let alice = account("alice");

    let contract = owner::api::deploy(&runtime, deployer).await?;
    assert_eq!(owner::api::get_owner(&runtime, contract).await?, deployer);

    owner::api::transfer_ownership(&runtime, contract, deployer, alice).await?;
    assert_eq!(owner::api::get_owner(&runtime, contract).await?, alice);

    let result = owner::api::transfer_ownership(&runtime, contract, deployer, deployer).await;
    assert_eq!(result, Err(Error::Unauthorized(deployer)));
    assert_eq!(owner::api::get_owner(&runtime, contract).await?, alice);

    owner::api::transfer_ownership(&runtime, contract, alice, alice).await?;
    assert_eq!(owner::api::get_owner(&runtime, contract).await?, alice);

    Ok(())
}

#[tokio::test]
async fn test_owner_contract_events() -> Result<()> {
    let runtime = new_runtime().await?;
    let deployer = account("deployer");
    let alice = account("alice");
    let mallory = account("mallory");

    let contract = owner::api::deploy(&runtime, deployer).await?;
    assert!(
        owner::api::transfer_ownership(&runtime, contract, mallory, mallory)
            .await
            .is_err()
    );
    owner::api::transfer_ownership(&runtime, contract, deployer, alice).await?;

    let events = runtime.events(&contract).await?;
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0].event,
        Event::OwnershipTransferred {
            previous_owner: None,
            new_owner: deployer,
        }
    );
    assert_eq!(
        events[1].event,
        Event::OwnershipTransferred {
            previous_owner: Some(deployer),
            new_owner: alice,
        }
    );
    assert!(events[0].version < events[1].version);

    Ok(())
}

#[tokio::test]
async fn test_owner_contracts_are_independent() -> Result<()> {
    let runtime = new_runtime().await?;
    let deployer = account("deployer");
    let alice = account("alice");

    let first = owner::api::deploy(&runtime, deployer).await?;
    let second = owner::api::deploy(&runtime, deployer).await?;
    assert_ne!(first, second);

    owner::api::transfer_ownership(&runtime, first, deployer, alice).await?;
    assert_eq!(owner::api::get_owner(&runtime, first).await?, alice);
    assert_eq!(owner::api::get_owner(&runtime, second).await?, deployer);

    Ok(())
}
