use anyhow::Result;
use crosscall::{
    contracts::owner_test,
    runtime::ErrorKind,
    test_utils::{account, new_runtime},
};

#[tokio::test]
async fn test_flip_contract() -> Result<()> {
    let runtime = new_runtime().await?;
    let deployer = account("deployer");
    let alice = account("alice");

    for initial in [false, true] {
        let contract = owner_test::api::deploy(&runtime, deployer, initial).await?;
        assert_eq!(owner_test::api::get(&runtime, contract).await?, initial);

        owner_test::api::flip(&runtime, contract, deployer).await?;
        assert_eq!(owner_test::api::get(&runtime, contract).await?, !initial);

        // open to any caller
        owner_test::api::flip(&runtime, contract, alice).await?;
        assert_eq!(owner_test::api::get(&runtime, contract).await?, initial);
    }

    Ok(())
}

#[tokio::test]
async fn test_flip_contract_ownership() -> Result<()> {
    let runtime = new_runtime().await?;
    let deployer = account("deployer");
    let alice = account("alice");

    let contract = owner_test::api::deploy(&runtime, deployer, true).await?;
    assert_eq!(owner_test::api::get_owner(&runtime, contract).await?, deployer);

    let err = owner_test::api::transfer_ownership(&runtime, contract, alice, alice)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    owner_test::api::transfer_ownership(&runtime, contract, deployer, alice).await?;
    assert_eq!(owner_test::api::get_owner(&runtime, contract).await?, alice);
    assert!(owner_test::api::get(&runtime, contract).await?);

    let err = owner_test::api::transfer_ownership(&runtime, contract, deployer, deployer)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    Ok(())
}
