use proptest::prelude::*;

use crosscall::{
    contracts::token,
    test_utils::{account, new_runtime},
};

const ACCOUNTS: [&str; 4] = ["deployer", "alice", "bob", "carol"];

fn gen_transfer() -> impl Strategy<Value = (usize, usize, u128)> {
    (0..ACCOUNTS.len(), 0..ACCOUNTS.len(), 0..400u128)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 32,
        .. ProptestConfig::default()
    })]

    #[test]
    fn test_transfers_conserve_supply(
        supply in 0..1_000u128,
        transfers in prop::collection::vec(gen_transfer(), 1..20),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let runtime = new_runtime().await.unwrap();
            let accounts = ACCOUNTS.map(account);
            let token = token::api::deploy(&runtime, accounts[0], supply).await.unwrap();

            let mut expected = [supply, 0, 0, 0];
            for (from, to, value) in transfers {
                let result =
                    token::api::transfer(&runtime, token, accounts[from], accounts[to], value)
                        .await;
                if expected[from] >= value {
                    assert!(result.is_ok());
                    expected[from] -= value;
                    expected[to] += value;
                } else {
                    assert!(result.is_err());
                }
            }

            let mut total = 0;
            for (i, who) in accounts.iter().enumerate() {
                let balance = token::api::balance_of(&runtime, token, *who).await.unwrap();
                assert_eq!(balance, expected[i]);
                total += balance;
            }
            assert_eq!(total, supply);
            assert_eq!(token::api::total_supply(&runtime, token).await.unwrap(), supply);
        });
    }
}
