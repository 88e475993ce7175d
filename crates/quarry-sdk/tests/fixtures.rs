// crates/quarry-sdk/tests/fixtures.rs

use std::sync::Arc;

use quarry_core::crypto::Keypair;
use quarry_core::error::QuarryError;
use quarry_core::identity::Pubkey;
use quarry_core::transaction::{LAMPORTS_PER_SIGNATURE, LAMPORTS_PER_SOL};
use quarry_economics::emission::SECONDS_PER_YEAR;
use quarry_ledger::{InMemoryLedger, Ledger};
use quarry_sdk::{create_rewarder, create_rewarder_and_quarry, RewarderParams};

fn ledger() -> (Arc<InMemoryLedger>, Arc<dyn Ledger>) {
    let ledger = Arc::new(InMemoryLedger::with_manual_clock(1_700_000_000));
    let dyn_ledger: Arc<dyn Ledger> = ledger.clone();
    (ledger, dyn_ledger)
}

#[tokio::test]
async fn test_create_rewarder() {
    let (_, ledger) = ledger();
    let fx = create_rewarder(ledger.clone(), None, &RewarderParams::default())
        .await
        .unwrap();

    let rewarder = fx.rewarder_w.data();
    assert_eq!(rewarder.key, fx.rewarder);
    assert_eq!(rewarder.authority, fx.admin.pubkey());
    assert_eq!(rewarder.mint, fx.rewards_mint);
    assert_eq!(rewarder.annual_rewards_rate, 0);
    assert_eq!(rewarder.total_rewards_shares, 0);

    let mint = fx.sdk.mint_wrapper().fetch_mint(&fx.rewards_mint).await.unwrap();
    assert_eq!(mint.decimals, 6);
    assert_eq!(mint.hard_cap, Some(1_000_000_000_000_000));

    let minter = fx
        .sdk
        .mint_wrapper()
        .fetch_minter(&fx.rewards_mint, &fx.rewarder)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(minter.allowance, 1_000_000_000);

    // Three transactions, one signature each.
    assert_eq!(
        ledger.balance_of(&fx.admin.pubkey()).await.unwrap(),
        10 * LAMPORTS_PER_SOL - 3 * LAMPORTS_PER_SIGNATURE
    );
}

#[tokio::test]
async fn test_create_rewarder_uses_given_admin() {
    let (_, ledger) = ledger();
    let admin = Keypair::generate();
    let admin_key = admin.pubkey();
    let fx = create_rewarder(ledger, Some(admin), &RewarderParams::default())
        .await
        .unwrap();
    assert_eq!(fx.rewarder_w.data().authority, admin_key);
}

#[tokio::test]
async fn test_each_fixture_creates_a_new_rewarder() {
    let (_, ledger) = ledger();
    let params = RewarderParams::default();
    let a = create_rewarder(ledger.clone(), None, &params).await.unwrap();
    let b = create_rewarder(ledger.clone(), None, &params).await.unwrap();
    assert_ne!(a.rewarder, b.rewarder);
    assert_eq!(ledger.snapshot().await.unwrap().rewarders.len(), 2);
}

#[tokio::test]
async fn test_create_rewarder_and_quarry() {
    let (_, ledger) = ledger();
    // A token with no quarry: the sync skips it.
    let staked = Pubkey::new_unique();
    let fx = create_rewarder_and_quarry(ledger, &[staked], 1_000_000, None, &RewarderParams::default())
        .await
        .unwrap();

    assert_eq!(fx.rewarder_w.data().annual_rewards_rate, 1_000_000);
    assert_eq!(fx.rewarder_w.data().total_rewards_shares, 1);
    assert_eq!(fx.rewarder_w.data().num_quarries, 1);

    let quarry = fx.quarry_w.data();
    assert_eq!(quarry.key, fx.quarry);
    assert_eq!(quarry.token_mint, fx.stake_mint);
    assert_eq!(quarry.rewards_share, 1);
    assert_eq!(quarry.annual_rewards_rate, 1_000_000);

    let balance = fx
        .sdk
        .mint_wrapper()
        .balance(&fx.admin.pubkey(), &fx.stake_mint)
        .await
        .unwrap();
    assert_eq!(balance, 1);
}

#[tokio::test]
async fn test_full_year_of_mining() {
    let (clock, ledger) = ledger();
    let fx = create_rewarder_and_quarry(ledger, &[], 1_000_000, None, &RewarderParams::default())
        .await
        .unwrap();

    fx.quarry_w
        .create_miner()
        .combine(fx.quarry_w.stake(1))
        .confirm()
        .await
        .unwrap();
    clock.advance(SECONDS_PER_YEAR as i64).await;
    fx.quarry_w.claim().confirm().await.unwrap();

    let mint_wrapper = fx.sdk.mint_wrapper();
    assert_eq!(
        mint_wrapper.balance(&fx.admin.pubkey(), &fx.rewards_mint).await.unwrap(),
        1_000_000
    );
    let minter = mint_wrapper
        .fetch_minter(&fx.rewards_mint, &fx.rewarder)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(minter.allowance, 1_000_000_000 - 1_000_000);
    assert_eq!(minter.total_minted, 1_000_000);

    fx.quarry_w.withdraw(1).confirm().await.unwrap();
    let miner = fx.quarry_w.fetch_miner(&fx.admin.pubkey()).await.unwrap().unwrap();
    assert_eq!(miner.balance, 0);
    assert_eq!(miner.rewards_earned, 0);
}

#[tokio::test]
async fn test_claim_beyond_allowance() {
    let (clock, ledger) = ledger();
    let fx = create_rewarder_and_quarry(ledger, &[], 2_000_000_000, None, &RewarderParams::default())
        .await
        .unwrap();
    fx.quarry_w
        .create_miner()
        .combine(fx.quarry_w.stake(1))
        .confirm()
        .await
        .unwrap();
    clock.advance(SECONDS_PER_YEAR as i64).await;

    let result = fx.quarry_w.claim().confirm().await;
    assert!(matches!(result, Err(QuarryError::AllowanceExceeded { .. })));
    // Nothing was paid and the earned rewards are still owed.
    assert_eq!(
        fx.sdk
            .mint_wrapper()
            .balance(&fx.admin.pubkey(), &fx.rewards_mint)
            .await
            .unwrap(),
        0
    );
}
