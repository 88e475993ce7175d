// crates/quarry-sdk/src/fixtures.rs
//
// Fixtures that stand up a funded reward program for tests and demos.
//
// `create_rewarder` funds the admin, creates a capped reward mint, registers a
// rewarder on it, and gives the rewarder a minter allowance.
// `create_rewarder_and_quarry` then creates a single-unit stake token, opens a
// quarry for it, and sets its share to 1 together with the annual rate in one
// transaction.

use std::sync::Arc;

use quarry_core::crypto::Keypair;
use quarry_core::error::QuarryError;
use quarry_core::identity::Pubkey;
use quarry_core::transaction::{Instruction, LAMPORTS_PER_SOL};
use quarry_ledger::Ledger;

use crate::config::SdkConfig;
use crate::quarry::QuarryWrapper;
use crate::rewarder::RewarderWrapper;
use crate::sdk::QuarrySdk;

/// Knobs for `create_rewarder`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewarderParams {
    pub airdrop_lamports: u64,
    pub reward_decimals: u8,
    pub reward_hard_cap: u64,
    pub minter_allowance: u64,
    pub sdk_config: SdkConfig,
}

impl Default for RewarderParams {
    fn default() -> Self {
        Self {
            airdrop_lamports: 10 * LAMPORTS_PER_SOL,
            reward_decimals: 6,
            // 1B tokens at 6 decimals.
            reward_hard_cap: 1_000_000_000_000_000,
            minter_allowance: 1_000_000_000,
            sdk_config: SdkConfig::default(),
        }
    }
}

pub struct RewarderFixture {
    pub sdk: QuarrySdk,
    pub admin: Arc<Keypair>,
    /// Mint issued as quarry rewards.
    pub rewards_mint: Pubkey,
    pub rewarder: Pubkey,
    pub rewarder_w: RewarderWrapper,
}

pub struct RewarderAndQuarryFixture {
    pub sdk: QuarrySdk,
    pub admin: Arc<Keypair>,
    pub rewards_mint: Pubkey,
    /// The single-unit token staked in the quarry.
    pub stake_mint: Pubkey,
    pub quarry: Pubkey,
    pub quarry_w: QuarryWrapper,
    pub rewarder: Pubkey,
    pub rewarder_w: RewarderWrapper,
}

/// Create a funded rewarder. A fresh admin is generated when `admin` is `None`.
pub async fn create_rewarder(
    ledger: Arc<dyn Ledger>,
    admin: Option<Keypair>,
    params: &RewarderParams,
) -> Result<RewarderFixture, QuarryError> {
    let admin = admin.unwrap_or_else(Keypair::generate);
    ledger.airdrop(&admin.pubkey(), params.airdrop_lamports).await?;
    let sdk = QuarrySdk::new(ledger, admin).with_config(params.sdk_config.clone());

    let (mint_tx, rewards_mint) = sdk
        .mint_wrapper()
        .new_wrapper_and_mint(params.reward_decimals, Some(params.reward_hard_cap));
    mint_tx.confirm().await?;

    let (rewarder_tx, rewarder) = sdk.mine().create_rewarder(&rewards_mint);
    rewarder_tx.confirm().await?;

    sdk.mint_wrapper()
        .new_minter_with_allowance(&rewards_mint, &rewarder, params.minter_allowance)
        .confirm()
        .await?;

    let rewarder_w = sdk.mine().load_rewarder_wrapper(&rewarder).await?;
    tracing::info!("Created rewarder {} for mint {}", rewarder, rewards_mint);

    Ok(RewarderFixture {
        admin: Arc::clone(sdk.wallet()),
        sdk,
        rewards_mint,
        rewarder,
        rewarder_w,
    })
}

/// Create a funded rewarder with one quarry holding the whole share.
///
/// `staked_tokens` are passed to the annual rate sync; the quarry itself
/// stakes a freshly minted single-unit token owned by the admin.
pub async fn create_rewarder_and_quarry(
    ledger: Arc<dyn Ledger>,
    staked_tokens: &[Pubkey],
    annual_rate: u64,
    admin: Option<Keypair>,
    params: &RewarderParams,
) -> Result<RewarderAndQuarryFixture, QuarryError> {
    let RewarderFixture {
        sdk,
        admin,
        rewards_mint,
        rewarder,
        mut rewarder_w,
    } = create_rewarder(ledger, admin, params).await?;

    let stake_mint = mint_single_unit(&sdk).await?;

    let (quarry_tx, quarry) = rewarder_w.create_quarry(&stake_mint);
    quarry_tx.confirm().await?;

    let mut quarry_w = QuarryWrapper::load(sdk.clone(), &stake_mint, &quarry).await?;
    let set_share_tx = quarry_w.set_rewards_share(1);
    let sync_tx = rewarder_w
        .set_and_sync_annual_rewards(annual_rate, staked_tokens)
        .await?;
    set_share_tx.combine(sync_tx).confirm().await?;

    rewarder_w.reload().await?;
    quarry_w.reload().await?;

    Ok(RewarderAndQuarryFixture {
        sdk,
        admin,
        rewards_mint,
        stake_mint,
        quarry,
        quarry_w,
        rewarder,
        rewarder_w,
    })
}

/// Create a 0-decimal mint capped at 1 and mint its only unit to the wallet.
async fn mint_single_unit(sdk: &QuarrySdk) -> Result<Pubkey, QuarryError> {
    let owner = sdk.wallet_key();
    let mint = Pubkey::new_unique();
    sdk.envelope(vec![
        Instruction::CreateMint {
            mint,
            authority: owner,
            decimals: 0,
            hard_cap: Some(1),
        },
        Instruction::GrantAllowance {
            mint,
            authority: owner,
            minter: owner,
            amount: 1,
        },
        Instruction::MintTo {
            mint,
            minter: owner,
            destination: owner,
            amount: 1,
        },
    ])
    .confirm()
    .await?;
    Ok(mint)
}
