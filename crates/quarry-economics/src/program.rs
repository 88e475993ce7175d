// crates/quarry-economics/src/program.rs
//
// The reward program: executes transaction instructions against the full
// economic state.
//
// A transaction runs against a copy of the state and is committed only if
// every instruction succeeds, so a failed transaction leaves no trace.

use serde::{Deserialize, Serialize};

use quarry_core::error::QuarryError;
use quarry_core::events::ProgramEvent;
use quarry_core::identity::{miner_address, Pubkey};
use quarry_core::transaction::Instruction;

use crate::miner::{Miner, MinerSet, StakeAction};
use crate::mint::MintAuthority;
use crate::quarry::{Quarry, QuarryPoolSet};
use crate::rewarder::{Rewarder, RewarderRegistry};
use crate::sync::RateUpdate;

/// Everything the reward program owns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramState {
    pub mints: MintAuthority,
    pub rewarders: RewarderRegistry,
    pub quarries: QuarryPoolSet,
    pub miners: MinerSet,
}

fn rewarder_of<'a>(
    quarries: &QuarryPoolSet,
    rewarders: &'a RewarderRegistry,
    quarry: &Pubkey,
) -> Result<&'a Rewarder, QuarryError> {
    let rewarder = quarries.require(quarry)?.rewarder;
    rewarders.require(&rewarder)
}

fn rate_events(updates: &[RateUpdate], now: i64) -> impl Iterator<Item = ProgramEvent> + '_ {
    updates.iter().map(move |u| ProgramEvent::QuarryRewardsUpdate {
        quarry: u.quarry,
        token_mint: u.token_mint,
        annual_rewards_rate: u.annual_rewards_rate,
        rewards_share: u.rewards_share,
        timestamp: now,
    })
}

impl ProgramState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute `instructions` in order as one atomic unit.
    ///
    /// `signers` are the identities whose signatures were verified.
    ///
    /// # Errors
    /// The first instruction error. The state is unchanged on error.
    pub fn execute(
        &mut self,
        signers: &[Pubkey],
        instructions: &[Instruction],
        now: i64,
    ) -> Result<Vec<ProgramEvent>, QuarryError> {
        let mut working = self.clone();
        let mut events = Vec::new();
        for ix in instructions {
            if let Some(required) = ix.required_signer() {
                if !signers.contains(required) {
                    return Err(QuarryError::Unauthorized(format!(
                        "{} requires a signature from {}",
                        ix.name(),
                        required
                    )));
                }
            }
            events.extend(working.process(ix, now)?);
        }
        *self = working;
        Ok(events)
    }

    fn process(&mut self, ix: &Instruction, now: i64) -> Result<Vec<ProgramEvent>, QuarryError> {
        match ix {
            Instruction::CreateMint {
                mint,
                authority,
                decimals,
                hard_cap,
            } => {
                self.mints.create_mint(*mint, *authority, *decimals, *hard_cap)?;
                Ok(vec![ProgramEvent::NewMint {
                    mint: *mint,
                    authority: *authority,
                    decimals: *decimals,
                    hard_cap: *hard_cap,
                }])
            }
            Instruction::GrantAllowance {
                mint,
                authority,
                minter,
                amount,
            } => {
                let previous_allowance = self.mints.grant(authority, minter, mint, *amount)?;
                Ok(vec![ProgramEvent::MinterAllowanceUpdate {
                    mint: *mint,
                    minter: *minter,
                    previous_allowance,
                    allowance: self.mints.allowances().remaining(minter, mint),
                }])
            }
            Instruction::SetAllowance {
                mint,
                authority,
                minter,
                allowance,
            } => {
                let previous_allowance = self.mints.set_allowance(authority, minter, mint, *allowance)?;
                Ok(vec![ProgramEvent::MinterAllowanceUpdate {
                    mint: *mint,
                    minter: *minter,
                    previous_allowance,
                    allowance: *allowance,
                }])
            }
            Instruction::MintTo {
                mint,
                minter,
                destination,
                amount,
            } => {
                self.mints.mint_to(destination, mint, *amount, minter)?;
                Ok(vec![ProgramEvent::MinterMint {
                    mint: *mint,
                    minter: *minter,
                    amount: *amount,
                    destination: *destination,
                }])
            }
            Instruction::Transfer {
                mint,
                owner,
                destination,
                amount,
            } => {
                self.mints.transfer(owner, destination, mint, *amount)?;
                Ok(vec![])
            }
            Instruction::CreateRewarder { base, authority, mint } => {
                let reward_mint = self.mints.require_mint(mint)?;
                let rewarder = self.rewarders.create_rewarder(*base, *authority, reward_mint, now)?;
                Ok(vec![ProgramEvent::NewRewarder {
                    rewarder: rewarder.key,
                    authority: *authority,
                    mint: *mint,
                    timestamp: now,
                }])
            }
            Instruction::TransferAuthority {
                rewarder,
                authority,
                new_authority,
            } => {
                self.rewarders.transfer_authority(rewarder, authority, *new_authority)?;
                Ok(vec![])
            }
            Instruction::AcceptAuthority {
                rewarder,
                new_authority,
            } => {
                self.rewarders.accept_authority(rewarder, new_authority)?;
                Ok(vec![ProgramEvent::RewarderAuthorityUpdate {
                    rewarder: *rewarder,
                    authority: *new_authority,
                }])
            }
            Instruction::SetAnnualRewards {
                rewarder,
                authority,
                rate,
            } => {
                let (previous_rate, updates) =
                    self.rewarders
                        .set_annual_rate(rewarder, authority, *rate, &mut self.quarries, now)?;
                let mut events = vec![ProgramEvent::RewarderAnnualRewardsUpdate {
                    rewarder: *rewarder,
                    previous_rate,
                    new_rate: *rate,
                    timestamp: now,
                }];
                events.extend(rate_events(&updates, now));
                Ok(events)
            }
            Instruction::CreateQuarry {
                rewarder,
                authority,
                token_mint,
            } => {
                let token = self.mints.require_mint(token_mint)?;
                let r = self.rewarders.require_mut(rewarder)?;
                let quarry = self.quarries.create_quarry(r, authority, token, now)?;
                Ok(vec![ProgramEvent::QuarryCreate {
                    rewarder: *rewarder,
                    quarry: quarry.key,
                    token_mint: *token_mint,
                    index: quarry.index,
                    timestamp: now,
                }])
            }
            Instruction::SetRewardsShare {
                quarry,
                authority,
                share,
            } => {
                let rewarder_key = self.quarries.require(quarry)?.rewarder;
                let r = self.rewarders.require_mut(&rewarder_key)?;
                let updates = self.quarries.set_share(r, quarry, authority, *share, now)?;
                Ok(rate_events(&updates, now).collect())
            }
            Instruction::SetFamine {
                quarry,
                authority,
                famine_ts,
            } => {
                let r = rewarder_of(&self.quarries, &self.rewarders, quarry)?;
                self.quarries.set_famine(r, quarry, authority, *famine_ts, now)?;
                Ok(vec![])
            }
            Instruction::UpdateQuarryRewards { quarry } => {
                let r = rewarder_of(&self.quarries, &self.rewarders, quarry)?;
                let update = self.quarries.update_rewards(r, quarry, now)?;
                Ok(rate_events(&[update], now).collect())
            }
            Instruction::CreateMiner { quarry, authority } => {
                let miner = self.miners.create_miner(&mut self.quarries, quarry, *authority)?;
                Ok(vec![ProgramEvent::MinerCreate {
                    quarry: *quarry,
                    miner: miner.key,
                    authority: *authority,
                }])
            }
            Instruction::StakeTokens {
                quarry,
                authority,
                amount,
            } => {
                self.stake_action(quarry, authority, StakeAction::Stake, *amount, now)?;
                Ok(vec![ProgramEvent::Stake {
                    quarry: *quarry,
                    authority: *authority,
                    amount: *amount,
                    timestamp: now,
                }])
            }
            Instruction::WithdrawTokens {
                quarry,
                authority,
                amount,
            } => {
                self.stake_action(quarry, authority, StakeAction::Withdraw, *amount, now)?;
                Ok(vec![ProgramEvent::Withdraw {
                    quarry: *quarry,
                    authority: *authority,
                    amount: *amount,
                    timestamp: now,
                }])
            }
            Instruction::ClaimRewards { quarry, authority } => {
                let r = rewarder_of(&self.quarries, &self.rewarders, quarry)?;
                let amount = self.miners.claim(&mut self.quarries, r, quarry, authority, now)?;
                if amount > 0 {
                    // The rewarder mints claims against its own allowance.
                    self.mints.mint_to(authority, &r.mint, amount, &r.key)?;
                }
                Ok(vec![ProgramEvent::Claim {
                    quarry: *quarry,
                    authority: *authority,
                    amount,
                    timestamp: now,
                }])
            }
        }
    }

    /// Move the staked tokens between the authority and the miner's vault.
    fn stake_action(
        &mut self,
        quarry: &Pubkey,
        authority: &Pubkey,
        action: StakeAction,
        amount: u64,
        now: i64,
    ) -> Result<(), QuarryError> {
        let token_mint = self.quarries.require(quarry)?.token_mint;
        let vault = miner_address(quarry, authority);
        let r = rewarder_of(&self.quarries, &self.rewarders, quarry)?.clone();
        self.miners
            .process_stake_action(&mut self.quarries, &r, quarry, authority, action, amount, now)?;
        if amount == 0 {
            return Ok(());
        }
        match action {
            StakeAction::Stake => self.mints.transfer(authority, &vault, &token_mint, amount),
            StakeAction::Withdraw => self.mints.transfer(&vault, authority, &token_mint, amount),
        }
    }

    pub fn rewarder(&self, key: &Pubkey) -> Option<&Rewarder> {
        self.rewarders.get(key)
    }

    pub fn quarry(&self, key: &Pubkey) -> Option<&Quarry> {
        self.quarries.get(key)
    }

    pub fn miner(&self, quarry: &Pubkey, authority: &Pubkey) -> Option<&Miner> {
        self.miners.get(&miner_address(quarry, authority))
    }

    /// Token balance of `owner` in `mint`.
    pub fn balance(&self, owner: &Pubkey, mint: &Pubkey) -> u64 {
        self.mints.balance(owner, mint)
    }
}
