// crates/quarry-economics/src/rewarder.rs
//
// Rewarder registry: global emission configuration for each reward program.
//
// A rewarder is bound to one reward mint and holds the annual rate shared by
// all of its quarries. Only its authority may change the rate or create
// quarries. `total_rewards_shares` always equals the sum of its quarries'
// shares; the quarry pool set maintains that when shares change.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use quarry_core::error::QuarryError;
use quarry_core::identity::{rewarder_address, Pubkey};

use crate::emission::MAX_ANNUAL_REWARDS_RATE;
use crate::quarry::QuarryPoolSet;
use crate::sync::{self, RateUpdate};
use crate::token::Mint;

/// Controls token rewards distribution to all quarries under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewarder {
    pub key: Pubkey,
    /// Random key the rewarder address was derived from.
    pub base: Pubkey,
    /// Authority who controls the rewarder.
    pub authority: Pubkey,
    /// Pending authority which must accept the authority.
    pub pending_authority: Pubkey,
    /// Mint of the rewards token.
    pub mint: Pubkey,
    /// Decimals of the rewards token.
    pub mint_decimals: u8,
    /// Number of quarries the rewarder manages.
    pub num_quarries: u16,
    /// Amount of reward tokens distributed per year.
    pub annual_rewards_rate: u64,
    /// Total amount of rewards shares allocated to quarries.
    pub total_rewards_shares: u64,
    /// Unix timestamp of creation.
    pub created_at: i64,
}

impl Rewarder {
    /// Check that `authority` controls this rewarder.
    pub fn assert_authority(&self, authority: &Pubkey) -> Result<(), QuarryError> {
        if self.authority != *authority {
            return Err(QuarryError::Unauthorized(format!(
                "{} is not the authority of rewarder {}",
                authority, self.key
            )));
        }
        Ok(())
    }

    /// Annual rewards rate for a quarry holding `quarry_rewards_share`.
    ///
    /// `floor(annual_rate * share / total_shares)`, or 0 when there are no
    /// shares. Fails with `InvalidAmount` if the share exceeds the total.
    pub fn compute_quarry_annual_rewards_rate(&self, quarry_rewards_share: u64) -> Result<u64, QuarryError> {
        sync::compute_rate(
            self.annual_rewards_rate,
            quarry_rewards_share,
            self.total_rewards_shares,
        )
    }
}

/// All rewarders, keyed by address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewarderRegistry {
    rewarders: BTreeMap<Pubkey, Rewarder>,
}

impl RewarderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rewarder with annual rate 0 and no shares.
    ///
    /// The address is derived from `base`; a fresh base gives a distinct
    /// rewarder on every call.
    ///
    /// # Errors
    /// `AlreadyExists` if `base` was already used.
    pub fn create_rewarder(
        &mut self,
        base: Pubkey,
        authority: Pubkey,
        mint: &Mint,
        now: i64,
    ) -> Result<&Rewarder, QuarryError> {
        let key = rewarder_address(&base);
        if self.rewarders.contains_key(&key) {
            return Err(QuarryError::AlreadyExists(format!("Rewarder {}", key)));
        }
        let rewarder = Rewarder {
            key,
            base,
            authority,
            pending_authority: Pubkey::default(),
            mint: mint.key,
            mint_decimals: mint.decimals,
            num_quarries: 0,
            annual_rewards_rate: 0,
            total_rewards_shares: 0,
            created_at: now,
        };
        Ok(self.rewarders.entry(key).or_insert(rewarder))
    }

    pub fn get(&self, key: &Pubkey) -> Option<&Rewarder> {
        self.rewarders.get(key)
    }

    /// Look up a rewarder, failing with `NotFound`.
    pub fn require(&self, key: &Pubkey) -> Result<&Rewarder, QuarryError> {
        self.rewarders
            .get(key)
            .ok_or_else(|| QuarryError::NotFound(format!("Rewarder {}", key)))
    }

    pub(crate) fn require_mut(&mut self, key: &Pubkey) -> Result<&mut Rewarder, QuarryError> {
        self.rewarders
            .get_mut(key)
            .ok_or_else(|| QuarryError::NotFound(format!("Rewarder {}", key)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rewarder> {
        self.rewarders.values()
    }

    pub fn len(&self) -> usize {
        self.rewarders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewarders.is_empty()
    }

    /// Set the annual rate of `rewarder` and resynchronize all of its quarries.
    ///
    /// Returns the previous rate and the quarry updates that were applied.
    ///
    /// # Errors
    /// `NotFound`, `Unauthorized` if `authority` does not control the rewarder,
    /// `InvalidAmount` if `rate` exceeds `MAX_ANNUAL_REWARDS_RATE`, or any
    /// payroll checkpoint error. Nothing changes on error.
    pub fn set_annual_rate(
        &mut self,
        rewarder: &Pubkey,
        authority: &Pubkey,
        rate: u64,
        pools: &mut QuarryPoolSet,
        now: i64,
    ) -> Result<(u64, Vec<RateUpdate>), QuarryError> {
        let current = self.require(rewarder)?;
        current.assert_authority(authority)?;
        if rate > MAX_ANNUAL_REWARDS_RATE {
            return Err(QuarryError::InvalidAmount(format!(
                "Annual rate {} exceeds maximum {}",
                rate, MAX_ANNUAL_REWARDS_RATE
            )));
        }

        let previous_rate = current.annual_rewards_rate;
        let updates = sync::plan(
            rate,
            current.total_rewards_shares,
            &pools.quarries_for(rewarder),
            None,
            now,
        )?;

        self.require_mut(rewarder)?.annual_rewards_rate = rate;
        sync::apply(pools, &updates);
        Ok((previous_rate, updates))
    }

    /// Propose `new_authority` as the next authority of `rewarder`.
    pub fn transfer_authority(
        &mut self,
        rewarder: &Pubkey,
        authority: &Pubkey,
        new_authority: Pubkey,
    ) -> Result<(), QuarryError> {
        let r = self.require_mut(rewarder)?;
        r.assert_authority(authority)?;
        r.pending_authority = new_authority;
        Ok(())
    }

    /// Accept a pending authority transfer. Must be called by the pending authority.
    pub fn accept_authority(&mut self, rewarder: &Pubkey, new_authority: &Pubkey) -> Result<(), QuarryError> {
        let r = self.require_mut(rewarder)?;
        if r.pending_authority.is_default() || r.pending_authority != *new_authority {
            return Err(QuarryError::Unauthorized(format!(
                "{} is not the pending authority of rewarder {}",
                new_authority, r.key
            )));
        }
        r.authority = r.pending_authority;
        r.pending_authority = Pubkey::default();
        Ok(())
    }
}
