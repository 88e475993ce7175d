// crates/quarry-core/src/transaction.rs
//
// Instructions, signed transactions, and the receipts handed back by a
// ledger on submission.
//
// A transaction is a list of instructions executed all-or-nothing. Each
// instruction names the identity acting on it (`authority`, `minter`, ...);
// the processor requires that identity to be one of the transaction signers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::{verify_signature, Keypair};
use crate::error::QuarryError;
use crate::events::ProgramEvent;
use crate::identity::Pubkey;

/// Fee charged to the fee payer per signature, in lamports.
pub const LAMPORTS_PER_SIGNATURE: u64 = 5_000;

/// Lamports in one unit of the native fee currency.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// A single state transition understood by the reward program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Instruction {
    // ---------------------------------------------------------------
    // Mint authority
    // ---------------------------------------------------------------
    /// Register a new token mint administered by `authority`.
    CreateMint {
        mint: Pubkey,
        authority: Pubkey,
        decimals: u8,
        hard_cap: Option<u64>,
    },
    /// Increase `minter`'s allowance on `mint`. Signed by the mint authority.
    GrantAllowance {
        mint: Pubkey,
        authority: Pubkey,
        minter: Pubkey,
        amount: u64,
    },
    /// Overwrite `minter`'s allowance on `mint`. Signed by the mint authority.
    SetAllowance {
        mint: Pubkey,
        authority: Pubkey,
        minter: Pubkey,
        allowance: u64,
    },
    /// Mint `amount` to `destination` against `minter`'s allowance.
    MintTo {
        mint: Pubkey,
        minter: Pubkey,
        destination: Pubkey,
        amount: u64,
    },
    /// Move tokens between owners.
    Transfer {
        mint: Pubkey,
        owner: Pubkey,
        destination: Pubkey,
        amount: u64,
    },

    // ---------------------------------------------------------------
    // Rewarder
    // ---------------------------------------------------------------
    /// Create a rewarder at the address derived from `base`.
    CreateRewarder {
        base: Pubkey,
        authority: Pubkey,
        mint: Pubkey,
    },
    /// Propose a new rewarder authority.
    TransferAuthority {
        rewarder: Pubkey,
        authority: Pubkey,
        new_authority: Pubkey,
    },
    /// Accept a proposed rewarder authority. Signed by the new authority.
    AcceptAuthority {
        rewarder: Pubkey,
        new_authority: Pubkey,
    },
    /// Set the rewarder's annual rate and resync every quarry.
    SetAnnualRewards {
        rewarder: Pubkey,
        authority: Pubkey,
        rate: u64,
    },

    // ---------------------------------------------------------------
    // Quarry
    // ---------------------------------------------------------------
    /// Create the quarry for `token_mint` under `rewarder`.
    CreateQuarry {
        rewarder: Pubkey,
        authority: Pubkey,
        token_mint: Pubkey,
    },
    /// Set a quarry's rewards share and resync every quarry of its rewarder.
    SetRewardsShare {
        quarry: Pubkey,
        authority: Pubkey,
        share: u64,
    },
    /// Set the time after which a quarry stops accruing rewards.
    SetFamine {
        quarry: Pubkey,
        authority: Pubkey,
        famine_ts: i64,
    },
    /// Checkpoint a quarry's payroll and recompute its rate. Anyone may call.
    UpdateQuarryRewards { quarry: Pubkey },

    // ---------------------------------------------------------------
    // Miner
    // ---------------------------------------------------------------
    CreateMiner { quarry: Pubkey, authority: Pubkey },
    StakeTokens {
        quarry: Pubkey,
        authority: Pubkey,
        amount: u64,
    },
    WithdrawTokens {
        quarry: Pubkey,
        authority: Pubkey,
        amount: u64,
    },
    ClaimRewards { quarry: Pubkey, authority: Pubkey },
}

impl Instruction {
    /// Identity that must sign for this instruction, if any.
    pub fn required_signer(&self) -> Option<&Pubkey> {
        match self {
            Instruction::CreateMint { authority, .. }
            | Instruction::GrantAllowance { authority, .. }
            | Instruction::SetAllowance { authority, .. }
            | Instruction::CreateRewarder { authority, .. }
            | Instruction::TransferAuthority { authority, .. }
            | Instruction::SetAnnualRewards { authority, .. }
            | Instruction::CreateQuarry { authority, .. }
            | Instruction::SetRewardsShare { authority, .. }
            | Instruction::SetFamine { authority, .. }
            | Instruction::CreateMiner { authority, .. }
            | Instruction::StakeTokens { authority, .. }
            | Instruction::WithdrawTokens { authority, .. }
            | Instruction::ClaimRewards { authority, .. } => Some(authority),
            Instruction::MintTo { minter, .. } => Some(minter),
            Instruction::Transfer { owner, .. } => Some(owner),
            Instruction::AcceptAuthority { new_authority, .. } => Some(new_authority),
            Instruction::UpdateQuarryRewards { .. } => None,
        }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Instruction::CreateMint { .. } => "create_mint",
            Instruction::GrantAllowance { .. } => "grant_allowance",
            Instruction::SetAllowance { .. } => "set_allowance",
            Instruction::MintTo { .. } => "mint_to",
            Instruction::Transfer { .. } => "transfer",
            Instruction::CreateRewarder { .. } => "create_rewarder",
            Instruction::TransferAuthority { .. } => "transfer_authority",
            Instruction::AcceptAuthority { .. } => "accept_authority",
            Instruction::SetAnnualRewards { .. } => "set_annual_rewards",
            Instruction::CreateQuarry { .. } => "create_quarry",
            Instruction::SetRewardsShare { .. } => "set_rewards_share",
            Instruction::SetFamine { .. } => "set_famine",
            Instruction::UpdateQuarryRewards { .. } => "update_quarry_rewards",
            Instruction::CreateMiner { .. } => "create_miner",
            Instruction::StakeTokens { .. } => "stake_tokens",
            Instruction::WithdrawTokens { .. } => "withdraw_tokens",
            Instruction::ClaimRewards { .. } => "claim_rewards",
        }
    }
}

/// A signature over a transaction message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureEntry {
    pub signer: Pubkey,
    /// Hex-encoded 64-byte ed25519 signature.
    pub signature: String,
}

/// The signed payload of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub fee_payer: Pubkey,
    /// Makes otherwise identical transactions distinct.
    pub nonce: Uuid,
    pub instructions: Vec<Instruction>,
}

impl Message {
    pub fn new(fee_payer: Pubkey, instructions: Vec<Instruction>) -> Self {
        Self {
            fee_payer,
            nonce: Uuid::now_v7(),
            instructions,
        }
    }

    /// Canonical bytes that signers sign.
    pub fn to_bytes(&self) -> Result<Vec<u8>, QuarryError> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// A message plus the signatures of every signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub message: Message,
    pub signatures: Vec<SignatureEntry>,
}

impl Transaction {
    /// Build and sign a transaction. The first signer pays the fee.
    pub fn new_signed(instructions: Vec<Instruction>, signers: &[&Keypair]) -> Result<Self, QuarryError> {
        let fee_payer = signers
            .first()
            .map(|kp| kp.pubkey())
            .ok_or_else(|| QuarryError::InvalidSignature("Transaction needs at least one signer".to_string()))?;
        let message = Message::new(fee_payer, instructions);
        let bytes = message.to_bytes()?;

        let mut signatures: Vec<SignatureEntry> = Vec::with_capacity(signers.len());
        for kp in signers {
            let signer = kp.pubkey();
            if signatures.iter().any(|s| s.signer == signer) {
                continue;
            }
            signatures.push(SignatureEntry {
                signer,
                signature: hex::encode(kp.sign(&bytes)),
            });
        }

        Ok(Self { message, signatures })
    }

    /// Verify every signature and that the fee payer signed.
    ///
    /// Returns the list of verified signer keys.
    pub fn verify(&self) -> Result<Vec<Pubkey>, QuarryError> {
        let bytes = self.message.to_bytes()?;
        let mut signers = Vec::with_capacity(self.signatures.len());
        for entry in &self.signatures {
            let sig = hex::decode(&entry.signature)?;
            if !verify_signature(&entry.signer, &bytes, &sig)? {
                return Err(QuarryError::InvalidSignature(format!(
                    "Signature by {} does not match the message",
                    entry.signer
                )));
            }
            signers.push(entry.signer);
        }
        if !signers.contains(&self.message.fee_payer) {
            return Err(QuarryError::InvalidSignature(format!(
                "Fee payer {} did not sign",
                self.message.fee_payer
            )));
        }
        Ok(signers)
    }

    /// Fee for this transaction in lamports.
    pub fn fee(&self) -> u64 {
        LAMPORTS_PER_SIGNATURE * self.signatures.len() as u64
    }
}

/// Handle returned by a ledger when a transaction is accepted for processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
}

impl Receipt {
    pub fn new() -> Self {
        Self {
            id: Uuid::now_v7(),
            submitted_at: Utc::now(),
        }
    }
}

impl Default for Receipt {
    fn default() -> Self {
        Self::new()
    }
}

/// Final outcome of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Confirmation {
    /// Applied at `slot`; all of its instructions took effect.
    Success { slot: u64, events: Vec<ProgramEvent> },
    /// Rejected; none of its instructions took effect.
    Failure { error: QuarryError },
}

impl Confirmation {
    pub fn is_success(&self) -> bool {
        matches!(self, Confirmation::Success { .. })
    }

    /// Convert into a `Result`, surfacing the program error on failure.
    pub fn into_result(self) -> Result<(u64, Vec<ProgramEvent>), QuarryError> {
        match self {
            Confirmation::Success { slot, events } => Ok((slot, events)),
            Confirmation::Failure { error } => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_instruction(authority: Pubkey) -> Instruction {
        Instruction::SetAnnualRewards {
            rewarder: Pubkey::new([7u8; 32]),
            authority,
            rate: 1_000,
        }
    }

    #[test]
    fn test_signed_transaction_verifies() {
        let admin = Keypair::generate();
        let tx = Transaction::new_signed(vec![sample_instruction(admin.pubkey())], &[&admin]).unwrap();
        let signers = tx.verify().unwrap();
        assert_eq!(signers, vec![admin.pubkey()]);
        assert_eq!(tx.fee(), LAMPORTS_PER_SIGNATURE);
    }

    #[test]
    fn test_tampered_transaction_rejected() {
        let admin = Keypair::generate();
        let mut tx = Transaction::new_signed(vec![sample_instruction(admin.pubkey())], &[&admin]).unwrap();
        tx.message.instructions.push(Instruction::UpdateQuarryRewards {
            quarry: Pubkey::new([1u8; 32]),
        });
        assert!(matches!(tx.verify(), Err(QuarryError::InvalidSignature(_))));
    }

    #[test]
    fn test_duplicate_signers_sign_once() {
        let admin = Keypair::generate();
        let tx = Transaction::new_signed(vec![], &[&admin, &admin]).unwrap();
        assert_eq!(tx.signatures.len(), 1);
    }

    #[test]
    fn test_no_signers_is_error() {
        assert!(Transaction::new_signed(vec![], &[]).is_err());
    }

    #[test]
    fn test_required_signer() {
        let minter = Pubkey::new([3u8; 32]);
        let ix = Instruction::MintTo {
            mint: Pubkey::new([1u8; 32]),
            minter,
            destination: Pubkey::new([2u8; 32]),
            amount: 5,
        };
        assert_eq!(ix.required_signer(), Some(&minter));
        assert_eq!(
            Instruction::UpdateQuarryRewards { quarry: minter }.required_signer(),
            None
        );
    }

    #[test]
    fn test_confirmation_into_result() {
        let failure = Confirmation::Failure {
            error: QuarryError::NotFound("quarry".to_string()),
        };
        assert!(!failure.is_success());
        assert!(failure.into_result().is_err());

        let success = Confirmation::Success { slot: 3, events: vec![] };
        assert_eq!(success.into_result().unwrap().0, 3);
    }
}
