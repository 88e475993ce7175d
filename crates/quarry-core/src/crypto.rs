// crates/quarry-core/src/crypto.rs

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::error::QuarryError;
use crate::identity::Pubkey;

/// An ed25519 keypair used to sign transactions.
#[derive(Clone)]
pub struct Keypair {
    pub signing_key: SigningKey,
    pub verifying_key: VerifyingKey,
}

impl Keypair {
    /// Generate a new random ed25519 keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self::from_signing_key(signing_key)
    }

    /// Rebuild a keypair from its 32 secret key bytes.
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(secret))
    }

    /// Parse a hex-encoded 32-byte secret key, as written by `quarry wallet create`.
    pub fn from_secret_hex(secret_hex: &str) -> Result<Self, QuarryError> {
        let bytes = hex::decode(secret_hex.trim())?;
        let secret: [u8; 32] = bytes
            .try_into()
            .map_err(|_| QuarryError::Serialization("Secret key must be exactly 32 bytes".to_string()))?;
        Ok(Self::from_secret_bytes(&secret))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifying_key = signing_key.verifying_key();
        Keypair {
            signing_key,
            verifying_key,
        }
    }

    /// The public key as an account address.
    pub fn pubkey(&self) -> Pubkey {
        Pubkey::new(self.verifying_key.to_bytes())
    }

    /// Hex encoding of the secret key bytes.
    pub fn secret_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    /// Sign a message and return the signature bytes.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let signature = self.signing_key.sign(message);
        signature.to_bytes().to_vec()
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair").field("pubkey", &self.pubkey()).finish()
    }
}

/// Verify an ed25519 signature made by `signer` over `message`.
///
/// Returns `Ok(false)` for a well-formed but wrong signature, and an error
/// when the key or signature bytes are malformed.
pub fn verify_signature(
    signer: &Pubkey,
    message: &[u8],
    signature_bytes: &[u8],
) -> Result<bool, QuarryError> {
    let verifying_key = VerifyingKey::from_bytes(signer.as_bytes())
        .map_err(|e| QuarryError::InvalidSignature(format!("Invalid public key: {}", e)))?;

    let signature_array: [u8; 64] = signature_bytes
        .try_into()
        .map_err(|_| QuarryError::InvalidSignature("Signature must be exactly 64 bytes".to_string()))?;

    let signature = ed25519_dalek::Signature::from_bytes(&signature_array);

    match verifying_key.verify(message, &signature) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}

/// Compute SHA-256 hash of the given bytes.
pub fn hash_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}
