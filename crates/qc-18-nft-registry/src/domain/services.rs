//! # Domain Services
//!
//! Pure helpers for signed mint requests: digest construction and secp256k1
//! signer recovery. No state, no I/O.

use crate::domain::value_objects::{Address, EcdsaSignature, Hash};
use crate::errors::RegistryError;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};
use uuid::Uuid;

/// EIP-191 header for a 32-byte personal message.
const PERSONAL_MESSAGE_HEADER: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Keccak-256 hash.
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    Hash(out)
}

/// Digest a signer commits to when authorizing a mint.
///
/// `keccak256(prefix ‖ recipient ‖ request_id)`.
#[must_use]
pub fn mint_request_digest(prefix: &str, recipient: Address, request_id: Uuid) -> Hash {
    let mut preimage = Vec::with_capacity(prefix.len() + 20 + 16);
    preimage.extend_from_slice(prefix.as_bytes());
    preimage.extend_from_slice(recipient.as_bytes());
    preimage.extend_from_slice(request_id.as_bytes());
    keccak256(&preimage)
}

/// Wraps a digest in the EIP-191 personal-message envelope.
#[must_use]
pub fn personal_message_hash(digest: &Hash) -> Hash {
    let mut preimage = Vec::with_capacity(PERSONAL_MESSAGE_HEADER.len() + 32);
    preimage.extend_from_slice(PERSONAL_MESSAGE_HEADER);
    preimage.extend_from_slice(digest.as_bytes());
    keccak256(&preimage)
}

/// Hash that is actually signed for a mint request.
#[must_use]
pub fn mint_signing_hash(prefix: &str, recipient: Address, request_id: Uuid) -> Hash {
    personal_message_hash(&mint_request_digest(prefix, recipient, request_id))
}

/// Derive an address from a secp256k1 public key.
#[must_use]
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let encoded = public_key.to_encoded_point(false);
    // Skip the 0x04 uncompressed-point tag.
    let hash = keccak256(&encoded.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash.0[12..]);
    Address(address)
}

/// Recover the signer of `message_hash`.
///
/// Rejects high-s signatures (EIP-2) and recovery bytes outside 0/1/27/28.
///
/// # Errors
///
/// `RegistryError::SignatureInvalid` when the signature is malformed or
/// recovery fails.
pub fn recover_signer(
    message_hash: &Hash,
    signature: &EcdsaSignature,
) -> Result<Address, RegistryError> {
    let recovery_id = parse_recovery_id(signature.v)?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&signature.r);
    sig_bytes[32..].copy_from_slice(&signature.s);
    let sig = Signature::from_slice(&sig_bytes)
        .map_err(|_| RegistryError::SignatureInvalid("malformed signature".to_string()))?;

    if sig.normalize_s().is_some() {
        return Err(RegistryError::SignatureInvalid(
            "high-s signature".to_string(),
        ));
    }

    let key = VerifyingKey::recover_from_prehash(message_hash.as_bytes(), &sig, recovery_id)
        .map_err(|_| RegistryError::SignatureInvalid("recovery failed".to_string()))?;

    Ok(address_from_pubkey(&key))
}

/// Recover and compare against the expected signer.
///
/// # Errors
///
/// `RegistryError::SignatureInvalid` if the expected signer is zero, the
/// signature is malformed, or it was made by anyone else.
pub fn verify_signer(
    message_hash: &Hash,
    signature: &EcdsaSignature,
    expected: Address,
) -> Result<(), RegistryError> {
    if expected.is_zero() {
        return Err(RegistryError::SignatureInvalid(
            "no signer configured".to_string(),
        ));
    }
    let recovered = recover_signer(message_hash, signature)?;
    if recovered != expected {
        return Err(RegistryError::SignatureInvalid(format!(
            "signer mismatch: expected {expected:?}, recovered {recovered:?}"
        )));
    }
    Ok(())
}

fn parse_recovery_id(v: u8) -> Result<RecoveryId, RegistryError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => {
            return Err(RegistryError::SignatureInvalid(format!(
                "invalid recovery id: {v}"
            )))
        }
    };
    RecoveryId::try_from(id)
        .map_err(|_| RegistryError::SignatureInvalid(format!("invalid recovery id: {v}")))
}

// =============================================================================
// TEST HELPERS
// =============================================================================


// =============================================================================
// TESTS
// =============================================================================
