// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Device Ed25519 keys: provisioning, loading and challenge signing.

use crate::error::AppError;
use crate::models::KeyMaterial;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ring::rand::{SecureRandom, SystemRandom};
use ring::signature::{Ed25519KeyPair, KeyPair, UnparsedPublicKey, ED25519};
use subtle::ConstantTimeEq;

const SEED_LEN: usize = 32;

/// Signs authority challenges with the device key.
pub struct DeviceSigner {
    keypair: Ed25519KeyPair,
}

impl DeviceSigner {
    /// Load a signer, checking that the seed really derives the stored
    /// public key.
    pub fn from_key_material(keys: &KeyMaterial) -> Result<Self, AppError> {
        let seed = BASE64
            .decode(keys.private_key.trim())
            .map_err(|e| AppError::Crypto(format!("private key decode failed: {e}")))?;
        if seed.len() != SEED_LEN {
            return Err(AppError::Crypto(format!(
                "private key must be {SEED_LEN} bytes, got {}",
                seed.len()
            )));
        }
        let public = BASE64
            .decode(keys.public_key.trim())
            .map_err(|e| AppError::Crypto(format!("public key decode failed: {e}")))?;

        let keypair = Ed25519KeyPair::from_seed_unchecked(&seed)
            .map_err(|e| AppError::Crypto(format!("private key rejected: {e}")))?;

        if !bool::from(keypair.public_key().as_ref().ct_eq(public.as_slice())) {
            return Err(AppError::Crypto(
                "stored public key does not match private key".to_string(),
            ));
        }

        Ok(Self { keypair })
    }

    /// Sign raw challenge bytes; returns the base64 signature.
    pub fn sign(&self, message: &[u8]) -> String {
        BASE64.encode(self.keypair.sign(message).as_ref())
    }

    /// Canonical base64 form of the public key sent to the authority.
    pub fn public_key_base64(&self) -> String {
        BASE64.encode(self.keypair.public_key().as_ref())
    }
}

/// Generate fresh device key material.
pub fn generate_key_material() -> Result<KeyMaterial, AppError> {
    let rng = SystemRandom::new();
    let mut seed = [0u8; SEED_LEN];
    rng.fill(&mut seed)
        .map_err(|_| AppError::Crypto("random seed generation failed".to_string()))?;

    let keypair = Ed25519KeyPair::from_seed_unchecked(&seed)
        .map_err(|e| AppError::Crypto(format!("key generation failed: {e}")))?;

    Ok(KeyMaterial {
        private_key: BASE64.encode(seed),
        public_key: BASE64.encode(keypair.public_key().as_ref()),
    })
}

/// Verify a base64 signature against a base64 public key.
pub fn verify_signature(public_key: &str, message: &[u8], signature: &str) -> bool {
    let (Ok(public), Ok(signature)) = (BASE64.decode(public_key), BASE64.decode(signature)) else {
        return false;
    };
    UnparsedPublicKey::new(&ED25519, public)
        .verify(message, &signature)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let keys = generate_key_material().unwrap();
        let signer = DeviceSigner::from_key_material(&keys).unwrap();
        assert_eq!(signer.public_key_base64(), keys.public_key);

        let signature = signer.sign(b"nonce-123");
        assert!(verify_signature(&keys.public_key, b"nonce-123", &signature));
        assert!(!verify_signature(&keys.public_key, b"nonce-124", &signature));
    }

    #[test]
    fn test_mismatched_public_key_rejected() {
        let a = generate_key_material().unwrap();
        let b = generate_key_material().unwrap();
        let mixed = KeyMaterial {
            private_key: a.private_key,
            public_key: b.public_key,
        };
        assert!(matches!(
            DeviceSigner::from_key_material(&mixed),
            Err(AppError::Crypto(_))
        ));
    }

    #[test]
    fn test_bad_seed_rejected() {
        let keys = KeyMaterial {
            private_key: "c2sx".to_string(),
            public_key: "cGsx".to_string(),
        };
        assert!(DeviceSigner::from_key_material(&keys).is_err());
    }
}
