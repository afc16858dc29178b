// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::error::{ProvisioningError, ProvisioningResult};
use crate::config::BkpsConfig;
use ring::aead::{self, BoundKey};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

pub const PROVIDER_NOT_INITIALIZED: &str = "Encryption provider not initialized";

/// Authenticated encryption of the context carried between requests.
pub trait ContextEncryptionProvider: Send + Sync {
    fn encrypt(&self, data: &[u8]) -> ProvisioningResult<Vec<u8>>;

    fn decrypt(&self, data: &[u8]) -> ProvisioningResult<Vec<u8>>;
}

/// AES-256-GCM. Output is `nonce || ciphertext || tag`.
pub struct AesGcmContextProvider {
    key: Zeroizing<Vec<u8>>,
    rng: SystemRandom,
}

impl AesGcmContextProvider {
    pub fn new(key: &[u8]) -> ProvisioningResult<Self> {
        if key.len() != aead::AES_256_GCM.key_len() {
            error!("context key len invalid");
            return Err(ProvisioningError::Encryption(format!(
                "Invalid context key length: {}",
                key.len()
            )));
        }
        Ok(AesGcmContextProvider {
            key: Zeroizing::new(key.to_vec()),
            rng: SystemRandom::new(),
        })
    }

    /// `None` when the configuration carries no context key.
    pub fn from_config(config: &BkpsConfig) -> ProvisioningResult<Option<Self>> {
        let key = config
            .context_key()
            .map_err(|e| ProvisioningError::Encryption(e.to_string()))?;
        match key {
            Some(key) => Ok(Some(Self::new(&key)?)),
            None => Ok(None),
        }
    }

    fn make_key<K: BoundKey<OneNonceSequence>>(
        &self,
        nonce: aead::Nonce,
    ) -> ProvisioningResult<K> {
        let unbound = aead::UnboundKey::new(&aead::AES_256_GCM, &self.key)
            .map_err(|_| ProvisioningError::Encryption("Invalid context key.".to_string()))?;
        Ok(K::new(unbound, OneNonceSequence::new(nonce)))
    }
}

impl ContextEncryptionProvider for AesGcmContextProvider {
    fn encrypt(&self, data: &[u8]) -> ProvisioningResult<Vec<u8>> {
        let mut nonce = [0u8; aead::NONCE_LEN];
        self.rng.fill(&mut nonce).map_err(|_| {
            ProvisioningError::Encryption("Failed to generate nonce.".to_string())
        })?;
        let mut s_key: aead::SealingKey<OneNonceSequence> =
            self.make_key(aead::Nonce::assume_unique_for_key(nonce))?;

        let mut in_out = data.to_vec();
        s_key
            .seal_in_place_append_tag(aead::Aad::empty(), &mut in_out)
            .map_err(|_| {
                ProvisioningError::Encryption("Failed to encrypt provisioning context.".to_string())
            })?;

        let mut out = Vec::with_capacity(aead::NONCE_LEN + in_out.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&in_out);
        Ok(out)
    }

    fn decrypt(&self, data: &[u8]) -> ProvisioningResult<Vec<u8>> {
        let decrypt_failed =
            || ProvisioningError::Encryption("Failed to decrypt provisioning context.".to_string());
        if data.len() < aead::NONCE_LEN + aead::AES_256_GCM.tag_len() {
            error!("context blob too short: {}", data.len());
            return Err(decrypt_failed());
        }
        let (nonce, cipher_text) = data.split_at(aead::NONCE_LEN);
        let nonce = aead::Nonce::try_assume_unique_for_key(nonce).map_err(|_| decrypt_failed())?;
        let mut o_key: aead::OpeningKey<OneNonceSequence> = self.make_key(nonce)?;

        let mut in_out = Zeroizing::new(cipher_text.to_vec());
        let plain_text = o_key
            .open_in_place(aead::Aad::empty(), &mut in_out)
            .map_err(|_| decrypt_failed())?;
        Ok(plain_text.to_vec())
    }
}

struct OneNonceSequence(Option<aead::Nonce>);

impl OneNonceSequence {
    fn new(nonce: aead::Nonce) -> Self {
        Self(Some(nonce))
    }
}

impl aead::NonceSequence for OneNonceSequence {
    fn advance(&mut self) -> Result<aead::Nonce, ring::error::Unspecified> {
        self.0.take().ok_or(ring::error::Unspecified)
    }
}
