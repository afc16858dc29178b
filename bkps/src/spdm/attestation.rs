// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::error::{SpdmError, SpdmResult};
use super::protocol::SpdmProtocol12;

/// Checks device evidence against the root of trust and reference values.
pub trait EvidenceVerifier: Send + Sync {
    fn verify_chain(&self, device_id: &str, chain_hex: &str) -> bool;

    fn verify_measurements(&self, corim_url: &str, measurements_hex: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationParams {
    pub corim_url: String,
    pub measurements_signature: bool,
}

pub struct SpdmAttestation<'a> {
    verifier: &'a dyn EvidenceVerifier,
}

impl<'a> SpdmAttestation<'a> {
    pub fn new(verifier: &'a dyn EvidenceVerifier) -> Self {
        SpdmAttestation { verifier }
    }

    /// Picks the first slot whose chain verifies, then checks measurements
    /// taken against that slot.
    pub async fn perform_attestation_and_get_slot_id(
        &self,
        protocol: &mut SpdmProtocol12,
        device_id: &str,
        params: &AttestationParams,
    ) -> SpdmResult<u8> {
        let digest = protocol.get_digest().await?;
        debug!("Slot mask: 0x{:02x}", digest.slot_mask);

        let mut valid_slot = None;
        for slot_id in digest.populated_slots() {
            let chain = protocol.get_certs(slot_id).await?;
            if self.verifier.verify_chain(device_id, &chain) {
                valid_slot = Some(slot_id);
                break;
            }
            warn!("Certificate chain in slot {} is not valid.", slot_id);
        }
        let slot_id = valid_slot.ok_or_else(|| {
            error!("Valid certificate chain not found for device {}", device_id);
            SpdmError::ValidChainNotFound
        })?;
        info!("Using certificate chain from slot {}", slot_id);

        let measurements = protocol
            .get_measurements(slot_id, params.measurements_signature)
            .await?;
        if !self
            .verifier
            .verify_measurements(&params.corim_url, &measurements)
        {
            error!("Measurements do not match reference values.");
            return Err(SpdmError::AttestationFailed(
                "Device attestation failed.".to_string(),
            ));
        }
        Ok(slot_id)
    }
}
