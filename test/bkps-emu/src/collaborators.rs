// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! In-memory stand-ins for configuration storage, provisioning history,
//! the sealing key and the evidence verifier.

use bkps::provisioning::{
    ConfidentialDataUnsealer, ProvisioningHistory, PufType, SealingKeyError,
    ServiceConfiguration, ServiceConfigurationProvider,
};
use bkps::psg::PsgQekBuilderHsm;
use bkps::spdm::EvidenceVerifier;
use spin::Mutex;
use std::collections::{HashMap, HashSet};
use zeroize::Zeroizing;

#[derive(Debug, Default)]
pub struct InMemoryServiceConfiguration {
    configurations: Mutex<HashMap<u64, ServiceConfiguration>>,
}

impl InMemoryServiceConfiguration {
    pub fn insert(&self, configuration: ServiceConfiguration) {
        self.configurations
            .lock()
            .insert(configuration.cfg_id, configuration);
    }

    pub fn overbuild_current(&self, cfg_id: u64) -> Option<i32> {
        self.configurations
            .lock()
            .get(&cfg_id)
            .map(|c| c.overbuild.current)
    }
}

impl ServiceConfigurationProvider for InMemoryServiceConfiguration {
    fn get_configuration(&self, cfg_id: u64) -> Option<ServiceConfiguration> {
        self.configurations.lock().get(&cfg_id).cloned()
    }

    /// Same predicate as the guarded UPDATE: infinite, or still below max.
    fn get_configuration_and_update(&self, cfg_id: u64) -> u32 {
        let mut configurations = self.configurations.lock();
        match configurations.get_mut(&cfg_id) {
            Some(c) if c.overbuild.is_infinite() || c.overbuild.current < c.overbuild.max => {
                c.overbuild.current += 1;
                1
            }
            _ => 0,
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryProvisioningHistory {
    provisioned: Mutex<HashSet<(String, PufType)>>,
}

impl InMemoryProvisioningHistory {
    pub fn len(&self) -> usize {
        self.provisioned.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.provisioned.lock().is_empty()
    }
}

impl ProvisioningHistory for InMemoryProvisioningHistory {
    fn is_provisioned(&self, device_id_hex: &str, puf_type: PufType) -> bool {
        self.provisioned
            .lock()
            .contains(&(device_id_hex.to_string(), puf_type))
    }

    fn mark_provisioned(&self, device_id_hex: &str, puf_type: PufType) -> bool {
        self.provisioned
            .lock()
            .insert((device_id_hex.to_string(), puf_type))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SealingKeyStatus {
    Active,
    NoActiveKey,
    RotationPending,
}

/// Sealed values are stored in the clear; the QEK root key is its
/// encrypted AES key field.
#[derive(Debug)]
pub struct FixedSealingKey {
    status: Mutex<SealingKeyStatus>,
}

impl Default for FixedSealingKey {
    fn default() -> Self {
        FixedSealingKey::new(SealingKeyStatus::Active)
    }
}

impl FixedSealingKey {
    pub fn new(status: SealingKeyStatus) -> Self {
        FixedSealingKey {
            status: Mutex::new(status),
        }
    }

    pub fn set_status(&self, status: SealingKeyStatus) {
        *self.status.lock() = status;
    }

    fn ensure_active(&self) -> Result<(), SealingKeyError> {
        match *self.status.lock() {
            SealingKeyStatus::Active => Ok(()),
            SealingKeyStatus::NoActiveKey => Err(SealingKeyError::NoActiveKey),
            SealingKeyStatus::RotationPending => Err(SealingKeyError::RotationPending),
        }
    }
}

impl ConfidentialDataUnsealer for FixedSealingKey {
    fn unseal(&self, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>, SealingKeyError> {
        self.ensure_active()?;
        Ok(Zeroizing::new(sealed.to_vec()))
    }

    fn decrypt_qek_root_key(
        &self,
        qek: &PsgQekBuilderHsm,
        key_name: &str,
    ) -> Result<Zeroizing<Vec<u8>>, SealingKeyError> {
        self.ensure_active()?;
        if key_name.is_empty() {
            return Err(SealingKeyError::Unseal("missing HSM key name".to_string()));
        }
        Ok(Zeroizing::new(qek.encrypted_aes_key.to_vec()))
    }
}

/// Chains are trusted unless listed as rejected; `""` and `"00"` never are.
#[derive(Debug)]
pub struct EmuEvidenceVerifier {
    rejected_chains: HashSet<String>,
    accept_measurements: bool,
    seen_chains: Mutex<Vec<String>>,
}

impl Default for EmuEvidenceVerifier {
    fn default() -> Self {
        EmuEvidenceVerifier::accept_all()
    }
}

impl EmuEvidenceVerifier {
    pub fn accept_all() -> Self {
        EmuEvidenceVerifier {
            rejected_chains: HashSet::new(),
            accept_measurements: true,
            seen_chains: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting_chain(mut self, chain_hex: String) -> Self {
        self.rejected_chains.insert(chain_hex);
        self
    }

    pub fn rejecting_measurements(mut self) -> Self {
        self.accept_measurements = false;
        self
    }

    pub fn seen_chains(&self) -> Vec<String> {
        self.seen_chains.lock().clone()
    }
}

impl EvidenceVerifier for EmuEvidenceVerifier {
    fn verify_chain(&self, _device_id: &str, chain_hex: &str) -> bool {
        self.seen_chains.lock().push(chain_hex.to_string());
        !chain_hex.is_empty() && chain_hex != "00" && !self.rejected_chains.contains(chain_hex)
    }

    fn verify_measurements(&self, corim_url: &str, measurements_hex: &str) -> bool {
        self.accept_measurements && !corim_url.is_empty() && !measurements_hex.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bkps::provisioning::OverbuildConfig;

    fn configuration(max: i32, current: i32) -> ServiceConfiguration {
        ServiceConfiguration {
            cfg_id: 4,
            puf_type: PufType::Efuse,
            overbuild: OverbuildConfig { max, current },
            corim_url: None,
            confidential_data: None,
            measurements_request_signature: None,
        }
    }

    #[test]
    fn test_conditional_update() {
        struct Tc {
            name: &'static str,
            max: i32,
            current: i32,
            expected_rows: u32,
            expected_current: i32,
        }
        let cases = [
            Tc {
                name: "below max",
                max: 2,
                current: 1,
                expected_rows: 1,
                expected_current: 2,
            },
            Tc {
                name: "at max",
                max: 2,
                current: 2,
                expected_rows: 0,
                expected_current: 2,
            },
            Tc {
                name: "infinite",
                max: -1,
                current: 40,
                expected_rows: 1,
                expected_current: 41,
            },
        ];
        for tc in cases.iter() {
            let store = InMemoryServiceConfiguration::default();
            store.insert(configuration(tc.max, tc.current));
            assert_eq!(store.get_configuration_and_update(4), tc.expected_rows, "{}", tc.name);
            assert_eq!(store.overbuild_current(4), Some(tc.expected_current), "{}", tc.name);
        }
        assert_eq!(InMemoryServiceConfiguration::default().get_configuration_and_update(4), 0);
    }

    #[test]
    fn test_history_marks_once() {
        let history = InMemoryProvisioningHistory::default();
        assert!(history.mark_provisioned("aa", PufType::Efuse));
        assert!(!history.mark_provisioned("aa", PufType::Efuse));
        assert!(history.mark_provisioned("aa", PufType::Iid));
        assert!(history.is_provisioned("aa", PufType::Iid));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_sealing_key_status() {
        let key = FixedSealingKey::default();
        assert_eq!(key.unseal(&[1, 2]).unwrap().as_slice(), &[1, 2]);
        key.set_status(SealingKeyStatus::RotationPending);
        assert_eq!(key.unseal(&[1]), Err(SealingKeyError::RotationPending));
        key.set_status(SealingKeyStatus::NoActiveKey);
        assert_eq!(key.unseal(&[1]), Err(SealingKeyError::NoActiveKey));
    }

    #[test]
    fn test_verifier_rejects_empty_chains() {
        let verifier = EmuEvidenceVerifier::accept_all().rejecting_chain("3001".to_string());
        assert!(!verifier.verify_chain("id", ""));
        assert!(!verifier.verify_chain("id", "00"));
        assert!(!verifier.verify_chain("id", "3001"));
        assert!(verifier.verify_chain("id", "3002"));
        assert_eq!(verifier.seen_chains().len(), 4);
    }
}
