// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::capability::*;
use super::engine::{LibSpdmDataParameter, LibSpdmDataType, SpdmEngine};
use super::error::{SpdmError, SpdmResult};
use codec::Writer;
use ring::digest;

pub const DEFAULT_CT_EXPONENT: u8 = 0x0E;

/// Requester side negotiation values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpdmParameters {
    pub ct_exponent: u8,
    pub capabilities: SpdmRequestCapabilityFlags,
    pub measurement_spec: u8,
    pub base_asym_algo: u32,
    pub base_hash_algo: u32,
    pub dhe_name_group: u16,
    pub aead_cipher_suite: u16,
    pub req_base_asym_alg: u16,
    pub key_schedule: u16,
    pub other_params_support: u8,
}

impl Default for SpdmParameters {
    fn default() -> Self {
        SpdmParameters::with_ct_exponent(DEFAULT_CT_EXPONENT)
    }
}

impl SpdmParameters {
    pub fn with_ct_exponent(ct_exponent: u8) -> Self {
        SpdmParameters {
            ct_exponent,
            capabilities: SpdmRequestCapabilityFlags::provisioning(),
            measurement_spec: SPDM_MEASUREMENT_SPECIFICATION_DMTF,
            base_asym_algo: SPDM_ALGORITHMS_BASE_ASYM_ALGO_ECDSA_P384,
            base_hash_algo: SPDM_ALGORITHMS_BASE_HASH_ALGO_SHA_384,
            dhe_name_group: SPDM_ALGORITHMS_DHE_NAMED_GROUP_SECP_384_R1,
            aead_cipher_suite: SPDM_ALGORITHMS_AEAD_CIPHER_SUITE_AES_256_GCM,
            req_base_asym_alg: SPDM_ALGORITHMS_REQ_BASE_ASYM_ALG_ECDSA_P384,
            key_schedule: SPDM_ALGORITHMS_KEY_SCHEDULE_HMAC_HASH,
            other_params_support: SPDM_ALGORITHMS_OPAQUE_DATA_FORMAT_1,
        }
    }
}

/// Pushes the negotiation parameters into a freshly prepared context.
pub struct SpdmParametersSetter<'a> {
    engine: &'a mut dyn SpdmEngine,
}

impl<'a> SpdmParametersSetter<'a> {
    pub fn with(engine: &'a mut dyn SpdmEngine) -> Self {
        SpdmParametersSetter { engine }
    }

    pub fn set_libspdm_parameters(mut self, params: &SpdmParameters) -> SpdmResult<Self> {
        let parameter = LibSpdmDataParameter::local();
        use LibSpdmDataType::*;
        self.set_data(
            &parameter,
            LIBSPDM_DATA_CAPABILITY_CT_EXPONENT,
            &[params.ct_exponent],
        )?;
        self.set_data(
            &parameter,
            LIBSPDM_DATA_CAPABILITY_FLAGS,
            &params.capabilities.bits().to_le_bytes(),
        )?;
        self.set_data(
            &parameter,
            LIBSPDM_DATA_MEASUREMENT_SPEC,
            &[params.measurement_spec],
        )?;
        self.set_data(
            &parameter,
            LIBSPDM_DATA_BASE_ASYM_ALGO,
            &params.base_asym_algo.to_le_bytes(),
        )?;
        self.set_data(
            &parameter,
            LIBSPDM_DATA_BASE_HASH_ALGO,
            &params.base_hash_algo.to_le_bytes(),
        )?;
        self.set_data(
            &parameter,
            LIBSPDM_DATA_DHE_NAME_GROUP,
            &params.dhe_name_group.to_le_bytes(),
        )?;
        self.set_data(
            &parameter,
            LIBSPDM_DATA_AEAD_CIPHER_SUITE,
            &params.aead_cipher_suite.to_le_bytes(),
        )?;
        self.set_data(
            &parameter,
            LIBSPDM_DATA_REQ_BASE_ASYM_ALG,
            &params.req_base_asym_alg.to_le_bytes(),
        )?;
        self.set_data(
            &parameter,
            LIBSPDM_DATA_KEY_SCHEDULE,
            &params.key_schedule.to_le_bytes(),
        )?;
        self.set_data(
            &parameter,
            LIBSPDM_DATA_OTHER_PARAMS_SUPPORT,
            &[params.other_params_support],
        )?;
        Ok(self)
    }

    /// Registers the local public chain for `slot_id`. An empty chain is skipped.
    pub fn set_cert_chain(mut self, slot_id: u8, cert_chain: &[Vec<u8>]) -> SpdmResult<Self> {
        if cert_chain.is_empty() {
            debug!("No local public cert chain provided - skipped.");
            return Ok(self);
        }
        let prepared = prepare_cert_chain(cert_chain);
        self.set_data(
            &LibSpdmDataParameter::local_slot(slot_id),
            LibSpdmDataType::LIBSPDM_DATA_LOCAL_PUBLIC_CERT_CHAIN,
            &prepared,
        )?;
        Ok(self)
    }

    fn set_data(
        &mut self,
        parameter: &LibSpdmDataParameter,
        data_type: LibSpdmDataType,
        data: &[u8],
    ) -> SpdmResult {
        self.engine
            .set_data(data_type, parameter, data)
            .map_err(|status| {
                error!(
                    "Failed to set parameter {} for SPDM session, status {}",
                    data_type, status
                );
                SpdmError::Runtime(format!(
                    "Failed to set parameter {} for SPDM session.",
                    data_type
                ))
            })
    }
}

/// `len (u32 LE) || SHA-384(root cert) || certs`, where `len` covers the
/// whole buffer.
pub fn prepare_cert_chain(cert_chain: &[Vec<u8>]) -> Vec<u8> {
    let root_hash = match cert_chain.first() {
        Some(root) => digest::digest(&digest::SHA384, root),
        None => digest::digest(&digest::SHA384, &[]),
    };
    let total = 4 + root_hash.as_ref().len() + cert_chain.iter().map(|c| c.len()).sum::<usize>();
    let mut w = Writer::with_capacity(total);
    w.extend_from_slice(&(total as u32).to_le_bytes());
    w.extend_from_slice(root_hash.as_ref());
    for cert in cert_chain {
        w.extend_from_slice(cert);
    }
    trace!("LOCAL PUBLIC CERT CHAIN: {:02x?}", w.as_slice());
    w.into_vec()
}
