// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::capability::{
    SpdmMeasurementAttributes, SpdmResponseCapabilityFlags,
    SPDM_KEY_EXCHANGE_REQUEST_ALL_MEASUREMENTS_HASH, SPDM_MEASUREMENT_OPERATION_ALL_MEASUREMENTS,
    SHA384_LEN,
};
use super::engine::{SpdmDeviceIo, SpdmEngine, SpdmEngineLoader};
use super::error::{check, SpdmError, SpdmResult};
use super::params::{SpdmParameters, SpdmParametersSetter};
use super::set_certificate::SpdmSetCertificateBuilder;
use ring::digest;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SpdmConnectionState {
    Uninitialized,
    LibraryLoaded,
    /// Native context exists but parameters are not all set.
    ContextAllocated,
    ContextPrepared,
    ConnectionInitialized,
    Digested,
    Certified,
    Measured,
    SessionActive,
    SessionClosed,
}

impl Default for SpdmConnectionState {
    fn default() -> Self {
        SpdmConnectionState::Uninitialized
    }
}

/// GET_DIGESTS answer: bit `i` of `slot_mask` set means slot `i` holds a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpdmDigest {
    pub slot_mask: u8,
    pub digests: Vec<u8>,
}

impl SpdmDigest {
    pub fn is_slot_populated(&self, slot_id: u8) -> bool {
        slot_id < 8 && self.slot_mask & (1 << slot_id) != 0
    }

    /// Populated slots in ascending order.
    pub fn populated_slots(&self) -> Vec<u8> {
        (0..8u8).filter(|s| self.is_slot_populated(*s)).collect()
    }

    /// Digests are packed in slot order, populated slots only.
    pub fn digest_for(&self, slot_id: u8) -> Option<&[u8]> {
        let index = self
            .populated_slots()
            .iter()
            .position(|s| *s == slot_id)?;
        self.digests
            .get(index * SHA384_LEN..(index + 1) * SHA384_LEN)
    }
}

/// SPDM 1.2 requester driver for one device connection.
pub struct SpdmProtocol12 {
    parameters: SpdmParameters,
    local_cert_chain: Vec<Vec<u8>>,
    device_io: Option<Box<dyn SpdmDeviceIo + Send>>,
    engine: Option<Box<dyn SpdmEngine>>,
    state: SpdmConnectionState,
    version_queried: bool,
    session_id: Option<u32>,
    expected_measurement_hash: Option<Vec<u8>>,
}

impl SpdmProtocol12 {
    pub fn new(device_io: Box<dyn SpdmDeviceIo + Send>, parameters: SpdmParameters) -> Self {
        SpdmProtocol12 {
            parameters,
            local_cert_chain: Vec::new(),
            device_io: Some(device_io),
            engine: None,
            state: SpdmConnectionState::Uninitialized,
            version_queried: false,
            session_id: None,
            expected_measurement_hash: None,
        }
    }

    pub fn with_local_cert_chain(mut self, chain: Vec<Vec<u8>>) -> Self {
        self.local_cert_chain = chain;
        self
    }

    pub fn state(&self) -> SpdmConnectionState {
        self.state
    }

    pub fn initialize_library(&mut self, loader: &dyn SpdmEngineLoader) -> SpdmResult {
        if self.engine.is_some() {
            return Ok(());
        }
        let engine = loader.load().map_err(|e| {
            error!("Failed to load SPDM library: {}", e);
            match e {
                SpdmError::LibraryLink(_) => e,
                other => SpdmError::LibraryLink(other.to_string()),
            }
        })?;
        self.engine = Some(engine);
        self.state = SpdmConnectionState::LibraryLoaded;
        Ok(())
    }

    fn engine_mut(&mut self) -> SpdmResult<&mut Box<dyn SpdmEngine>> {
        self.engine
            .as_mut()
            .ok_or_else(|| SpdmError::LibraryLink("SPDM library not loaded.".to_string()))
    }

    pub fn prepare_context(&mut self) -> SpdmResult {
        if self.state >= SpdmConnectionState::ContextPrepared {
            debug!("SPDM context already initialized.");
            return Ok(());
        }
        debug!("Initializing SPDM context.");
        let device_io = self.device_io.take().ok_or_else(|| {
            SpdmError::Runtime("SPDM device io already consumed.".to_string())
        })?;
        let parameters = self.parameters;
        let chain = core::mem::take(&mut self.local_cert_chain);

        let engine = self.engine_mut()?;
        if engine.get_context_size() == 0 {
            return Err(SpdmError::Runtime(
                "Failed to initialize SPDM context.".to_string(),
            ));
        }
        engine.prepare_context(device_io).map_err(|status| {
            debug!("Initialize context status: {}", status);
            SpdmError::Runtime("Failed to initialize SPDM context.".to_string())
        })?;
        self.state = SpdmConnectionState::ContextAllocated;
        SpdmParametersSetter::with(self.engine_mut()?.as_mut())
            .set_libspdm_parameters(&parameters)?
            .set_cert_chain(0, &chain)?;

        self.state = SpdmConnectionState::ContextPrepared;
        Ok(())
    }

    /// GET_VERSION only. Returns the version as hex, e.g. "12".
    pub async fn get_version(&mut self) -> SpdmResult<String> {
        self.prepare_context()?;
        let queried = self.version_queried || self.is_connection_initialized();
        let engine = self.engine_mut()?;
        if !queried {
            debug!("Sending SPDM GET_VERSION ...");
            check(engine.init_connection(true).await)?;
        }
        let version = check(engine.get_version())?;
        self.version_queried = true;
        Ok(hex::encode_upper(&[version]))
    }

    pub async fn init_spdm_connection(&mut self) -> SpdmResult {
        self.prepare_context()?;
        if self.is_connection_initialized() {
            return Ok(());
        }
        debug!("Sending SPDM GET_VERSION, GET_CAPABILITIES, NEGOTIATE_ALGORITHMS (VCA) ...");
        let engine = self.engine_mut()?;
        check(engine.init_connection(false).await)?;
        self.state = SpdmConnectionState::ConnectionInitialized;
        Ok(())
    }

    pub fn is_connection_initialized(&self) -> bool {
        self.state >= SpdmConnectionState::ConnectionInitialized
    }

    fn ensure_connection(&self) -> SpdmResult {
        if !self.is_connection_initialized() {
            return Err(SpdmError::ConnectionNotInitialized);
        }
        Ok(())
    }

    fn advance(&mut self, state: SpdmConnectionState) {
        if self.state < state {
            self.state = state;
        }
    }

    /// Negotiated version of an initialised connection.
    pub fn retrieve_spdm_version(&mut self) -> SpdmResult<String> {
        self.ensure_connection()?;
        let version = check(self.engine_mut()?.get_version())?;
        Ok(hex::encode_upper(&[version]))
    }

    pub fn check_responder_capability(
        &mut self,
        capability: SpdmResponseCapabilityFlags,
    ) -> SpdmResult<bool> {
        self.ensure_connection()?;
        let flags = check(self.engine_mut()?.get_responder_capability_flags())?;
        Ok(flags.contains(capability))
    }

    pub async fn get_digest(&mut self) -> SpdmResult<SpdmDigest> {
        self.ensure_connection()?;
        debug!("Sending SPDM GET_DIGESTS ...");
        let (slot_mask, digests) = check(self.engine_mut()?.get_digest().await)?;
        let expected = slot_mask.count_ones() as usize * SHA384_LEN;
        if digests.len() < expected {
            return Err(SpdmError::Runtime(format!(
                "Digest buffer too short: {} bytes, expected {}",
                digests.len(),
                expected
            )));
        }
        self.advance(SpdmConnectionState::Digested);
        Ok(SpdmDigest {
            slot_mask,
            digests: digests[..expected].to_vec(),
        })
    }

    /// Chain of `slot_id` as hex. An empty chain is `""`, a chain of a
    /// single zero byte is `"00"`.
    pub async fn get_certs(&mut self, slot_id: u8) -> SpdmResult<String> {
        self.ensure_connection()?;
        debug!("Sending SPDM GET_CERTIFICATE ...");
        let chain = check(self.engine_mut()?.get_certificate(slot_id).await)?;
        let chain = hex::encode(&chain);
        debug!("CERTIFICATE: {}", chain);
        self.advance(SpdmConnectionState::Certified);
        Ok(chain)
    }

    pub async fn get_measurements(
        &mut self,
        slot_id: u8,
        signature_required: bool,
    ) -> SpdmResult<String> {
        self.ensure_connection()?;
        debug!("Sending SPDM GET_MEASUREMENTS ...");
        if signature_required {
            info!("Verifying signature over measurements.");
        } else {
            info!("Skipping signature verification over measurements.");
        }
        let record = check(
            self.engine_mut()?
                .get_measurement(
                    None,
                    SpdmMeasurementAttributes::for_signature(signature_required),
                    SPDM_MEASUREMENT_OPERATION_ALL_MEASUREMENTS,
                    slot_id,
                )
                .await,
        )?;
        self.expected_measurement_hash =
            Some(digest::digest(&digest::SHA384, &record).as_ref().to_vec());
        let measurements = hex::encode(&record);
        debug!("MEASUREMENTS: {}", measurements);
        self.advance(SpdmConnectionState::Measured);
        Ok(measurements)
    }

    pub async fn set_authority(&mut self, cert_chain: &[Vec<u8>], slot_id: u8) -> SpdmResult {
        self.ensure_connection()?;
        debug!("Sending SPDM SET_CERTIFICATE ...");
        let chain = SpdmSetCertificateBuilder::default()
            .parse(cert_chain)?
            .build();
        check(
            self.engine_mut()?
                .set_certificate(None, slot_id, &chain)
                .await,
        )
    }

    pub async fn start_secure_session(&mut self, measurement_slot_id: u8) -> SpdmResult {
        self.ensure_connection()?;
        debug!("Sending SPDM KEY_EXCHANGE ...");
        let expected = self.expected_measurement_hash.clone();
        let engine = self.engine_mut()?;
        let info = check(
            engine
                .start_session(
                    false,
                    SPDM_KEY_EXCHANGE_REQUEST_ALL_MEASUREMENTS_HASH,
                    measurement_slot_id,
                    0,
                )
                .await,
        )?;
        if info.session_id == 0 {
            return Err(SpdmError::Runtime(
                "Failed to start SPDM session".to_string(),
            ));
        }
        if let Some(expected) = expected {
            if expected != info.measurement_hash {
                error!("Measurement hash mismatch.");
                if let Err(status) = engine.stop_session(info.session_id, 0).await {
                    warn!("END_SESSION after hash mismatch failed: {}", status);
                }
                engine.free_session(info.session_id);
                return Err(SpdmError::Runtime("Measurement hash mismatch".to_string()));
            }
        }
        debug!("Secure session initialized.");
        self.session_id = Some(info.session_id);
        self.state = SpdmConnectionState::SessionActive;
        Ok(())
    }

    pub async fn stop_secure_session(&mut self) -> SpdmResult {
        self.ensure_connection()?;
        let session_id = self
            .session_id
            .ok_or(SpdmError::SecureSessionNotInitialized)?;
        debug!("Sending SPDM END_SESSION ...");
        let engine = self.engine_mut()?;
        let res = check(engine.stop_session(session_id, 0).await);
        engine.free_session(session_id);
        self.session_id = None;
        self.state = SpdmConnectionState::SessionClosed;
        res
    }

    pub async fn send_receive_data_in_session(&mut self, payload: &[u8]) -> SpdmResult<Vec<u8>> {
        self.ensure_connection()?;
        let session_id = self
            .session_id
            .ok_or(SpdmError::SecureSessionNotInitialized)?;
        debug!("Sending VENDOR_DEFINED_REQUEST in session ...");
        check(
            self.engine_mut()?
                .send_receive_data(Some(session_id), false, payload)
                .await,
        )
    }

    /// Ends a remaining session and releases the native context.
    pub async fn close(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            if let Some(session_id) = self.session_id.take() {
                if let Err(status) = engine.stop_session(session_id, 0).await {
                    warn!("END_SESSION on close failed: {}", status);
                }
                engine.free_session(session_id);
            }
            if self.state >= SpdmConnectionState::ContextAllocated {
                engine.deinit_context();
            }
        }
        self.engine = None;
        self.state = SpdmConnectionState::Uninitialized;
    }
}

impl Drop for SpdmProtocol12 {
    fn drop(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            if let Some(session_id) = self.session_id.take() {
                engine.free_session(session_id);
            }
            if self.state >= SpdmConnectionState::ContextAllocated {
                engine.deinit_context();
            }
        }
    }
}
