// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Bodies of the background SPDM tasks. Each one owns a fresh driver,
//! stores exactly one result and releases `processing` on every path.

use super::message::SpdmThreadError;
use super::queue::{QueueDeviceIo, WorkerQueues};
use super::result::ProcessResultHolder;
use crate::config::LibSpdmParams;
use crate::provisioning::certificate::{CertificatePayloadBuilder, CertificateResponse};
use crate::provisioning::collaborators::{
    ConfidentialDataUnsealer, ProvisioningHistory, ServiceConfiguration,
    ServiceConfigurationProvider,
};
use crate::provisioning::command::{CommandIdentifier, CommandLayer};
use crate::provisioning::error::ProvisioningError;
use crate::provisioning::overbuild::OverbuildCounterManager;
use crate::psg::StorageType;
use crate::spdm::attestation::{AttestationParams, EvidenceVerifier, SpdmAttestation};
use crate::spdm::capability::SpdmResponseCapabilityFlags;
use crate::spdm::engine::SpdmEngineLoader;
use crate::spdm::error::{SpdmError, SpdmResult};
use crate::spdm::params::SpdmParameters;
use crate::spdm::protocol::SpdmProtocol12;
use crate::spdm::session::SpdmSecureSessionMessageSender;
use crate::spdm::version::SpdmVersionVerifier;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// State shared between the controller facade and the running task.
#[derive(Debug, Default)]
pub struct WorkerState {
    processing: AtomicBool,
    result: ProcessResultHolder,
}

impl WorkerState {
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    pub fn result(&self) -> &ProcessResultHolder {
        &self.result
    }

    /// Marks the worker busy until the returned guard drops.
    pub fn begin(self: &Arc<Self>) -> ProcessingGuard {
        self.processing.store(true, Ordering::SeqCst);
        ProcessingGuard {
            state: self.clone(),
        }
    }
}

/// Clears `processing` when the task ends, however it ends.
pub struct ProcessingGuard {
    state: Arc<WorkerState>,
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        self.state.processing.store(false, Ordering::SeqCst);
    }
}

/// Collaborators every task needs.
#[derive(Clone)]
pub struct WorkerDependencies {
    pub loader: Arc<dyn SpdmEngineLoader>,
    pub command_layer: Arc<dyn CommandLayer>,
    pub verifier: Arc<dyn EvidenceVerifier>,
    pub unsealer: Arc<dyn ConfidentialDataUnsealer>,
    pub history: Arc<dyn ProvisioningHistory>,
    /// Requester chain advertised for mutual authentication.
    pub local_cert_chain: Vec<Vec<u8>>,
}

#[derive(Clone)]
pub struct SpdmActions {
    deps: WorkerDependencies,
    params: LibSpdmParams,
    state: Arc<WorkerState>,
}

impl SpdmActions {
    pub fn new(deps: WorkerDependencies, params: LibSpdmParams, state: Arc<WorkerState>) -> Self {
        SpdmActions {
            deps,
            params,
            state,
        }
    }

    fn initialize_library(&self, queues: WorkerQueues) -> SpdmResult<SpdmProtocol12> {
        let device_io = QueueDeviceIo::new(
            queues,
            self.deps.command_layer.clone(),
            self.params.network_timeout(),
        );
        let mut protocol = SpdmProtocol12::new(
            Box::new(device_io),
            SpdmParameters::with_ct_exponent(self.params.ct_exponent),
        )
        .with_local_cert_chain(self.deps.local_cert_chain.clone());
        protocol.initialize_library(self.deps.loader.as_ref())?;
        Ok(protocol)
    }

    fn version_verifier(&self) -> SpdmResult<SpdmVersionVerifier> {
        SpdmVersionVerifier::new(&self.params.supported_version)
    }

    async fn initialize_connection_and_ensure_version_supported(
        &self,
        protocol: &mut SpdmProtocol12,
    ) -> SpdmResult {
        protocol.init_spdm_connection().await?;
        let version = protocol.retrieve_spdm_version()?;
        debug!("SPDM Responder version: {}", version);
        self.version_verifier()?.ensure_version_is_supported(&version)
    }

    /// Records the task outcome. Callers release the processing guard after
    /// this and drop their last sender after that, so a closed queue always
    /// comes with a result and an idle worker.
    fn finish(&self, name: &str, outcome: SpdmResult) {
        let result = match outcome {
            Ok(()) => SpdmThreadError::Success,
            Err(e) if e.is_attestation() => {
                error!("{}: attestation failed: {}", name, e);
                SpdmThreadError::AttestationFailed
            }
            Err(SpdmError::UnsupportedCapability(cap)) => {
                debug!("{}: SPDM capability not supported: {}", name, cap);
                SpdmThreadError::UnsupportedCap
            }
            Err(e) => {
                debug!("{}: processing failed: {}", name, e);
                SpdmThreadError::Failure
            }
        };
        self.state.result().produce(result);
    }

    pub async fn get_version_task(self, queues: WorkerQueues, guard: ProcessingGuard) {
        let keep_open = queues.to_controller.clone();
        let outcome = match self.initialize_library(queues) {
            Ok(mut protocol) => {
                let outcome = self.get_version(&mut protocol).await;
                protocol.close().await;
                outcome
            }
            Err(e) => Err(e),
        };
        self.finish("GET_VERSION", outcome);
        drop(guard);
        drop(keep_open);
    }

    async fn get_version(&self, protocol: &mut SpdmProtocol12) -> SpdmResult {
        let version = protocol.get_version().await?;
        debug!("SPDM Responder version: {}", version);
        self.version_verifier()?.ensure_version_is_supported(&version)
    }

    pub async fn vca_for_secure_session_task(self, queues: WorkerQueues, guard: ProcessingGuard) {
        let keep_open = queues.to_controller.clone();
        let outcome = match self.initialize_library(queues) {
            Ok(mut protocol) => {
                let outcome = self.vca_for_secure_session(&mut protocol).await;
                protocol.close().await;
                outcome
            }
            Err(e) => Err(e),
        };
        self.finish("VCA", outcome);
        drop(guard);
        drop(keep_open);
    }

    async fn vca_for_secure_session(&self, protocol: &mut SpdmProtocol12) -> SpdmResult {
        self.initialize_connection_and_ensure_version_supported(protocol)
            .await?;
        check_capability(protocol, SpdmResponseCapabilityFlags::KEY_EX_CAP, "KEY_EX_CAP")
    }

    pub async fn set_authority_task(
        self,
        queues: WorkerQueues,
        guard: ProcessingGuard,
        cert_chain: Vec<Vec<u8>>,
        slot_id: u8,
    ) {
        let keep_open = queues.to_controller.clone();
        let outcome = match self.initialize_library(queues) {
            Ok(mut protocol) => {
                let outcome = self
                    .set_authority(&mut protocol, &cert_chain, slot_id)
                    .await;
                protocol.close().await;
                outcome
            }
            Err(e) => Err(e),
        };
        self.finish("SET_AUTHORITY", outcome);
        drop(guard);
        drop(keep_open);
    }

    async fn set_authority(
        &self,
        protocol: &mut SpdmProtocol12,
        cert_chain: &[Vec<u8>],
        slot_id: u8,
    ) -> SpdmResult {
        self.initialize_connection_and_ensure_version_supported(protocol)
            .await?;
        info!("SPDM Responder initialized for Set Authority.");
        protocol.set_authority(cert_chain, slot_id).await
    }

    pub async fn secure_session_task(
        self,
        queues: WorkerQueues,
        guard: ProcessingGuard,
        uid: String,
        cfg_id: u64,
        configuration_provider: Arc<dyn ServiceConfigurationProvider>,
    ) {
        let keep_open = queues.to_controller.clone();
        let outcome = match self.initialize_library(queues) {
            Ok(mut protocol) => {
                let outcome = self
                    .secure_session(&mut protocol, &uid, cfg_id, configuration_provider.as_ref())
                    .await;
                protocol.close().await;
                outcome
            }
            Err(e) => Err(e),
        };
        self.finish("SECURE_SESSION", outcome);
        drop(guard);
        drop(keep_open);
    }

    async fn secure_session(
        &self,
        protocol: &mut SpdmProtocol12,
        uid: &str,
        cfg_id: u64,
        configuration_provider: &dyn ServiceConfigurationProvider,
    ) -> SpdmResult {
        self.initialize_connection_and_ensure_version_supported(protocol)
            .await?;
        info!("SPDM Responder initialized for Secure Session.");

        info!("Fetch configuration data for cfg id: {}", cfg_id);
        let configuration = configuration_provider
            .get_configuration(cfg_id)
            .ok_or_else(|| provisioning_failure(ProvisioningError::InvalidConfiguration(cfg_id)))?;
        let params = self.attestation_params(&configuration)?;
        let slot_id = SpdmAttestation::new(self.deps.verifier.as_ref())
            .perform_attestation_and_get_slot_id(protocol, uid, &params)
            .await?;

        let mut sender = SpdmSecureSessionMessageSender::new(protocol);
        sender.start_session(slot_id).await?;

        if storage_type(&configuration)? == StorageType::Bbram {
            self.clear_bbram(&mut sender).await?;
        }

        let certificate = CertificatePayloadBuilder::new(
            self.deps.unsealer.as_ref(),
            self.deps.command_layer.as_ref(),
        )
        .prepare_from(&configuration)
        .map_err(provisioning_failure)?;
        self.increment_overbuild_counter(configuration_provider, uid, &configuration)?;

        debug!("Sending CERTIFICATE with User AES Root Key Certificate ... ");
        let response = sender.send_data(&certificate.payload).await?;
        let response = self
            .deps
            .command_layer
            .retrieve(&response, certificate.command)
            .map_err(|e| provisioning_failure(e.into()))?;
        let response = CertificateResponse::parse(&response).map_err(provisioning_failure)?;
        if !response.process_completed() {
            return Err(SpdmError::Runtime(format!(
                "Certificate provisioning process error: {}",
                hex::encode(&response.status.to_be_bytes())
            )));
        }
        info!("Certificate provisioning process completed.");

        sender.end_session().await
    }

    fn attestation_params(&self, configuration: &ServiceConfiguration) -> SpdmResult<AttestationParams> {
        let corim_url = configuration.corim_url().ok_or_else(|| {
            SpdmError::Runtime("Missing CoRIM URL in configuration - required for attestation.".to_string())
        })?;
        Ok(AttestationParams {
            corim_url: corim_url.to_string(),
            measurements_signature: configuration
                .measurements_request_signature
                .unwrap_or(self.params.measurements_request_signature),
        })
    }

    async fn clear_bbram(&self, sender: &mut SpdmSecureSessionMessageSender<'_>) -> SpdmResult {
        debug!("Sending VOLATILE_AES_ERASE ... ");
        let payload = self
            .deps
            .command_layer
            .create(&[], CommandIdentifier::VolatileAesErase);
        let response = sender.send_data(&payload).await?;
        let response = self
            .deps
            .command_layer
            .retrieve(&response, CommandIdentifier::VolatileAesErase)
            .map_err(|e| provisioning_failure(e.into()))?;
        if !response.is_empty() {
            return Err(SpdmError::Runtime(format!(
                "VOLATILE_AES_ERASE (clear BBRAM) response is invalid.\nIt should be empty, but is: {}",
                hex::encode(&response)
            )));
        }
        Ok(())
    }

    fn increment_overbuild_counter(
        &self,
        configuration_provider: &dyn ServiceConfigurationProvider,
        uid: &str,
        configuration: &ServiceConfiguration,
    ) -> SpdmResult {
        info!("Setting device as provisioned ...");
        if self
            .deps
            .history
            .mark_provisioned(uid, configuration.puf_type)
        {
            OverbuildCounterManager::new(self.deps.history.as_ref())
                .increment(configuration_provider, configuration.cfg_id)
                .map_err(|e| {
                    SpdmError::Runtime(format!("Failed to increment overbuild counter: {}", e))
                })?;
        }
        Ok(())
    }
}

fn provisioning_failure(e: ProvisioningError) -> SpdmError {
    SpdmError::Runtime(e.to_string())
}

fn storage_type(configuration: &ServiceConfiguration) -> SpdmResult<StorageType> {
    configuration
        .confidential_data
        .as_ref()
        .map(|data| data.aes_key.storage)
        .ok_or_else(|| provisioning_failure(ProvisioningError::InvalidConfiguration(configuration.cfg_id)))
}

fn check_capability(
    protocol: &mut SpdmProtocol12,
    capability: SpdmResponseCapabilityFlags,
    name: &str,
) -> SpdmResult {
    let capability_msg = format!("{} = 0x{:08x}", name, capability.bits());
    info!("Checking if capability is supported: {}", capability_msg);
    if !protocol.check_responder_capability(capability)? {
        debug!("Capability is not supported: {}", capability_msg);
        return Err(SpdmError::UnsupportedCapability(capability_msg));
    }
    debug!("Capability is supported: {}", capability_msg);
    Ok(())
}
