// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Wires the emulated device and in-memory collaborators into a
//! ready-to-run provisioning service.

use crate::collaborators::{
    EmuEvidenceVerifier, FixedSealingKey, InMemoryProvisioningHistory,
    InMemoryServiceConfiguration, SealingKeyStatus,
};
use crate::command_layer::EmuCommandLayer;
use crate::engine::{EmuSpdmEngineLoader, EngineStats};
use crate::programmer::EmuProgrammer;
use crate::responder::{EmuDevice, EmuDeviceConfig};
use bkps::config::{BkpsConfig, ConfigError, LibSpdmParams, RetryConfig, RetryPolicy};
use bkps::provisioning::{
    AesGcmContextProvider, HandlerDependencies, ProvisioningHandler, ProvisioningResult,
    ProvisioningService, ServiceConfiguration,
};
use bkps::spdm::LibSpdmDataType;
use bkps::worker::{SpdmBackgroundService, WorkerDependencies};
use std::sync::Arc;
use zeroize::Zeroizing;

pub const EMU_CONTEXT_KEY: [u8; 32] = [0x3C; 32];

/// Short timeouts so failing flows end quickly.
pub fn fast_params() -> LibSpdmParams {
    LibSpdmParams {
        network_communication_timeout_secs: 5,
        library_communication_timeout_secs: 2,
        ..Default::default()
    }
}

pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        ensure_not_running: RetryPolicy::new(10, 50),
        ensure_not_running_long: RetryPolicy::new(10, 300),
        queue: RetryPolicy::new(10, 3),
    }
}

pub struct EmuEnvironmentBuilder {
    pub device: EmuDeviceConfig,
    pub configurations: Vec<ServiceConfiguration>,
    pub verifier: EmuEvidenceVerifier,
    pub sealing_key: SealingKeyStatus,
    pub loader_unavailable: bool,
    pub failing_data_type: Option<LibSpdmDataType>,
    pub params: LibSpdmParams,
    pub retry: RetryConfig,
    pub sigma_handlers: Vec<Box<dyn ProvisioningHandler>>,
    pub context_key: Zeroizing<Vec<u8>>,
}

impl Default for EmuEnvironmentBuilder {
    fn default() -> Self {
        EmuEnvironmentBuilder {
            device: EmuDeviceConfig::default(),
            configurations: Vec::new(),
            verifier: EmuEvidenceVerifier::accept_all(),
            sealing_key: SealingKeyStatus::Active,
            loader_unavailable: false,
            failing_data_type: None,
            params: fast_params(),
            retry: fast_retry(),
            sigma_handlers: Vec::new(),
            context_key: Zeroizing::new(EMU_CONTEXT_KEY.to_vec()),
        }
    }
}

impl EmuEnvironmentBuilder {
    pub fn device(mut self, device: EmuDeviceConfig) -> Self {
        self.device = device;
        self
    }

    pub fn configuration(mut self, configuration: ServiceConfiguration) -> Self {
        self.configurations.push(configuration);
        self
    }

    pub fn verifier(mut self, verifier: EmuEvidenceVerifier) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn sealing_key(mut self, status: SealingKeyStatus) -> Self {
        self.sealing_key = status;
        self
    }

    pub fn sigma_handler(mut self, handler: Box<dyn ProvisioningHandler>) -> Self {
        self.sigma_handlers.push(handler);
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Takes timeouts, retries and the context key from a service config.
    pub fn with_config(mut self, config: &BkpsConfig) -> Result<Self, ConfigError> {
        self.params = config.lib_spdm_params.clone();
        self.retry = config.retry.clone();
        if let Some(key) = config.context_key()? {
            self.context_key = key;
        }
        Ok(self)
    }

    pub fn loader_unavailable(mut self) -> Self {
        self.loader_unavailable = true;
        self
    }

    pub fn failing_data_type(mut self, data_type: LibSpdmDataType) -> Self {
        self.failing_data_type = Some(data_type);
        self
    }

    pub fn build(self) -> ProvisioningResult<EmuEnvironment> {
        let device = Arc::new(EmuDevice::new(self.device));
        let configuration = Arc::new(InMemoryServiceConfiguration::default());
        for c in self.configurations {
            configuration.insert(c);
        }
        let history = Arc::new(InMemoryProvisioningHistory::default());
        let sealing_key = Arc::new(FixedSealingKey::new(self.sealing_key));
        let verifier = Arc::new(self.verifier);
        let mut loader = if self.loader_unavailable {
            EmuSpdmEngineLoader::unavailable()
        } else {
            EmuSpdmEngineLoader::default()
        };
        if let Some(data_type) = self.failing_data_type {
            loader = loader.with_failing_data_type(data_type);
        }
        let engine_stats = loader.stats();
        let command_layer = Arc::new(EmuCommandLayer);

        let spdm_service = Arc::new(SpdmBackgroundService::new(
            WorkerDependencies {
                loader: Arc::new(loader),
                command_layer: command_layer.clone(),
                verifier: verifier.clone(),
                unsealer: sealing_key.clone(),
                history: history.clone(),
                local_cert_chain: Vec::new(),
            },
            self.params,
            self.retry,
        ));
        let deps = HandlerDependencies {
            spdm_service: spdm_service.clone(),
            encryption_provider: Some(Arc::new(AesGcmContextProvider::new(&self.context_key)?)),
            command_layer,
            history: history.clone(),
        };
        let service = ProvisioningService::new(deps, configuration.clone(), self.sigma_handlers)?;
        debug!("emu environment ready");
        Ok(EmuEnvironment {
            device,
            configuration,
            history,
            sealing_key,
            verifier,
            engine_stats,
            spdm_service,
            service,
        })
    }
}

pub struct EmuEnvironment {
    pub device: Arc<EmuDevice>,
    pub configuration: Arc<InMemoryServiceConfiguration>,
    pub history: Arc<InMemoryProvisioningHistory>,
    pub sealing_key: Arc<FixedSealingKey>,
    pub verifier: Arc<EmuEvidenceVerifier>,
    pub engine_stats: Arc<EngineStats>,
    pub spdm_service: Arc<SpdmBackgroundService>,
    pub service: ProvisioningService,
}

impl EmuEnvironment {
    pub fn builder() -> EmuEnvironmentBuilder {
        EmuEnvironmentBuilder::default()
    }

    pub fn programmer(&self, cfg_id: u64) -> EmuProgrammer {
        EmuProgrammer::new(self.device.clone(), cfg_id)
    }
}
