// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::collaborators::{ServiceConfiguration, ServiceConfigurationProvider};
use super::dto::{ProvisioningRequestDto, ProvisioningRequestDtoReader};
use super::error::{ProvisioningError, ProvisioningResult};
use super::flow::{FlowStage, ProtocolType};
use std::sync::Arc;

/// Everything one inbound request carries through the handler chain.
pub struct ProvisioningTransferObject {
    dto: ProvisioningRequestDto,
    dto_reader: Option<ProvisioningRequestDtoReader>,
    pub protocol_type: Option<ProtocolType>,
    configuration: Arc<dyn ServiceConfigurationProvider>,
}

impl ProvisioningTransferObject {
    pub fn new(
        dto: ProvisioningRequestDto,
        configuration: Arc<dyn ServiceConfigurationProvider>,
    ) -> Self {
        ProvisioningTransferObject {
            dto,
            dto_reader: None,
            protocol_type: None,
            configuration,
        }
    }

    pub fn dto(&self) -> &ProvisioningRequestDto {
        &self.dto
    }

    pub fn set_dto_reader(&mut self, reader: ProvisioningRequestDtoReader) {
        self.protocol_type = reader.protocol_type();
        self.dto_reader = Some(reader);
    }

    pub fn dto_reader(&self) -> ProvisioningResult<&ProvisioningRequestDtoReader> {
        self.dto_reader
            .as_ref()
            .ok_or_else(|| ProvisioningError::generic("Provisioning request was not decoded."))
    }

    /// `None` until the request is decoded, and for a fresh flow.
    pub fn flow_stage(&self) -> Option<FlowStage> {
        self.dto_reader.as_ref().and_then(|r| r.flow_stage())
    }

    pub fn cfg_id(&self) -> u64 {
        self.dto.cfg_id
    }

    pub fn configuration_provider(&self) -> Arc<dyn ServiceConfigurationProvider> {
        self.configuration.clone()
    }

    pub fn get_configuration(&self, cfg_id: u64) -> ProvisioningResult<ServiceConfiguration> {
        self.configuration
            .get_configuration(cfg_id)
            .ok_or(ProvisioningError::InvalidConfiguration(cfg_id))
    }
}
