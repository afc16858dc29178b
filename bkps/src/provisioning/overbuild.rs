// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::collaborators::{ProvisioningHistory, ServiceConfiguration, ServiceConfigurationProvider};
use super::error::{ProvisioningError, ProvisioningResult};

/// Per-configuration ceiling on how many distinct devices get provisioned.
pub struct OverbuildCounterManager<'a> {
    history: &'a dyn ProvisioningHistory,
}

impl<'a> OverbuildCounterManager<'a> {
    pub fn new(history: &'a dyn ProvisioningHistory) -> Self {
        OverbuildCounterManager { history }
    }

    /// A device already counted against a saturated configuration passes.
    pub fn verify_overbuild_counter(
        &self,
        configuration: &ServiceConfiguration,
        device_id_hex: &str,
    ) -> ProvisioningResult<()> {
        let overbuild = configuration.overbuild;
        if overbuild.is_infinite() || overbuild.current < overbuild.max {
            return Ok(());
        }
        if self
            .history
            .is_provisioned(device_id_hex, configuration.puf_type)
        {
            warn!(
                "Overbuild limit reached for cfg id {}, re-provisioning known device {}",
                configuration.cfg_id, device_id_hex
            );
            return Ok(());
        }
        error!(
            "Overbuild counter exceeded: max {}, current {}",
            overbuild.max, overbuild.current
        );
        Err(ProvisioningError::ExceededOverbuild(format!(
            "Exceeded overbuild counter. Max: {}, current: {}",
            overbuild.max, overbuild.current
        )))
    }

    /// The update is conditional; anything other than one row means a
    /// concurrent flow took the last slot.
    pub fn increment(
        &self,
        configuration_provider: &dyn ServiceConfigurationProvider,
        cfg_id: u64,
    ) -> ProvisioningResult<()> {
        info!("Updating overbuild counter ...");
        if configuration_provider.get_configuration_and_update(cfg_id) != 1 {
            error!("Overbuild counter update rejected for cfg id {}", cfg_id);
            return Err(ProvisioningError::ExceededOverbuild(
                "Exceeded overbuild counter.".to_string(),
            ));
        }
        Ok(())
    }
}
