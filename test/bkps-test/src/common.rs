// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use bkps::provisioning::{
    ProvisioningRequestDto, ProvisioningResponseDto, ProvisioningResult, ProvisioningService,
};
use bkps::psg::StorageType;
use bkps_emu::fixtures::{self, KeyGeneration};
use bkps_emu::{EmuDeviceConfig, EmuEnvironment, EmuEnvironmentBuilder, EmuProgrammer};

pub const CFG_ID: u64 = 7;
pub const MAX_ROUNDS: usize = 64;

/// SDM 1.5 key in eFuses, room for `overbuild_max` devices.
pub fn builder(overbuild_max: i32) -> EmuEnvironmentBuilder {
    EmuEnvironment::builder().configuration(fixtures::configuration(
        CFG_ID,
        KeyGeneration::Sdm15,
        StorageType::Efuses,
        overbuild_max,
    ))
}

pub fn environment_with_device(device: EmuDeviceConfig) -> EmuEnvironment {
    builder(10).device(device).build().unwrap()
}

/// Relays rounds starting at `request` until the service is done.
pub async fn finish(
    service: &ProvisioningService,
    programmer: &EmuProgrammer,
    mut request: ProvisioningRequestDto,
) -> ProvisioningResult<Vec<ProvisioningResponseDto>> {
    let mut responses = Vec::new();
    for _ in 0..MAX_ROUNDS {
        let response = service.get_next(request).await?;
        request = programmer.relay(&response);
        let done = response.is_done();
        responses.push(response);
        if done {
            break;
        }
    }
    debug!("finished after {} rounds", responses.len());
    Ok(responses)
}

/// Relays rounds until a response carries `commands` commands. Returns
/// that response and the request answering it.
pub async fn run_until_commands(
    service: &ProvisioningService,
    programmer: &EmuProgrammer,
    commands: usize,
) -> ProvisioningResult<(ProvisioningResponseDto, ProvisioningRequestDto)> {
    let mut request = programmer.first_request();
    for _ in 0..MAX_ROUNDS {
        let response = service.get_next(request).await?;
        request = programmer.relay(&response);
        if response.jtag_commands.len() == commands {
            return Ok((response, request));
        }
    }
    panic!("no response with {} commands in {} rounds", commands, MAX_ROUNDS);
}
