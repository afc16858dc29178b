// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use crate::common::CFG_ID;
use bkps::provisioning::programmer::MessageType;
use bkps::provisioning::{
    CommandIdentifier, ProvisioningError, ProvisioningHistory, PufType,
};
use bkps::psg::StorageType;
use bkps_emu::collaborators::SealingKeyStatus;
use bkps_emu::fixtures::{self, KeyGeneration, QEK_ROOT_KEY};
use bkps_emu::responder::EMU_CHIP_ID_HEX;
use bkps_emu::{EmuDeviceConfig, EmuEnvironment};
use std::sync::atomic::Ordering;

#[test]
fn test_spdm_provisioning() {
    struct Tc {
        name: &'static str,
        generation: KeyGeneration,
        storage: StorageType,
        expected_command: CommandIdentifier,
        expected_erases: usize,
    }
    let cases = [
        Tc {
            name: "sdm15 efuses",
            generation: KeyGeneration::Sdm15,
            storage: StorageType::Efuses,
            expected_command: CommandIdentifier::UserAesRootKeyProvision,
            expected_erases: 0,
        },
        Tc {
            name: "sdm15 bbram",
            generation: KeyGeneration::Sdm15,
            storage: StorageType::Bbram,
            expected_command: CommandIdentifier::UserAesRootKeyProvision,
            expected_erases: 1,
        },
        Tc {
            name: "sdm12 efuses",
            generation: KeyGeneration::Sdm12,
            storage: StorageType::Efuses,
            expected_command: CommandIdentifier::Certificate,
            expected_erases: 0,
        },
        Tc {
            name: "sdm12 bbram",
            generation: KeyGeneration::Sdm12,
            storage: StorageType::Bbram,
            expected_command: CommandIdentifier::Certificate,
            expected_erases: 1,
        },
    ];
    let runtime = tokio::runtime::Runtime::new().unwrap();
    for tc in cases.iter() {
        let env = EmuEnvironment::builder()
            .configuration(fixtures::configuration(CFG_ID, tc.generation, tc.storage, 5))
            .build()
            .unwrap();
        let transcript = runtime
            .block_on(env.programmer(CFG_ID).run(&env.service))
            .unwrap();

        let last = transcript.last().unwrap();
        assert!(last.is_done(), "{}", tc.name);
        assert!(last.context.is_empty(), "{}", tc.name);
        assert!(last.jtag_commands.is_empty(), "{}", tc.name);
        for response in transcript.responses[..transcript.rounds() - 1].iter() {
            assert!(!response.context.is_empty(), "{}", tc.name);
            assert_eq!(response.jtag_commands.len(), 1, "{}", tc.name);
            assert_eq!(
                response.jtag_commands[0].message_type(),
                MessageType::SEND_PACKET,
                "{}",
                tc.name
            );
        }

        let record = env.device.record();
        assert_eq!(record.provisioned.len(), 1, "{}", tc.name);
        assert_eq!(record.provisioned[0].0, tc.expected_command, "{}", tc.name);
        assert_eq!(record.volatile_aes_erases, tc.expected_erases, "{}", tc.name);
        assert_eq!(record.sessions_opened, 1, "{}", tc.name);
        assert_eq!(record.sessions_closed, 1, "{}", tc.name);
        assert_eq!(
            record.requester_ct_exponent,
            Some(bkps::spdm::params::DEFAULT_CT_EXPONENT),
            "{}",
            tc.name
        );
        assert_eq!(env.configuration.overbuild_current(CFG_ID), Some(1), "{}", tc.name);
        assert!(env.history.is_provisioned(EMU_CHIP_ID_HEX, PufType::Efuse), "{}", tc.name);
        assert_eq!(env.engine_stats.contexts_released.load(Ordering::SeqCst), 2, "{}", tc.name);
        assert!(!env.spdm_service.is_processing(), "{}", tc.name);
    }
}

#[test]
fn test_certificate_payload() {
    let runtime = tokio::runtime::Runtime::new().unwrap();

    let env = EmuEnvironment::builder()
        .configuration(fixtures::configuration(
            CFG_ID,
            KeyGeneration::Sdm15,
            StorageType::Efuses,
            5,
        ))
        .build()
        .unwrap();
    runtime
        .block_on(env.programmer(CFG_ID).run(&env.service))
        .unwrap();
    let (_, payload) = env.device.record().provisioned.remove(0);
    let key = fixtures::sdm15_aes_key(StorageType::Efuses);
    assert_eq!(&payload[..4], &[0, 0, 0, 0]);
    assert_eq!(&payload[4..4 + key.len()], key.as_slice());
    assert_eq!(&payload[4 + key.len()..], &QEK_ROOT_KEY[..]);

    let env = EmuEnvironment::builder()
        .configuration(fixtures::configuration(
            CFG_ID,
            KeyGeneration::Sdm12,
            StorageType::Efuses,
            5,
        ))
        .build()
        .unwrap();
    runtime
        .block_on(env.programmer(CFG_ID).run(&env.service))
        .unwrap();
    let (_, payload) = env.device.record().provisioned.remove(0);
    assert_eq!(&payload[4..], fixtures::sdm12_aes_key(StorageType::Efuses).as_slice());
}

#[test]
fn test_secure_session_failures() {
    struct Tc {
        name: &'static str,
        device: EmuDeviceConfig,
        sealing_key: SealingKeyStatus,
        storage: StorageType,
        expected_provisioned: usize,
        expected_history: usize,
    }
    let cases = vec![
        Tc {
            name: "no active sealing key",
            device: EmuDeviceConfig::default(),
            sealing_key: SealingKeyStatus::NoActiveKey,
            storage: StorageType::Efuses,
            expected_provisioned: 0,
            expected_history: 0,
        },
        Tc {
            name: "sealing key rotation pending",
            device: EmuDeviceConfig::default(),
            sealing_key: SealingKeyStatus::RotationPending,
            storage: StorageType::Efuses,
            expected_provisioned: 0,
            expected_history: 0,
        },
        Tc {
            name: "bbram erase answered with data",
            device: EmuDeviceConfig {
                volatile_aes_erase_response: vec![0x01],
                ..Default::default()
            },
            sealing_key: SealingKeyStatus::Active,
            storage: StorageType::Bbram,
            expected_provisioned: 0,
            expected_history: 0,
        },
        Tc {
            name: "certificate rejected by device",
            device: EmuDeviceConfig {
                certificate_status: 5,
                ..Default::default()
            },
            sealing_key: SealingKeyStatus::Active,
            storage: StorageType::Efuses,
            expected_provisioned: 1,
            expected_history: 1,
        },
    ];
    let runtime = tokio::runtime::Runtime::new().unwrap();
    for tc in cases {
        let env = EmuEnvironment::builder()
            .device(tc.device)
            .sealing_key(tc.sealing_key)
            .configuration(fixtures::configuration(
                CFG_ID,
                KeyGeneration::Sdm15,
                tc.storage,
                5,
            ))
            .build()
            .unwrap();
        let result = runtime.block_on(env.programmer(CFG_ID).run(&env.service));
        assert_eq!(
            result.map(|t| t.rounds()),
            Err(ProvisioningError::Generic(
                "SPDM Process failed with status: FAILURE".to_string()
            )),
            "{}",
            tc.name
        );
        let record = env.device.record();
        assert_eq!(record.provisioned.len(), tc.expected_provisioned, "{}", tc.name);
        assert_eq!(record.sessions_opened, 1, "{}", tc.name);
        assert_eq!(record.sessions_closed, 1, "{}", tc.name);
        assert_eq!(env.history.len(), tc.expected_history, "{}", tc.name);
        assert!(!env.spdm_service.is_processing(), "{}", tc.name);
    }
}

#[test]
fn test_missing_corim_url() {
    let mut configuration =
        fixtures::configuration(CFG_ID, KeyGeneration::Sdm15, StorageType::Efuses, 5);
    configuration.corim_url = None;
    let env = EmuEnvironment::builder()
        .configuration(configuration)
        .build()
        .unwrap();
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let result = runtime.block_on(env.programmer(CFG_ID).run(&env.service));
    assert_eq!(
        result.map(|t| t.rounds()),
        Err(ProvisioningError::Generic(
            "Missing CoRIM URL in configuration - required for attestation.".to_string()
        ))
    );
    assert_eq!(env.device.record().sessions_opened, 0);
}

#[test]
fn test_flow_over_json() {
    let env = EmuEnvironment::builder()
        .configuration(fixtures::configuration(
            CFG_ID,
            KeyGeneration::Sdm12,
            StorageType::Bbram,
            1,
        ))
        .build()
        .unwrap();
    let programmer = env.programmer(CFG_ID);
    let runtime = tokio::runtime::Runtime::new().unwrap();

    let mut request = programmer.first_request();
    let mut done = false;
    for _ in 0..crate::common::MAX_ROUNDS {
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"cfgId\":7"));
        let request_dto = serde_json::from_str(&json).unwrap();
        let response = runtime.block_on(env.service.get_next(request_dto)).unwrap();

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["apiVersion"], bkps_emu::programmer::EMU_API_VERSION);
        let response: bkps::provisioning::ProvisioningResponseDto =
            serde_json::from_value(json).unwrap();
        if response.is_done() {
            done = true;
            break;
        }
        request = programmer.relay(&response);
    }
    assert!(done);
    assert_eq!(env.device.record().volatile_aes_erases, 1);
}
