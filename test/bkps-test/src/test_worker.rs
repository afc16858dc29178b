// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use crate::common::{builder, CFG_ID};
use bkps::spdm::params::DEFAULT_CT_EXPONENT;
use bkps::spdm::SpdmSetCertificateBuilder;
use bkps::worker::{SpdmMessage, SpdmThreadError};
use bkps_emu::fixtures::device_cert_chain;
use bkps_emu::EmuDeviceConfig;

fn authority_chain() -> Vec<Vec<u8>> {
    vec![device_cert_chain(6), device_cert_chain(7)]
}

#[test]
fn test_get_version() {
    struct Tc {
        name: &'static str,
        device: EmuDeviceConfig,
        loader_unavailable: bool,
        expected_result: Option<SpdmThreadError>,
    }
    let cases = vec![
        Tc {
            name: "spdm 1.2 device",
            device: EmuDeviceConfig::default(),
            loader_unavailable: false,
            expected_result: Some(SpdmThreadError::Success),
        },
        Tc {
            name: "spdm not supported",
            device: EmuDeviceConfig {
                spdm_supported: false,
                ..Default::default()
            },
            loader_unavailable: false,
            expected_result: Some(SpdmThreadError::Failure),
        },
        Tc {
            name: "library unavailable",
            device: EmuDeviceConfig::default(),
            loader_unavailable: true,
            expected_result: Some(SpdmThreadError::Failure),
        },
    ];
    let runtime = tokio::runtime::Runtime::new().unwrap();
    for tc in cases {
        let mut b = builder(5).device(tc.device);
        if tc.loader_unavailable {
            b = b.loader_unavailable();
        }
        let env = b.build().unwrap();
        let programmer = env.programmer(CFG_ID);
        let result = runtime.block_on(async {
            env.spdm_service.start_get_version();
            programmer.drive_worker(&env.spdm_service).await
        });
        assert_eq!(result, tc.expected_result, "{}", tc.name);
        assert_eq!(env.spdm_service.get_process_result(), None, "{}", tc.name);
        assert!(!env.spdm_service.is_processing(), "{}", tc.name);
        assert_eq!(env.device.record().requester_ct_exponent, None, "{}", tc.name);
    }
}

#[test]
fn test_set_authority() {
    struct Tc {
        name: &'static str,
        chain: Vec<Vec<u8>>,
        slot_id: u8,
        expected_result: Option<SpdmThreadError>,
        expected_authorities: Vec<(u8, Vec<u8>)>,
    }
    let cases = vec![
        Tc {
            name: "slot 1",
            chain: authority_chain(),
            slot_id: 1,
            expected_result: Some(SpdmThreadError::Success),
            expected_authorities: vec![(
                1,
                SpdmSetCertificateBuilder::default()
                    .parse(&authority_chain())
                    .unwrap()
                    .build(),
            )],
        },
        Tc {
            name: "empty chain",
            chain: Vec::new(),
            slot_id: 1,
            expected_result: Some(SpdmThreadError::Failure),
            expected_authorities: Vec::new(),
        },
    ];
    let runtime = tokio::runtime::Runtime::new().unwrap();
    for tc in cases {
        let env = builder(5).build().unwrap();
        let programmer = env.programmer(CFG_ID);
        let (chain, slot_id) = (tc.chain, tc.slot_id);
        let result = runtime.block_on(async {
            env.spdm_service.start_set_authority(chain, slot_id);
            programmer.drive_worker(&env.spdm_service).await
        });
        assert_eq!(result, tc.expected_result, "{}", tc.name);
        let record = env.device.record();
        assert_eq!(record.authorities, tc.expected_authorities, "{}", tc.name);
        assert_eq!(record.requester_ct_exponent, Some(DEFAULT_CT_EXPONENT), "{}", tc.name);
        assert_eq!(record.sessions_opened, 0, "{}", tc.name);
    }
}

#[test]
fn test_idle_service() {
    let env = builder(5).build().unwrap();
    let runtime = tokio::runtime::Runtime::new().unwrap();
    env.spdm_service.push_response_to_queue(SpdmMessage(vec![0x01]));
    assert_eq!(
        runtime.block_on(env.spdm_service.try_get_message_from_queue()),
        Ok(None)
    );
    assert!(runtime
        .block_on(env.spdm_service.get_message_from_queue())
        .is_err());
    assert!(env.spdm_service.ensure_process_is_not_running().is_ok());
    assert_eq!(env.spdm_service.get_process_result(), None);
}
