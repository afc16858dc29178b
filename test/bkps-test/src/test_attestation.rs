// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use crate::common::{builder, CFG_ID};
use bkps::provisioning::ProvisioningError;
use bkps_emu::collaborators::EmuEvidenceVerifier;
use bkps_emu::fixtures::device_cert_chain;
use bkps_emu::EmuDeviceConfig;
use std::sync::atomic::Ordering;

fn failed_with(status: &str) -> Result<(), ProvisioningError> {
    Err(ProvisioningError::Generic(format!(
        "SPDM Process failed with status: {}",
        status
    )))
}

#[test]
fn test_slot_selection() {
    struct Tc {
        name: &'static str,
        device: EmuDeviceConfig,
        verifier: EmuEvidenceVerifier,
        expected_seen: Vec<String>,
        expected_result: Result<(), ProvisioningError>,
    }
    let cases = vec![
        Tc {
            name: "slot 0",
            device: EmuDeviceConfig::default(),
            verifier: EmuEvidenceVerifier::accept_all(),
            expected_seen: vec![hex::encode(&device_cert_chain(0))],
            expected_result: Ok(()),
        },
        Tc {
            name: "only slot 2 populated",
            device: EmuDeviceConfig::default()
                .with_chain(0, None)
                .with_chain(2, Some(device_cert_chain(2))),
            verifier: EmuEvidenceVerifier::accept_all(),
            expected_seen: vec![hex::encode(&device_cert_chain(2))],
            expected_result: Ok(()),
        },
        Tc {
            name: "empty chain skipped",
            device: EmuDeviceConfig::default()
                .with_chain(0, Some(Vec::new()))
                .with_chain(1, Some(device_cert_chain(1))),
            verifier: EmuEvidenceVerifier::accept_all(),
            expected_seen: vec!["".to_string(), hex::encode(&device_cert_chain(1))],
            expected_result: Ok(()),
        },
        Tc {
            name: "rejected chain skipped",
            device: EmuDeviceConfig::default().with_chain(3, Some(device_cert_chain(3))),
            verifier: EmuEvidenceVerifier::accept_all()
                .rejecting_chain(hex::encode(&device_cert_chain(0))),
            expected_seen: vec![
                hex::encode(&device_cert_chain(0)),
                hex::encode(&device_cert_chain(3)),
            ],
            expected_result: Ok(()),
        },
        Tc {
            name: "single zero byte chain",
            device: EmuDeviceConfig::default().with_chain(0, Some(vec![0x00])),
            verifier: EmuEvidenceVerifier::accept_all(),
            expected_seen: vec!["00".to_string()],
            expected_result: failed_with("ATTESTATION_FAILED"),
        },
        Tc {
            name: "measurements rejected",
            device: EmuDeviceConfig::default(),
            verifier: EmuEvidenceVerifier::accept_all().rejecting_measurements(),
            expected_seen: vec![hex::encode(&device_cert_chain(0))],
            expected_result: failed_with("ATTESTATION_FAILED"),
        },
    ];
    let runtime = tokio::runtime::Runtime::new().unwrap();
    for tc in cases {
        let env = builder(5)
            .device(tc.device)
            .verifier(tc.verifier)
            .build()
            .unwrap();
        let result = runtime
            .block_on(env.programmer(CFG_ID).run(&env.service))
            .map(|_| ());
        assert_eq!(result, tc.expected_result, "{}", tc.name);
        assert_eq!(env.verifier.seen_chains(), tc.expected_seen, "{}", tc.name);
        let record = env.device.record();
        let expected_sessions = if tc.expected_result.is_ok() { 1 } else { 0 };
        assert_eq!(record.sessions_opened, expected_sessions, "{}", tc.name);
        assert_eq!(record.provisioned.len(), expected_sessions, "{}", tc.name);
    }
}

#[test]
fn test_measurement_hash_mismatch() {
    let env = builder(5)
        .device(EmuDeviceConfig {
            tamper_measurement_hash: true,
            ..Default::default()
        })
        .build()
        .unwrap();
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let result = runtime
        .block_on(env.programmer(CFG_ID).run(&env.service))
        .map(|_| ());
    assert_eq!(result, failed_with("FAILURE"));

    let record = env.device.record();
    assert_eq!(record.sessions_opened, 1);
    assert_eq!(record.sessions_closed, 1);
    assert!(record.provisioned.is_empty());
    assert_eq!(env.engine_stats.sessions_freed.load(Ordering::SeqCst), 1);
    assert!(env.history.is_empty());
    assert_eq!(env.configuration.overbuild_current(CFG_ID), Some(0));
}
