// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use crate::common::CFG_ID;
use bkps::provisioning::overbuild::OverbuildCounterManager;
use bkps::provisioning::{ProvisioningError, ProvisioningHistory, PufType};
use bkps::psg::StorageType;
use bkps_emu::collaborators::{InMemoryProvisioningHistory, InMemoryServiceConfiguration};
use bkps_emu::fixtures::{self, KeyGeneration};
use bkps_emu::responder::EMU_CHIP_ID_HEX;
use bkps_emu::EmuEnvironment;

fn environment(max: i32, current: i32) -> EmuEnvironment {
    let mut configuration =
        fixtures::configuration(CFG_ID, KeyGeneration::Sdm15, StorageType::Efuses, max);
    configuration.overbuild.current = current;
    EmuEnvironment::builder()
        .configuration(configuration)
        .build()
        .unwrap()
}

#[test]
fn test_overbuild_counter() {
    struct Tc {
        name: &'static str,
        max: i32,
        current: i32,
        already_provisioned: bool,
        runs: usize,
        expected_result: Result<(), ProvisioningError>,
        expected_current: i32,
        expected_provisioned: usize,
    }
    let cases = [
        Tc {
            name: "below max",
            max: 2,
            current: 1,
            already_provisioned: false,
            runs: 1,
            expected_result: Ok(()),
            expected_current: 2,
            expected_provisioned: 1,
        },
        Tc {
            name: "exceeded",
            max: 1,
            current: 1,
            already_provisioned: false,
            runs: 1,
            expected_result: Err(ProvisioningError::ExceededOverbuild(
                "Exceeded overbuild counter. Max: 1, current: 1".to_string(),
            )),
            expected_current: 1,
            expected_provisioned: 0,
        },
        Tc {
            name: "known device at max",
            max: 1,
            current: 1,
            already_provisioned: true,
            runs: 1,
            expected_result: Ok(()),
            expected_current: 1,
            expected_provisioned: 1,
        },
        Tc {
            name: "same device twice",
            max: 1,
            current: 0,
            already_provisioned: false,
            runs: 2,
            expected_result: Ok(()),
            expected_current: 1,
            expected_provisioned: 2,
        },
        Tc {
            name: "infinite",
            max: -1,
            current: 100,
            already_provisioned: false,
            runs: 2,
            expected_result: Ok(()),
            expected_current: 101,
            expected_provisioned: 2,
        },
    ];
    let runtime = tokio::runtime::Runtime::new().unwrap();
    for tc in cases.iter() {
        let env = environment(tc.max, tc.current);
        if tc.already_provisioned {
            env.history.mark_provisioned(EMU_CHIP_ID_HEX, PufType::Efuse);
        }
        for _ in 0..tc.runs {
            let result = runtime
                .block_on(env.programmer(CFG_ID).run(&env.service))
                .map(|_| ());
            assert_eq!(result, tc.expected_result, "{}", tc.name);
        }
        assert_eq!(
            env.configuration.overbuild_current(CFG_ID),
            Some(tc.expected_current),
            "{}",
            tc.name
        );
        assert_eq!(
            env.device.record().provisioned.len(),
            tc.expected_provisioned,
            "{}",
            tc.name
        );
    }
}

#[test]
fn test_concurrent_increment_takes_last_slot_once() {
    let history = InMemoryProvisioningHistory::default();
    let configuration = InMemoryServiceConfiguration::default();
    configuration.insert(fixtures::configuration(
        CFG_ID,
        KeyGeneration::Sdm12,
        StorageType::Efuses,
        3,
    ));
    let manager = OverbuildCounterManager::new(&history);

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let results = runtime.block_on(futures::future::join_all(
        (0..8).map(|_| async { manager.increment(&configuration, CFG_ID) }),
    ));
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 3);
    assert!(results.iter().filter(|r| r.is_err()).all(|r| {
        *r == Err(ProvisioningError::ExceededOverbuild(
            "Exceeded overbuild counter.".to_string(),
        ))
    }));
    assert_eq!(configuration.overbuild_current(CFG_ID), Some(3));
}

#[test]
fn test_increment_unknown_configuration() {
    let history = InMemoryProvisioningHistory::default();
    let configuration = InMemoryServiceConfiguration::default();
    let (first, second) = futures::executor::block_on(async {
        futures::join!(
            async { OverbuildCounterManager::new(&history).increment(&configuration, 1) },
            async { OverbuildCounterManager::new(&history).increment(&configuration, 2) }
        )
    });
    assert!(first.is_err());
    assert!(second.is_err());
}
