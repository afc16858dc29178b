// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use core::fmt;
use serde::{Deserialize, Serialize};

/// Step of the provisioning conversation carried in the context envelope.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowStage {
    ProtocolDecision,
    #[serde(rename = "SPDM_GET_CHIPID")]
    SpdmGetChipId,
    SpdmSession,
    SigmaCreateSession,
    SigmaAuthData,
    SigmaInitData,
    SigmaEnc,
    SigmaEncAsset,
    ProvResult,
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowStage::ProtocolDecision => "PROTOCOL_DECISION",
            FlowStage::SpdmGetChipId => "SPDM_GET_CHIPID",
            FlowStage::SpdmSession => "SPDM_SESSION",
            FlowStage::SigmaCreateSession => "SIGMA_CREATE_SESSION",
            FlowStage::SigmaAuthData => "SIGMA_AUTH_DATA",
            FlowStage::SigmaInitData => "SIGMA_INIT_DATA",
            FlowStage::SigmaEnc => "SIGMA_ENC",
            FlowStage::SigmaEncAsset => "SIGMA_ENC_ASSET",
            FlowStage::ProvResult => "PROV_RESULT",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProtocolType {
    Spdm,
    Sigma,
}
