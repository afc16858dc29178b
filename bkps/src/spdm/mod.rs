// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

pub mod attestation;
pub mod capability;
pub mod engine;
pub mod error;
pub mod params;
pub mod protocol;
pub mod session;
pub mod set_certificate;
pub mod status;
pub mod version;

pub use attestation::{AttestationParams, EvidenceVerifier, SpdmAttestation};
pub use capability::{
    SpdmMeasurementAttributes, SpdmRequestCapabilityFlags, SpdmResponseCapabilityFlags,
};
pub use engine::{
    LibSpdmDataLocation, LibSpdmDataParameter, LibSpdmDataType, SpdmDeviceIo, SpdmEngine,
    SpdmEngineLoader, SpdmSessionInfo,
};
pub use error::{throw_on_error, SpdmError, SpdmResult};
pub use params::{SpdmParameters, SpdmParametersSetter};
pub use protocol::{SpdmConnectionState, SpdmDigest, SpdmProtocol12};
pub use session::SpdmSecureSessionMessageSender;
pub use set_certificate::SpdmSetCertificateBuilder;
pub use status::LibSpdmReturn;
pub use version::SpdmVersionVerifier;
