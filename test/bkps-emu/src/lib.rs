// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

#[macro_use]
extern crate log;

pub mod collaborators;
pub mod environment;
pub mod programmer;

pub use environment::{EmuEnvironment, EmuEnvironmentBuilder};
pub use programmer::{EmuProgrammer, ProgrammerTranscript};
pub use responder::{EmuDevice, EmuDeviceConfig};
