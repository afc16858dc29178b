// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

pub mod common;

#[cfg(test)]
mod test_attestation;
#[cfg(test)]
mod test_overbuild;
#[cfg(test)]
mod test_spdm_flow;
#[cfg(test)]
mod test_worker;
