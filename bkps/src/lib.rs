// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

#[macro_use]
extern crate bitflags;

extern crate codec;

pub mod config;
pub mod provisioning;
pub mod psg;
pub mod spdm;
pub mod worker;
