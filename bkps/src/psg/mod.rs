// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Fixed-layout key containers consumed by the secure device manager:
//! user AES key entries (SDM 1.2 and 1.5) and the HSM-wrapped QEK.

pub mod aes_key;
pub mod aes_key_sdm12;
pub mod aes_key_sdm15;
pub mod endianness;
pub mod error;
pub mod flags;
pub mod qek;
pub mod types;

pub use aes_key::{PsgAesKeyBuilder, PsgAesKeyBuilderFactory};
pub use aes_key_sdm12::PsgAesKeyBuilderSdm12;
pub use aes_key_sdm15::PsgAesKeyBuilderSdm15;
pub use endianness::{convert, EndiannessActor, FieldSpec};
pub use error::{PsgError, PsgResult};
pub use flags::AesKeyFlags;
pub use qek::PsgQekBuilderHsm;
pub use types::{EfuseTestFlag, FipsMode, KeyWrappingType, PsgAesKeyType, StorageType};
