// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::message::SpdmThreadError;
use spin::Mutex;

/// Single slot for the outcome of the most recent worker run.
#[derive(Debug, Default)]
pub struct ProcessResultHolder {
    result: Mutex<Option<SpdmThreadError>>,
}

impl ProcessResultHolder {
    pub fn produce(&self, result: SpdmThreadError) {
        debug!("SPDM process result: {}", result);
        *self.result.lock() = Some(result);
    }

    pub fn ready(&self) -> bool {
        self.result.lock().is_some()
    }

    /// Takes the result, leaving the slot empty.
    pub fn consume(&self) -> Option<SpdmThreadError> {
        self.result.lock().take()
    }

    pub fn clear(&self) {
        *self.result.lock() = None;
    }
}
