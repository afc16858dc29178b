// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use crate::provisioning::error::ProvisioningError;
use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerError {
    /// A previous flow's worker has not finished tearing down.
    ProcessStillRunning,
    /// The worker is alive but produced nothing before retries ran out.
    MessageFromQueueEmpty,
    /// Emptiness where a message must exist, e.g. right after a start.
    UnrecoverableMessageFromQueueEmpty,
}

impl WorkerError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WorkerError::ProcessStillRunning | WorkerError::MessageFromQueueEmpty
        )
    }
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerError::ProcessStillRunning => f.write_str("SPDM process is still running."),
            WorkerError::MessageFromQueueEmpty => f.write_str("Message from SPDM queue is empty."),
            WorkerError::UnrecoverableMessageFromQueueEmpty => {
                f.write_str("Message from SPDM queue is empty and cannot be recovered.")
            }
        }
    }
}

impl std::error::Error for WorkerError {}

impl From<WorkerError> for ProvisioningError {
    fn from(e: WorkerError) -> Self {
        ProvisioningError::Generic(e.to_string())
    }
}
