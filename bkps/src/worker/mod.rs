// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Runs one SPDM exchange at a time on a background task and relays its
//! messages to the stateless request handlers.

pub mod actions;
pub mod error;
pub mod message;
pub mod queue;
pub mod result;
pub mod retry;
pub mod service;

pub use actions::{SpdmActions, WorkerDependencies, WorkerState};
pub use error::WorkerError;
pub use message::{SpdmMessage, SpdmThreadError};
pub use queue::{ControllerQueues, MessageQueues, QueueDeviceIo, WorkerQueues};
pub use result::ProcessResultHolder;
pub use retry::retry_fixed;
pub use service::SpdmBackgroundService;
