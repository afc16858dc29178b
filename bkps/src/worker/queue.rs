// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Depth-one channels between the worker task and the request handlers.

use super::message::SpdmMessage;
use crate::provisioning::command::{CommandIdentifier, CommandLayer, CommandLayerError};
use crate::spdm::engine::SpdmDeviceIo;
use crate::spdm::status::{
    LibSpdmReturn, LIBSPDM_STATUS_RECEIVE_FAIL, LIBSPDM_STATUS_SEND_FAIL,
    LIBSPDM_STATUS_SPDM_INTERNAL_EXCEPTION, LIBSPDM_STATUS_SPDM_NOT_SUPPORTED,
};
use async_trait::async_trait;
use core::time::Duration;
use std::sync::Arc;
use tokio::sync::mpsc;

pub const QUEUE_DEPTH: usize = 1;

/// Controller end: push device responses, pull the next outgoing message.
#[derive(Clone)]
pub struct ControllerQueues {
    pub to_spdm: mpsc::Sender<SpdmMessage>,
    pub from_spdm: Arc<tokio::sync::Mutex<mpsc::Receiver<SpdmMessage>>>,
}

/// Worker end.
pub struct WorkerQueues {
    pub to_controller: mpsc::Sender<SpdmMessage>,
    pub from_controller: mpsc::Receiver<SpdmMessage>,
}

pub struct MessageQueues;

impl MessageQueues {
    /// Fresh pair of channels. Whatever a previous flow left queued is
    /// dropped with its channels.
    pub fn create() -> (ControllerQueues, WorkerQueues) {
        let (to_spdm, from_controller) = mpsc::channel(QUEUE_DEPTH);
        let (to_controller, from_spdm) = mpsc::channel(QUEUE_DEPTH);
        (
            ControllerQueues {
                to_spdm,
                from_spdm: Arc::new(tokio::sync::Mutex::new(from_spdm)),
            },
            WorkerQueues {
                to_controller,
                from_controller,
            },
        )
    }
}

/// Device transport seen by the SPDM engine inside the worker. Every message
/// goes out MCTP-wrapped through the controller.
pub struct QueueDeviceIo {
    queues: WorkerQueues,
    command_layer: Arc<dyn CommandLayer>,
    network_timeout: Duration,
}

impl QueueDeviceIo {
    pub fn new(
        queues: WorkerQueues,
        command_layer: Arc<dyn CommandLayer>,
        network_timeout: Duration,
    ) -> Self {
        QueueDeviceIo {
            queues,
            command_layer,
            network_timeout,
        }
    }
}

#[async_trait]
impl SpdmDeviceIo for QueueDeviceIo {
    async fn send(&mut self, buffer: &[u8]) -> Result<(), LibSpdmReturn> {
        trace!("SPDM request: {:02x?}", buffer);
        let message = self.command_layer.create(buffer, CommandIdentifier::Mctp);
        self.queues
            .to_controller
            .send(SpdmMessage(message))
            .await
            .map_err(|_| {
                error!("Controller queue closed.");
                LIBSPDM_STATUS_SEND_FAIL
            })
    }

    /// The engine's own timeout is ignored; the device answers through a
    /// human-paced relay, so the configured network timeout applies.
    async fn receive(&mut self, _timeout: Duration) -> Result<Vec<u8>, LibSpdmReturn> {
        let message =
            match tokio::time::timeout(self.network_timeout, self.queues.from_controller.recv())
                .await
            {
                Ok(Some(message)) => message,
                Ok(None) | Err(_) => {
                    error!("No response from SPDM Responder.");
                    return Err(LIBSPDM_STATUS_SPDM_INTERNAL_EXCEPTION);
                }
            };
        match self
            .command_layer
            .retrieve(message.as_bytes(), CommandIdentifier::Mctp)
        {
            Ok(response) => {
                trace!("SPDM response: {:02x?}", response);
                Ok(response)
            }
            Err(CommandLayerError::UnknownCommand(_)) => {
                info!("Platform does not support SPDM.");
                Err(LIBSPDM_STATUS_SPDM_NOT_SUPPORTED)
            }
            Err(e) => {
                error!("Failed to unwrap SPDM response: {}", e);
                Err(LIBSPDM_STATUS_RECEIVE_FAIL)
            }
        }
    }
}
