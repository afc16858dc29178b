// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::actions::{SpdmActions, WorkerDependencies, WorkerState};
use super::error::WorkerError;
use super::message::{SpdmMessage, SpdmThreadError};
use super::queue::{ControllerQueues, MessageQueues, WorkerQueues};
use super::retry::retry_fixed;
use crate::config::{LibSpdmParams, RetryConfig};
use crate::provisioning::collaborators::ServiceConfigurationProvider;
use spin::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;

/// Controller-side facade over the single background SPDM worker.
pub struct SpdmBackgroundService {
    actions: SpdmActions,
    state: Arc<WorkerState>,
    queues: Mutex<Option<ControllerQueues>>,
    params: LibSpdmParams,
    retry: RetryConfig,
}

impl SpdmBackgroundService {
    pub fn new(deps: WorkerDependencies, params: LibSpdmParams, retry: RetryConfig) -> Self {
        let state = Arc::new(WorkerState::default());
        SpdmBackgroundService {
            actions: SpdmActions::new(deps, params.clone(), state.clone()),
            state,
            queues: Mutex::new(None),
            params,
            retry,
        }
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    pub fn ensure_process_is_not_running(&self) -> Result<(), WorkerError> {
        if self.state.is_processing() {
            debug!("SPDM process is still running.");
            return Err(WorkerError::ProcessStillRunning);
        }
        Ok(())
    }

    /// Installs fresh queues and returns the worker end. The previous
    /// result is discarded along with the previous channels.
    fn prepare_queues(&self) -> WorkerQueues {
        let (controller, worker) = MessageQueues::create();
        *self.queues.lock() = Some(controller);
        self.state.result().clear();
        worker
    }

    pub fn start_get_version(&self) {
        info!("Starting SPDM GET_VERSION process.");
        let queues = self.prepare_queues();
        let guard = self.state.begin();
        tokio::spawn(self.actions.clone().get_version_task(queues, guard));
    }

    pub fn start_vca_for_provisioning(&self) {
        info!("Starting SPDM VCA process.");
        let queues = self.prepare_queues();
        let guard = self.state.begin();
        tokio::spawn(self.actions.clone().vca_for_secure_session_task(queues, guard));
    }

    pub fn start_secure_session(
        &self,
        uid: &str,
        cfg_id: u64,
        configuration_provider: Arc<dyn ServiceConfigurationProvider>,
    ) {
        info!("Starting SPDM secure session process for device {}.", uid);
        let queues = self.prepare_queues();
        let guard = self.state.begin();
        tokio::spawn(self.actions.clone().secure_session_task(
            queues,
            guard,
            uid.to_string(),
            cfg_id,
            configuration_provider,
        ));
    }

    pub fn start_set_authority(&self, cert_chain: Vec<Vec<u8>>, slot_id: u8) {
        info!("Starting SPDM SET_CERTIFICATE process for slot {}.", slot_id);
        let queues = self.prepare_queues();
        let guard = self.state.begin();
        tokio::spawn(
            self.actions
                .clone()
                .set_authority_task(queues, guard, cert_chain, slot_id),
        );
    }

    fn controller_queues(&self) -> Option<ControllerQueues> {
        self.queues.lock().clone()
    }

    /// Never blocks. A full or closed queue means the worker is gone or
    /// out of step; the next read reports that.
    pub fn push_response_to_queue(&self, message: SpdmMessage) {
        let queues = match self.controller_queues() {
            Some(queues) => queues,
            None => {
                error!("No SPDM process to receive the response.");
                return;
            }
        };
        match queues.to_spdm.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => error!("Failed to push response to SPDM queue: queue is full."),
            Err(TrySendError::Closed(_)) => {
                error!("Failed to push response to SPDM queue: SPDM process finished.")
            }
        }
    }

    /// For flow starts, where the worker must have produced a message.
    pub async fn get_message_from_queue(&self) -> Result<SpdmMessage, WorkerError> {
        match self.try_get_message_from_queue().await {
            Ok(Some(message)) => Ok(message),
            Ok(None) | Err(_) => Err(WorkerError::UnrecoverableMessageFromQueueEmpty),
        }
    }

    /// `Ok(None)` means the worker finished and has nothing more to send.
    pub async fn try_get_message_from_queue(&self) -> Result<Option<SpdmMessage>, WorkerError> {
        let queues = match self.controller_queues() {
            Some(queues) => queues,
            None => return Ok(None),
        };
        retry_fixed(self.retry.queue, WorkerError::is_retryable, || {
            self.poll_queue(&queues)
        })
        .await
    }

    async fn poll_queue(&self, queues: &ControllerQueues) -> Result<Option<SpdmMessage>, WorkerError> {
        let mut from_spdm = queues.from_spdm.lock().await;
        match tokio::time::timeout(self.params.library_timeout(), from_spdm.recv()).await {
            Ok(Some(message)) => Ok(Some(message)),
            Ok(None) => Ok(None),
            Err(_) if self.state.is_processing() => Err(WorkerError::MessageFromQueueEmpty),
            Err(_) => Ok(None),
        }
    }

    pub fn is_processing(&self) -> bool {
        self.state.is_processing()
    }

    pub fn is_process_result(&self) -> bool {
        self.state.result().ready()
    }

    /// Consumes the stored result.
    pub fn get_process_result(&self) -> Option<SpdmThreadError> {
        self.state.result().consume()
    }
}
