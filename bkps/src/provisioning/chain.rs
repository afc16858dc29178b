// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Ordered handler list walked once per request.

use super::dto::ProvisioningResponseDto;
use super::error::{ProvisioningError, ProvisioningResult};
use super::flow::FlowStage;
use super::transfer::ProvisioningTransferObject;
use async_trait::async_trait;
use std::collections::BTreeMap;

#[derive(Debug)]
pub enum HandlerOutcome {
    Respond(ProvisioningResponseDto),
    /// Not this handler's stage, or its checks passed; try the next one.
    Next,
}

#[async_trait]
pub trait ProvisioningHandler: Send + Sync {
    fn name(&self) -> &'static str;

    /// Stage this handler answers. Structural handlers return `None`.
    fn stage(&self) -> Option<FlowStage> {
        None
    }

    async fn handle(
        &self,
        transfer: &mut ProvisioningTransferObject,
    ) -> ProvisioningResult<HandlerOutcome>;
}

pub struct ProvisioningChain {
    handlers: Vec<Box<dyn ProvisioningHandler>>,
}

impl ProvisioningChain {
    pub fn new(handlers: Vec<Box<dyn ProvisioningHandler>>) -> ProvisioningResult<Self> {
        let mut claimed: BTreeMap<FlowStage, &'static str> = BTreeMap::new();
        for handler in handlers.iter() {
            if let Some(stage) = handler.stage() {
                if let Some(other) = claimed.insert(stage, handler.name()) {
                    return Err(ProvisioningError::Generic(format!(
                        "Flow stage {} is handled by both {} and {}.",
                        stage,
                        other,
                        handler.name()
                    )));
                }
            }
        }
        Ok(ProvisioningChain { handlers })
    }

    pub fn stage_table(&self) -> BTreeMap<FlowStage, &'static str> {
        self.handlers
            .iter()
            .filter_map(|h| h.stage().map(|stage| (stage, h.name())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub async fn dispatch(
        &self,
        transfer: &mut ProvisioningTransferObject,
    ) -> ProvisioningResult<ProvisioningResponseDto> {
        for handler in self.handlers.iter() {
            trace!("handler: {}", handler.name());
            if let HandlerOutcome::Respond(response) = handler.handle(transfer).await? {
                return Ok(response);
            }
        }
        let stage = transfer
            .flow_stage()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "NONE".to_string());
        error!("No handler for flow stage {}", stage);
        Err(ProvisioningError::Generic(format!(
            "No handler for flow stage {}.",
            stage
        )))
    }
}
