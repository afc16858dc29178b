// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use crate::provisioning::chain::{HandlerOutcome, ProvisioningHandler};
use crate::provisioning::dto::ProvisioningRequestDtoReader;
use crate::provisioning::encryption::ContextEncryptionProvider;
use crate::provisioning::error::{ProvisioningError, ProvisioningResult};
use crate::provisioning::transfer::ProvisioningTransferObject;
use async_trait::async_trait;
use std::sync::Arc;

/// Decrypts the inbound context and attaches the reader to the request.
pub struct ProvAdapterComponent {
    encryption_provider: Option<Arc<dyn ContextEncryptionProvider>>,
}

impl ProvAdapterComponent {
    pub fn new(encryption_provider: Option<Arc<dyn ContextEncryptionProvider>>) -> Self {
        ProvAdapterComponent {
            encryption_provider,
        }
    }
}

#[async_trait]
impl ProvisioningHandler for ProvAdapterComponent {
    fn name(&self) -> &'static str {
        "ProvAdapterComponent"
    }

    async fn handle(
        &self,
        transfer: &mut ProvisioningTransferObject,
    ) -> ProvisioningResult<HandlerOutcome> {
        let reader =
            ProvisioningRequestDtoReader::new(transfer.dto(), self.encryption_provider.as_deref())
                .map_err(|e| {
                    error!("Failed to read provisioning request: {}", e);
                    match e {
                        ProvisioningError::Encryption(msg) => ProvisioningError::Generic(msg),
                        other => other.into_generic(),
                    }
                })?;
        transfer.set_dto_reader(reader);
        Ok(HandlerOutcome::Next)
    }
}
