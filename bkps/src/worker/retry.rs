// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use crate::config::RetryPolicy;
use core::future::Future;

/// Runs `op` until it succeeds, fails with an error `should_retry` rejects,
/// or `policy.max_retries` retries are spent. The delay never grows.
pub async fn retry_fixed<T, E, F, Fut, P>(policy: RetryPolicy, should_retry: P, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut retries = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if retries < policy.max_retries && should_retry(&e) => {
                retries += 1;
                debug!(
                    "Waiting for SPDM process ... retry {}/{}",
                    retries, policy.max_retries
                );
                tokio::time::sleep(policy.delay()).await;
            }
            Err(e) => return Err(e),
        }
    }
}
