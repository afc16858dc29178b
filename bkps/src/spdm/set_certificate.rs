// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::error::{SpdmError, SpdmResult};
use codec::Writer;
use ring::digest;

const SET_CERT_RESERVED_FIELD_LEN: usize = 2;
const WORD_SIZE: usize = 4;

/// SET_CERTIFICATE chain: `len (u16 LE) || reserved(2) || SHA-384(root) || certs`,
/// zero padded to a whole number of words.
#[derive(Debug, Clone, Default)]
pub struct SpdmSetCertificateBuilder {
    len_of_cert_chain: u16,
    cert_chain_buffer: Vec<u8>,
}

impl SpdmSetCertificateBuilder {
    pub fn parse(mut self, certificate_chain: &[Vec<u8>]) -> SpdmResult<Self> {
        let root = certificate_chain.first().ok_or_else(|| {
            SpdmError::Runtime("Certificate chain for Set Authority is empty.".to_string())
        })?;
        let root_hash = digest::digest(&digest::SHA384, root);
        debug!("Calculated ROOT Cert Chain Hash: {:02x?}", root_hash.as_ref());

        let len = 2
            + SET_CERT_RESERVED_FIELD_LEN
            + root_hash.as_ref().len()
            + certificate_chain.iter().map(|c| c.len()).sum::<usize>();
        if len > u16::MAX as usize {
            return Err(SpdmError::Runtime(format!(
                "Certificate chain for Set Authority is too long: {} bytes",
                len
            )));
        }
        self.len_of_cert_chain = len as u16;

        let padded = (len + WORD_SIZE - 1) / WORD_SIZE * WORD_SIZE;
        let mut w = Writer::with_capacity(padded);
        w.extend_from_slice(&self.len_of_cert_chain.to_le_bytes());
        w.zeros(SET_CERT_RESERVED_FIELD_LEN);
        w.extend_from_slice(root_hash.as_ref());
        for cert in certificate_chain {
            w.extend_from_slice(cert);
        }
        w.zeros(padded - len);
        debug!(
            "Calculated Cert Chain Len: {} bytes. Total cert chain len with padding: {} bytes",
            len, padded
        );
        self.cert_chain_buffer = w.into_vec();
        Ok(self)
    }

    pub fn len_of_cert_chain(&self) -> u16 {
        self.len_of_cert_chain
    }

    pub fn build(&self) -> Vec<u8> {
        trace!("SPDM Certificate: {:02x?}", self.cert_chain_buffer);
        self.cert_chain_buffer.clone()
    }
}
