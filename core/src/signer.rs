// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::{Context, Error, ProvideCredential, Result, SignRequest, SigningCredential};
use log::debug;
use std::sync::Arc;

/// Signer is the main struct used to sign the request.
///
/// Every call to [`Signer::sign`] resolves the credential again, so rotated
/// credentials are picked up immediately and concurrent calls share nothing
/// but the immutable provider and signer.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    provider: Arc<dyn ProvideCredential<Credential = K>>,
    signer: Arc<dyn SignRequest<Credential = K>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        provider: impl ProvideCredential<Credential = K>,
        signer: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,
            provider: Arc::new(provider),
            signer: Arc::new(signer),
        }
    }

    /// Get the context used by this signer.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Resolve a fresh credential and sign the request with it.
    pub async fn sign(&self, req: &mut http::request::Parts, body: &[u8]) -> Result<()> {
        let cred = self
            .provider
            .provide_credential(&self.ctx)
            .await
            .map_err(|err| {
                Error::credential_resolution_failed(err.to_string())
                    .with_context(format!("provider: {:?}", self.provider))
                    .with_source(err)
            })?;

        let Some(cred) = cred else {
            return Err(Error::credential_unavailable(
                "no credential source yields usable credentials",
            ));
        };
        if !cred.is_valid() {
            return Err(Error::credential_unavailable(
                "resolved credential is incomplete or expired",
            ));
        }
        debug!("resolved credential: {cred:?}");

        self.signer
            .sign_request(&self.ctx, req, body, Some(&cred))
            .await
    }
}
