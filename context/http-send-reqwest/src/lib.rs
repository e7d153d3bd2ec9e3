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

//! Reqwest-based HTTP client implementation for mailbox.
//!
//! `ReqwestHttpSend` implements `HttpSend` from `mailbox_core`. It executes
//! the request exactly once, reads the whole body, and reports failures as
//! `ErrorKind::Transport`, or `ErrorKind::DeadlineExceeded` when reqwest
//! gave up because of a timeout.

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use mailbox_core::{Error, HttpSend, Result};
use reqwest::{Client, Request};

/// Reqwest-based implementation of the `HttpSend` trait.
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let req = Request::try_from(req).map_err(|e| {
            Error::request_invalid(format!("failed to convert request: {e}")).with_source(e)
        })?;
        let resp: http::Response<_> = self.client.execute(req).await.map_err(classify)?.into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(classify)?;
        Ok(http::Response::from_parts(parts, bs))
    }
}

/// The reqwest message is kept verbatim so callers see the original cause.
fn classify(err: reqwest::Error) -> Error {
    let e = if err.is_timeout() {
        Error::deadline_exceeded(err.to_string())
    } else {
        Error::transport(err.to_string())
    };
    e.with_source(err)
}
