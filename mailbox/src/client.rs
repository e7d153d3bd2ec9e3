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

use std::future::Future;

use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderValue, Method, Request, Response};
use log::{debug, log, Level};
use mailbox_aws_v4::{Credential, RequestSigner, EXECUTE_API_SERVICE};
use mailbox_core::{Context, Error, ProvideCredential, Result, Signer};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::ClientConfig;
use crate::email::{
    CreateOptions, DeleteOptions, GetOptions, ListOptions, SaveOptions, SendOptions,
    TrashOptions, UntrashOptions,
};

const APPLICATION_JSON: &str = "application/json";

/// Characters kept as is when a message id is placed in a path segment.
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Client for the mailbox API.
///
/// Each call validates its options, resolves a fresh credential, signs the
/// request and sends it exactly once. Nothing is shared between calls except
/// the immutable config, so a client can be used concurrently.
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
    signer: Signer<Credential>,
}

impl Client {
    /// Create a new client.
    ///
    /// The context supplies file access for payload files, the transport and
    /// the environment used by credential providers.
    pub fn new(
        ctx: Context,
        config: ClientConfig,
        provider: impl ProvideCredential<Credential = Credential>,
    ) -> Self {
        let signer = Signer::new(
            ctx,
            provider,
            RequestSigner::new(EXECUTE_API_SERVICE, &config.region),
        );
        Self { config, signer }
    }

    /// Get the config of this client.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn context(&self) -> &Context {
        self.signer.context()
    }

    fn level(&self) -> Level {
        if self.config.verbose {
            Level::Info
        } else {
            Level::Debug
        }
    }

    /// List emails.
    pub async fn list(&self, options: ListOptions) -> Result<String> {
        options.check()?;
        self.request(Method::GET, "/emails", &options.query(), None)
            .await
    }

    /// Get a single email.
    pub async fn get(&self, options: GetOptions) -> Result<String> {
        options.check()?;
        self.request(Method::GET, &email_path(&options.message_id, ""), &[], None)
            .await
    }

    /// Create an email, or send it right away when `send` is set.
    pub async fn create(&self, options: CreateOptions) -> Result<String> {
        let options = options.resolve(self.context()).await?;
        options.check()?;

        let payload = serde_json::to_vec(&options)
            .map_err(|e| Error::unexpected("failed to serialize payload").with_source(e))?;
        self.request(Method::POST, "/emails", &[], Some(payload))
            .await
    }

    /// Save a draft.
    pub async fn save(&self, options: SaveOptions) -> Result<String> {
        let options = options.resolve(self.context()).await?;
        options.check()?;

        let payload = serde_json::to_vec(&options)
            .map_err(|e| Error::unexpected("failed to serialize payload").with_source(e))?;
        self.request(
            Method::PUT,
            &email_path(&options.message_id, ""),
            &[],
            Some(payload),
        )
        .await
    }

    /// Send a draft.
    pub async fn send(&self, options: SendOptions) -> Result<String> {
        options.check()?;
        self.request(
            Method::POST,
            &email_path(&options.message_id, "/send"),
            &[],
            None,
        )
        .await
    }

    /// Move an email to trash.
    pub async fn trash(&self, options: TrashOptions) -> Result<String> {
        options.check()?;
        self.request(
            Method::POST,
            &email_path(&options.message_id, "/trash"),
            &[],
            None,
        )
        .await
    }

    /// Restore an email from trash.
    pub async fn untrash(&self, options: UntrashOptions) -> Result<String> {
        options.check()?;
        self.request(
            Method::POST,
            &email_path(&options.message_id, "/untrash"),
            &[],
            None,
        )
        .await
    }

    /// Delete an email permanently.
    pub async fn delete(&self, options: DeleteOptions) -> Result<String> {
        options.check()?;
        self.request(
            Method::DELETE,
            &email_path(&options.message_id, ""),
            &[],
            None,
        )
        .await
    }

    /// Build, sign and send one request, then normalize its body.
    ///
    /// Query pairs with an empty value are dropped. A configured timeout
    /// bounds the whole call, credential resolution included.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        payload: Option<Vec<u8>>,
    ) -> Result<String> {
        let call = self.dispatch(method, path, query, payload.unwrap_or_default());
        with_deadline(self.config.timeout, call).await
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        payload: Vec<u8>,
    ) -> Result<String> {
        if self.config.endpoint.is_none()
            && (self.config.api_id.is_empty() || self.config.region.is_empty())
        {
            return Err(Error::config_invalid(
                "api id and region are required without an endpoint",
            ));
        }

        let endpoint = self.config.endpoint();
        let url = build_url(&endpoint, path, query);
        log!(self.level(), "endpoint: {endpoint}");
        log!(self.level(), "request: {method} {url}");

        let mut builder = Request::builder()
            .method(method.clone())
            .uri(&url)
            .header(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
        if method == Method::POST || method == Method::PUT {
            builder = builder.header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        }
        let (mut parts, _) = builder
            .body(())
            .map_err(|e| {
                Error::request_invalid("failed to build request")
                    .with_source(e)
                    .with_context(format!("url: {url}"))
            })?
            .into_parts();

        self.signer.sign(&mut parts, &payload).await?;

        let req = Request::from_parts(parts, Bytes::from(payload));
        let resp = self.context().http_send(req).await?;
        log!(self.level(), "response status: {}", resp.status());

        normalize_response(resp)
    }
}

fn email_path(message_id: &str, action: &str) -> String {
    format!(
        "/emails/{}{action}",
        utf8_percent_encode(message_id, PATH_SEGMENT_ENCODE_SET)
    )
}

fn build_url(endpoint: &str, path: &str, query: &[(&str, &str)]) -> String {
    let mut url = format!("{endpoint}{path}");

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut has_query = false;
    for (k, v) in query.iter().filter(|(_, v)| !v.is_empty()) {
        serializer.append_pair(k, v);
        has_query = true;
    }
    if has_query {
        url.push('?');
        url.push_str(&serializer.finish());
    }

    url
}

async fn with_deadline<T>(
    timeout: Option<std::time::Duration>,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    let Some(timeout) = timeout else {
        return call.await;
    };

    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(elapsed) => Err(Error::deadline_exceeded(format!(
            "request not finished within {timeout:?}"
        ))
        .with_source(elapsed)),
    }
}

fn is_json(resp: &Response<Bytes>) -> bool {
    resp.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case(APPLICATION_JSON))
}

/// JSON bodies come back indented, everything else as is.
fn normalize_response(resp: Response<Bytes>) -> Result<String> {
    if !is_json(&resp) {
        return Ok(String::from_utf8_lossy(resp.body()).into_owned());
    }

    let value: serde_json::Value = serde_json::from_slice(resp.body()).map_err(|e| {
        Error::response_decode(format!("failed to parse json response: {e}"))
            .with_source(e)
            .with_context(format!("status: {}", resp.status()))
    })?;
    debug!("response is json, pretty printing");
    serde_json::to_string_pretty(&value)
        .map_err(|e| Error::unexpected("failed to format json response").with_source(e))
}
