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

use crate::constants::{AWS_EC2_METADATA_DISABLED, AWS_EC2_METADATA_SERVICE_ENDPOINT};
use crate::Credential;
use async_trait::async_trait;
use bytes::Bytes;
use http::header::CONTENT_LENGTH;
use http::{Method, StatusCode};
use log::debug;
use mailbox_core::time::parse_rfc3339;
use mailbox_core::{Context, Error, ProvideCredential, Result};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "http://169.254.169.254";
const TOKEN_TTL_HEADER: &str = "x-aws-ec2-metadata-token-ttl-seconds";
const TOKEN_HEADER: &str = "x-aws-ec2-metadata-token";
/// Off EC2 the metadata address never answers, so give up early.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// IMDSv2CredentialProvider loads the role credential of an EC2 instance.
///
/// A session token is requested first and then used to list and fetch the
/// role credential. Nothing is cached: every call talks to the metadata
/// service again. Each metadata request is bounded by a timeout (1 second
/// unless set with [`IMDSv2CredentialProvider::with_timeout`]).
#[derive(Debug, Clone, Default)]
pub struct IMDSv2CredentialProvider {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl IMDSv2CredentialProvider {
    /// Create a new `IMDSv2CredentialProvider` instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint for the metadata service.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the timeout for metadata requests.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn get_endpoint(&self, ctx: &Context) -> String {
        self.endpoint
            .clone()
            .or_else(|| ctx.env_var(AWS_EC2_METADATA_SERVICE_ENDPOINT))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    async fn send(
        &self,
        ctx: &Context,
        req: http::Request<Bytes>,
        operation: &str,
    ) -> Result<http::Response<String>> {
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        match tokio::time::timeout(timeout, ctx.http_send_as_string(req)).await {
            Ok(resp) => resp.map_err(|e| {
                Error::unexpected("failed to request IMDS")
                    .with_source(e)
                    .with_context(format!("operation: {operation}"))
            }),
            Err(_) => Err(Error::deadline_exceeded(format!(
                "IMDS did not respond within {timeout:?}"
            ))
            .with_context(format!("operation: {operation}"))),
        }
    }

    async fn load_ec2_metadata_token(&self, ctx: &Context, endpoint: &str) -> Result<String> {
        let url = format!("{endpoint}/latest/api/token");
        let req = http::Request::builder()
            .uri(&url)
            .method(Method::PUT)
            .header(CONTENT_LENGTH, "0")
            // 21600s (6h) is recommended by AWS.
            .header(TOKEN_TTL_HEADER, "21600")
            .body(Bytes::new())?;

        let resp = self
            .send(ctx, req, "fetch_imds_token")
            .await
            .map_err(|e| e.with_context(format!("endpoint: {endpoint}")))?;
        if resp.status() != StatusCode::OK {
            return Err(imds_error("fetch_imds_token", resp.status(), resp.body()));
        }

        Ok(resp.into_body())
    }

    async fn get(&self, ctx: &Context, url: &str, token: &str, operation: &str) -> Result<String> {
        let req = http::Request::builder()
            .uri(url)
            .method(Method::GET)
            .header(TOKEN_HEADER, token)
            .body(Bytes::new())?;

        let resp = self.send(ctx, req, operation).await?;
        if resp.status() != StatusCode::OK {
            return Err(imds_error(operation, resp.status(), resp.body()));
        }

        Ok(resp.into_body())
    }
}

#[async_trait]
impl ProvideCredential for IMDSv2CredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        if ctx
            .env_var(AWS_EC2_METADATA_DISABLED)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        {
            debug!("IMDS is disabled by environment");
            return Ok(None);
        }

        let endpoint = self.get_endpoint(ctx);
        let token = self.load_ec2_metadata_token(ctx, &endpoint).await?;

        // List all credentials that node has.
        let url = format!("{endpoint}/latest/meta-data/iam/security-credentials/");
        let profile_name = self
            .get(ctx, &url, &token, "list_instance_profiles")
            .await?;
        let Some(profile_name) = profile_name.lines().map(str::trim).find(|v| !v.is_empty())
        else {
            return Err(
                Error::config_invalid("no IAM role attached to EC2 instance")
                    .with_context("hint: attach an IAM role to your EC2 instance"),
            );
        };

        // Get the credentials via role_name.
        let url = format!("{endpoint}/latest/meta-data/iam/security-credentials/{profile_name}");
        let content = self
            .get(ctx, &url, &token, "fetch_credentials")
            .await
            .map_err(|e| e.with_context(format!("profile: {profile_name}")))?;

        let resp: Ec2MetadataIamSecurityCredentials =
            serde_json::from_str(&content).map_err(|e| {
                Error::unexpected("failed to parse IMDS credentials response")
                    .with_source(e)
                    .with_context(format!("profile: {profile_name}"))
            })?;

        match resp.code.as_str() {
            "Success" => {}
            code if code.contains("Expired") => {
                return Err(Error::credential_invalid(format!(
                    "IMDS credentials expired: {}",
                    resp.message
                ))
                .with_context(format!("error_code: {code}")));
            }
            code => {
                return Err(Error::credential_invalid(format!(
                    "IMDS returned error: [{code}] {}",
                    resp.message
                ))
                .with_context(format!("profile: {profile_name}")));
            }
        }

        let expires_in = parse_rfc3339(&resp.expiration).map_err(|e| {
            e.with_context(format!("expiration_value: {}", resp.expiration))
        })?;

        Ok(Some(Credential {
            access_key_id: resp.access_key_id,
            secret_access_key: resp.secret_access_key,
            session_token: Some(resp.token),
            expires_in: Some(expires_in),
        }))
    }
}

fn imds_error(operation: &str, status: StatusCode, body: &str) -> Error {
    let message = format!("IMDS {operation} failed with status {status}");
    let err = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::credential_invalid(message),
        StatusCode::NOT_FOUND => Error::config_invalid(message),
        _ => Error::unexpected(message),
    };
    err.with_context(format!("response: {body}"))
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Ec2MetadataIamSecurityCredentials {
    access_key_id: String,
    secret_access_key: String,
    token: String,
    expiration: String,

    code: String,
    message: String,
}
