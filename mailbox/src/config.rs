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

use std::time::Duration;

use mailbox_core::Context;

/// Env that holds the API gateway id.
pub const MAILBOX_API_ID: &str = "MAILBOX_API_ID";
/// Env that holds the region of the API gateway.
pub const MAILBOX_REGION: &str = "MAILBOX_REGION";
/// Env that overrides the whole endpoint.
pub const MAILBOX_ENDPOINT: &str = "MAILBOX_ENDPOINT";
/// Region env shared with the AWS tooling, used when `MAILBOX_REGION` is unset.
pub const AWS_REGION: &str = "AWS_REGION";

/// Config for the mailbox client.
///
/// Built once by the caller and never mutated by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// Id of the API gateway that fronts the mailbox API.
    pub api_id: String,
    /// Region of the API gateway, also used as the signing region.
    pub region: String,
    /// Endpoint used verbatim instead of the one derived from `api_id` and `region`.
    pub endpoint: Option<String>,
    /// Log endpoint, request line and response status at info level.
    pub verbose: bool,
    /// Deadline for a whole operation call.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create a config for the given API gateway.
    pub fn new(api_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            api_id: api_id.into(),
            region: region.into(),
            ..Default::default()
        }
    }

    /// Set the endpoint override.
    ///
    /// An empty endpoint is the same as no override.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        self.endpoint = (!endpoint.is_empty()).then_some(endpoint);
        self
    }

    /// Enable or disable verbose logging.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the deadline for each operation call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Fill fields that are still unset from the environment.
    ///
    /// Values set explicitly always win over the environment.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let env = |key: &str| ctx.env_var(key).filter(|v| !v.is_empty());

        if self.api_id.is_empty() {
            if let Some(v) = env(MAILBOX_API_ID) {
                self.api_id = v;
            }
        }
        if self.region.is_empty() {
            if let Some(v) = env(MAILBOX_REGION).or_else(|| env(AWS_REGION)) {
                self.region = v;
            }
        }
        if self.endpoint.is_none() {
            self.endpoint = env(MAILBOX_ENDPOINT);
        }
        self
    }

    /// Resolve the base URL requests are sent to.
    ///
    /// The override is returned as is, trailing slash included.
    pub fn endpoint(&self) -> String {
        match self.endpoint.as_deref() {
            Some(endpoint) if !endpoint.is_empty() => endpoint.to_string(),
            _ => format!(
                "https://{}.execute-api.{}.amazonaws.com",
                self.api_id, self.region
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailbox_core::{OsEnv, StaticEnv};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_endpoint_from_api_id() {
        let config = ClientConfig::new("abc123", "us-west-2");

        assert_eq!(
            config.endpoint(),
            "https://abc123.execute-api.us-west-2.amazonaws.com"
        );
    }

    #[test]
    fn test_endpoint_override_is_verbatim() {
        let config = ClientConfig::new("abc123", "us-west-2").with_endpoint("http://localhost:8080/");
        assert_eq!(config.endpoint(), "http://localhost:8080/");

        let config = ClientConfig::new("abc123", "us-west-2").with_endpoint("");
        assert_eq!(config.endpoint, None);
        assert_eq!(
            config.endpoint(),
            "https://abc123.execute-api.us-west-2.amazonaws.com"
        );
    }

    #[test]
    fn test_from_env_fills_unset_fields() {
        let ctx = Context::new().with_env(StaticEnv {
            home_dir: None,
            envs: HashMap::from([
                (MAILBOX_API_ID.to_string(), "env-api".to_string()),
                (AWS_REGION.to_string(), "eu-west-1".to_string()),
            ]),
        });

        let config = ClientConfig::default().from_env(&ctx);
        assert_eq!(config.api_id, "env-api");
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.endpoint, None);

        let config = ClientConfig::new("explicit", "").from_env(&ctx);
        assert_eq!(config.api_id, "explicit");
        assert_eq!(config.region, "eu-west-1");
    }

    #[test]
    fn test_from_env_prefers_mailbox_region() {
        temp_env::with_vars(
            [
                (MAILBOX_REGION, Some("ap-northeast-1")),
                (AWS_REGION, Some("us-east-1")),
                (MAILBOX_ENDPOINT, Some("http://127.0.0.1:3000")),
            ],
            || {
                let ctx = Context::new().with_env(OsEnv);
                let config = ClientConfig::default().from_env(&ctx);

                assert_eq!(config.region, "ap-northeast-1");
                assert_eq!(config.endpoint(), "http://127.0.0.1:3000");
            },
        );
    }
}
