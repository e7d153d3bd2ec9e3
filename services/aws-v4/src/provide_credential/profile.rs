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

use crate::constants::*;
use crate::Credential;
use async_trait::async_trait;
use ini::{Ini, Properties};
use log::debug;
use mailbox_core::{Context, Error, ProvideCredential, Result};

const DEFAULT_PROFILE: &str = "default";
const DEFAULT_CREDENTIALS_FILE: &str = "~/.aws/credentials";
const DEFAULT_CONFIG_FILE: &str = "~/.aws/config";

/// ProfileCredentialProvider loads credential from the shared AWS files.
///
/// The shared credentials file is consulted first, then the config file.
/// Missing or unreadable files mean "no credential here", while a file
/// that exists but is not valid ini is an error.
#[derive(Debug)]
pub struct ProfileCredentialProvider {
    profile: String,
    config_file: Option<String>,
    credentials_file: Option<String>,
}

impl Default for ProfileCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileCredentialProvider {
    /// Create a new ProfileCredentialProvider with default settings.
    pub fn new() -> Self {
        Self {
            profile: DEFAULT_PROFILE.to_string(),
            config_file: None,
            credentials_file: None,
        }
    }

    /// Set the profile name to use.
    ///
    /// `AWS_PROFILE` still takes precedence when set.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the path to the config file.
    pub fn with_config_file(mut self, path: impl Into<String>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Set the path to the credentials file.
    pub fn with_credentials_file(mut self, path: impl Into<String>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    async fn load_ini(&self, ctx: &Context, path: &str) -> Result<Option<Ini>> {
        let expanded_path = if path.starts_with("~/") {
            match ctx.expand_home_dir(path) {
                Some(expanded) => expanded,
                None => {
                    debug!("failed to expand homedir for path: {path}");
                    return Ok(None);
                }
            }
        } else {
            path.to_string()
        };

        let content = match ctx.file_read(&expanded_path).await {
            Ok(content) => content,
            Err(err) => {
                debug!("failed to read profile file {expanded_path}: {err}");
                return Ok(None);
            }
        };

        let conf = Ini::load_from_str(&String::from_utf8_lossy(&content)).map_err(|e| {
            Error::config_invalid("failed to parse profile file")
                .with_source(e)
                .with_context(format!("path: {expanded_path}"))
        })?;
        Ok(Some(conf))
    }

    async fn load_from_credentials_file(
        &self,
        ctx: &Context,
        profile: &str,
    ) -> Result<Option<Credential>> {
        let path = match &self.credentials_file {
            Some(path) => path.clone(),
            None => ctx
                .env_var(AWS_SHARED_CREDENTIALS_FILE)
                .unwrap_or_else(|| DEFAULT_CREDENTIALS_FILE.to_string()),
        };
        let Some(conf) = self.load_ini(ctx, &path).await? else {
            return Ok(None);
        };

        // Sections in the credentials file carry the bare profile name.
        match conf.section(Some(profile)) {
            Some(props) => Ok(credential_from_props(props)),
            None => {
                debug!("profile {profile} not found in credentials file");
                Ok(None)
            }
        }
    }

    async fn load_from_config_file(
        &self,
        ctx: &Context,
        profile: &str,
    ) -> Result<Option<Credential>> {
        let path = match &self.config_file {
            Some(path) => path.clone(),
            None => ctx
                .env_var(AWS_CONFIG_FILE)
                .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string()),
        };
        let Some(conf) = self.load_ini(ctx, &path).await? else {
            return Ok(None);
        };

        let section = match profile {
            DEFAULT_PROFILE => DEFAULT_PROFILE.to_string(),
            x => format!("profile {x}"),
        };
        match conf.section(Some(section.as_str())) {
            Some(props) => Ok(credential_from_props(props)),
            None => {
                debug!("section {section} not found in config file");
                Ok(None)
            }
        }
    }
}

fn credential_from_props(props: &Properties) -> Option<Credential> {
    let access_key_id = props.get("aws_access_key_id")?;
    let secret_access_key = props.get("aws_secret_access_key")?;

    Some(Credential {
        access_key_id: access_key_id.to_string(),
        secret_access_key: secret_access_key.to_string(),
        session_token: props.get("aws_session_token").map(|s| s.to_string()),
        expires_in: None,
    })
}

#[async_trait]
impl ProvideCredential for ProfileCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let profile = ctx
            .env_var(AWS_PROFILE)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| self.profile.clone());

        if let Some(cred) = self.load_from_credentials_file(ctx, &profile).await? {
            return Ok(Some(cred));
        }

        self.load_from_config_file(ctx, &profile).await
    }
}
