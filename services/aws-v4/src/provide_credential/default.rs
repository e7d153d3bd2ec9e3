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

use crate::provide_credential::{
    EnvCredentialProvider, IMDSv2CredentialProvider, ProfileCredentialProvider,
};
use crate::Credential;
use async_trait::async_trait;
use mailbox_core::{Context, ProvideCredential, ProvideCredentialChain, Result};

/// DefaultCredentialProvider walks the standard AWS credential sources.
///
/// Resolution order:
///
/// 1. Environment variables
/// 2. Shared credentials and config files
/// 3. EC2 instance metadata (IMDSv2)
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultCredentialProvider {
    /// Create a new `DefaultCredentialProvider` instance.
    pub fn new() -> Self {
        let chain = ProvideCredentialChain::new()
            .push(EnvCredentialProvider::new())
            .push(ProfileCredentialProvider::new())
            .push(IMDSv2CredentialProvider::new());

        Self { chain }
    }

    /// Create with a custom credential chain.
    pub fn with_chain(chain: ProvideCredentialChain<Credential>) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        AWS_ACCESS_KEY_ID, AWS_CONFIG_FILE, AWS_EC2_METADATA_DISABLED, AWS_SECRET_ACCESS_KEY,
        AWS_SHARED_CREDENTIALS_FILE,
    };
    use crate::StaticCredentialProvider;
    use bytes::Bytes;
    use mailbox_core::{HttpSend, StaticEnv};
    use mailbox_file_read_tokio::TokioFileRead;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    fn context(envs: &[(&str, &str)]) -> Context {
        let mut envs = envs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        // Never reach out to a real metadata service from tests.
        envs.insert(AWS_EC2_METADATA_DISABLED.to_string(), "true".to_string());

        Context::new()
            .with_file_read(TokioFileRead)
            .with_env(StaticEnv {
                home_dir: None,
                envs,
            })
    }

    #[tokio::test]
    async fn test_default_chain_without_sources() {
        let _ = env_logger::builder().is_test(true).try_init();

        let l = DefaultCredentialProvider::new();
        let x = l
            .provide_credential(&context(&[]))
            .await
            .expect("load must succeed");
        assert!(x.is_none());
    }

    /// Nothing ever answers, like the metadata address off EC2.
    #[derive(Debug)]
    struct StalledHttpSend;

    #[async_trait]
    impl HttpSend for StalledHttpSend {
        async fn http_send(&self, _: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(mailbox_core::Error::unexpected("stalled transport woke up"))
        }
    }

    #[tokio::test]
    async fn test_default_chain_gives_up_on_unreachable_imds() {
        let _ = env_logger::builder().is_test(true).try_init();

        let ctx = Context::new()
            .with_file_read(TokioFileRead)
            .with_http_send(StalledHttpSend)
            .with_env(StaticEnv {
                home_dir: None,
                envs: HashMap::new(),
            });

        let x = tokio::time::timeout(
            Duration::from_secs(30),
            DefaultCredentialProvider::new().provide_credential(&ctx),
        )
        .await
        .expect("imds must give up on its own")
        .expect("load must succeed");
        assert!(x.is_none());
    }

    #[tokio::test]
    async fn test_default_chain_prefers_env() -> anyhow::Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let tmp_dir = tempdir()?;
        let credentials = tmp_dir.path().join("credentials");
        fs::write(
            &credentials,
            "[default]\naws_access_key_id = shared_access_key_id\naws_secret_access_key = shared_secret_access_key\n",
        )?;
        let credentials = credentials.to_string_lossy().to_string();

        let ctx = context(&[
            (AWS_ACCESS_KEY_ID, "access_key_id"),
            (AWS_SECRET_ACCESS_KEY, "secret_access_key"),
            (AWS_SHARED_CREDENTIALS_FILE, credentials.as_str()),
        ]);

        let x = DefaultCredentialProvider::new()
            .provide_credential(&ctx)
            .await?
            .expect("must load succeed");
        assert_eq!("access_key_id", x.access_key_id);
        assert_eq!("secret_access_key", x.secret_access_key);

        Ok(())
    }

    /// AWS_SHARED_CREDENTIALS_FILE should be taken first.
    #[tokio::test]
    async fn test_default_chain_profile_from_both() -> anyhow::Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let tmp_dir = tempdir()?;
        let config = tmp_dir.path().join("config");
        fs::write(
            &config,
            "[default]\naws_access_key_id = config_access_key_id\naws_secret_access_key = config_secret_access_key\n",
        )?;
        let credentials = tmp_dir.path().join("credentials");
        fs::write(
            &credentials,
            "[default]\naws_access_key_id = shared_access_key_id\naws_secret_access_key = shared_secret_access_key\n",
        )?;
        let config = config.to_string_lossy().to_string();
        let credentials = credentials.to_string_lossy().to_string();

        let ctx = context(&[
            (AWS_CONFIG_FILE, config.as_str()),
            (AWS_SHARED_CREDENTIALS_FILE, credentials.as_str()),
        ]);
        let x = DefaultCredentialProvider::new()
            .provide_credential(&ctx)
            .await?
            .expect("must load succeed");
        assert_eq!("shared_access_key_id", x.access_key_id);
        assert_eq!("shared_secret_access_key", x.secret_access_key);

        let ctx = context(&[
            (AWS_CONFIG_FILE, config.as_str()),
            (AWS_SHARED_CREDENTIALS_FILE, "/non/existent/path"),
        ]);
        let x = DefaultCredentialProvider::new()
            .provide_credential(&ctx)
            .await?
            .expect("must load succeed");
        assert_eq!("config_access_key_id", x.access_key_id);

        Ok(())
    }

    #[tokio::test]
    async fn test_default_chain_skips_broken_profile() -> anyhow::Result<()> {
        let tmp_dir = tempdir()?;
        let credentials = tmp_dir.path().join("credentials");
        fs::write(&credentials, "[default\n")?;
        let credentials = credentials.to_string_lossy().to_string();

        let chain = ProvideCredentialChain::new()
            .push(ProfileCredentialProvider::new().with_credentials_file(credentials))
            .push(StaticCredentialProvider::new("static_ak", "static_sk"));
        let x = DefaultCredentialProvider::with_chain(chain)
            .provide_credential(&context(&[]))
            .await?
            .expect("must load succeed");
        assert_eq!("static_ak", x.access_key_id);

        Ok(())
    }
}
