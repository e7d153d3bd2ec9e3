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

//! Client for the mailbox API.
//!
//! The API lives behind an API gateway that authenticates every request with
//! AWS Signature Version 4. [`Client`] validates operation options, resolves
//! credentials, signs and sends the request, and hands back the response body:
//! pretty printed when the server answered with JSON, verbatim otherwise.
//!
//! ```no_run
//! use mailbox::email::ListOptions;
//! use mailbox::{default_context, Client, ClientConfig};
//! use mailbox_aws_v4::DefaultCredentialProvider;
//!
//! # async fn example() -> mailbox_core::Result<()> {
//! let client = Client::new(
//!     default_context(),
//!     ClientConfig::new("abc123", "us-west-2"),
//!     DefaultCredentialProvider::new(),
//! );
//!
//! let emails = client
//!     .list(ListOptions {
//!         email_type: "inbox".to_string(),
//!         order: "desc".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("{emails}");
//! # Ok(())
//! # }
//! ```

mod client;
pub use client::Client;

mod config;
pub use config::ClientConfig;
pub use config::{AWS_REGION, MAILBOX_API_ID, MAILBOX_ENDPOINT, MAILBOX_REGION};

pub mod command;
pub mod email;

pub use mailbox_core::{Error, ErrorKind, Result};

use mailbox_core::{Context, OsEnv};
use mailbox_file_read_tokio::TokioFileRead;
use mailbox_http_send_reqwest::ReqwestHttpSend;

/// Context backed by tokio file reads, reqwest and the process environment.
pub fn default_context() -> Context {
    Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv)
}
