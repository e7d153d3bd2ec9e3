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

//! AWS Signature Version 4 signing for the mailbox API.
//!
//! The mailbox API sits behind an API gateway (`execute-api`) that
//! authenticates every request by recomputing its SigV4 signature.
//!
//! - [`RequestSigner`] signs `http::request::Parts` with the payload hash,
//!   date, host and optional session token bound into the signature.
//! - [`DefaultCredentialProvider`] discovers credentials from the environment,
//!   shared profile files and EC2 instance metadata, in that order.
//!
//! ```no_run
//! use mailbox_aws_v4::{DefaultCredentialProvider, RequestSigner, EXECUTE_API_SERVICE};
//! use mailbox_core::{Context, OsEnv, Signer};
//!
//! # async fn example() -> mailbox_core::Result<()> {
//! let ctx = Context::new().with_env(OsEnv);
//! let signer = Signer::new(
//!     ctx,
//!     DefaultCredentialProvider::new(),
//!     RequestSigner::new(EXECUTE_API_SERVICE, "us-west-2"),
//! );
//!
//! let mut parts = http::Request::get("https://abc.execute-api.us-west-2.amazonaws.com/emails")
//!     .body(())?
//!     .into_parts()
//!     .0;
//! signer.sign(&mut parts, b"").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod constants;
pub use constants::EXECUTE_API_SERVICE;
pub use constants::X_AMZ_DATE;
pub use constants::X_AMZ_SECURITY_TOKEN;

mod credential;
pub use credential::Credential;

mod sign_request;
pub use sign_request::RequestSigner;

mod provide_credential;
pub use provide_credential::*;
