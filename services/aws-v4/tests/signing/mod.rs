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

mod special_chars;
mod standard;

use std::time::SystemTime;

use anyhow::Result;
use aws_credential_types::Credentials;
use aws_sigv4::http_request::{SignableBody, SignableRequest, SigningSettings};
use aws_sigv4::sign::v4;
use bytes::Bytes;
use http::{header, Request, StatusCode};
use log::debug;
use mailbox_aws_v4::{RequestSigner, StaticCredentialProvider, EXECUTE_API_SERVICE};
use mailbox_core::{Context, Signer};
use mailbox_http_send_reqwest::ReqwestHttpSend;
use wiremock::{Match, Mock, MockServer, ResponseTemplate};

pub const ACCESS_KEY_ID: &str = "AKIDEXAMPLE";
pub const SECRET_ACCESS_KEY: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";
pub const REGION: &str = "us-west-2";

/// Matches requests whose SigV4 signature verifies for the given secret.
pub struct SigV4Verifier {
    secret_access_key: String,
    session_token: Option<String>,
}

impl SigV4Verifier {
    fn expected_signature(&self, request: &wiremock::Request) -> Option<String> {
        let authorization = request.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let (_, rest) = authorization.split_once("Credential=")?;
        let (credential, rest) = rest.split_once(", SignedHeaders=")?;
        let (signed_headers, signature) = rest.split_once(", Signature=")?;
        let access_key_id = credential.split('/').next()?;

        let date = request.headers.get("x-amz-date")?.to_str().ok()?;
        let time = chrono::NaiveDateTime::parse_from_str(date, "%Y%m%dT%H%M%SZ")
            .ok()?
            .and_utc();

        let headers = signed_headers
            .split(';')
            .map(|name| {
                let value = request.headers.get(name)?.to_str().ok()?;
                Some((name, value))
            })
            .collect::<Option<Vec<_>>>()?;

        let identity = Credentials::new(
            access_key_id,
            self.secret_access_key.clone(),
            self.session_token.clone(),
            None,
            "stub-gateway",
        )
        .into();
        let params = v4::SigningParams::builder()
            .identity(&identity)
            .region(REGION)
            .name(EXECUTE_API_SERVICE)
            .time(SystemTime::from(time))
            .settings(SigningSettings::default())
            .build()
            .ok()?;

        let url = request.url.to_string();
        let signable = SignableRequest::new(
            request.method.as_str(),
            url.as_str(),
            headers.into_iter(),
            SignableBody::Bytes(&request.body),
        )
        .ok()?;
        let output = aws_sigv4::http_request::sign(signable, &params.into()).ok()?;

        debug!(
            "stub gateway got signature {signature}, expected {}",
            output.signature()
        );
        Some(output.signature().to_string())
    }
}

impl Match for SigV4Verifier {
    fn matches(&self, request: &wiremock::Request) -> bool {
        let Some(expected) = self.expected_signature(request) else {
            return false;
        };

        request
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.ends_with(&format!("Signature={expected}")))
    }
}

/// Start a stub gateway that only accepts correctly signed requests.
pub async fn start_gateway(session_token: Option<&str>) -> MockServer {
    let _ = env_logger::builder().is_test(true).try_init();

    let server = MockServer::start().await;
    Mock::given(SigV4Verifier {
        secret_access_key: SECRET_ACCESS_KEY.to_string(),
        session_token: session_token.map(|v| v.to_string()),
    })
    .respond_with(ResponseTemplate::new(200).set_body_string("signature accepted"))
    .mount(&server)
    .await;

    server
}

pub fn signer(session_token: Option<&str>) -> Signer<mailbox_aws_v4::Credential> {
    let mut provider = StaticCredentialProvider::new(ACCESS_KEY_ID, SECRET_ACCESS_KEY);
    if let Some(token) = session_token {
        provider = provider.with_session_token(token);
    }

    Signer::new(
        Context::new().with_http_send(ReqwestHttpSend::default()),
        provider,
        RequestSigner::new(EXECUTE_API_SERVICE, REGION),
    )
}

/// Sign `req` with `signed_body` and send it carrying `sent_body`.
pub async fn send_signed_request(
    signer: &Signer<mailbox_aws_v4::Credential>,
    req: Request<()>,
    signed_body: &[u8],
    sent_body: &[u8],
) -> Result<StatusCode> {
    let (mut parts, _) = req.into_parts();
    signer.sign(&mut parts, signed_body).await?;
    debug!("signed request: {parts:?}");

    let req = Request::from_parts(parts, Bytes::copy_from_slice(sent_body));
    let resp = signer.context().http_send(req).await?;
    Ok(resp.status())
}
