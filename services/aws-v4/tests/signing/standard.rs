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

use super::{send_signed_request, signer, start_gateway};
use anyhow::Result;
use http::{header, Method, Request, StatusCode};
use pretty_assertions::assert_eq;

fn request(method: Method, url: String, json: bool) -> Result<Request<()>> {
    let mut builder = Request::builder()
        .method(method)
        .uri(url)
        .header(header::ACCEPT, "application/json");
    if json {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    Ok(builder.body(())?)
}

#[tokio::test]
async fn test_get_emails() -> Result<()> {
    let server = start_gateway(None).await;
    let req = request(Method::GET, format!("{}/emails/messageID", server.uri()), false)?;

    let status = send_signed_request(&signer(None), req, b"", b"").await?;
    assert_eq!(StatusCode::OK, status);
    Ok(())
}

#[tokio::test]
async fn test_list_emails_with_query() -> Result<()> {
    let server = start_gateway(None).await;
    let req = request(
        Method::GET,
        format!(
            "{}/emails?type=inbox&year=2024&month=3&order=desc",
            server.uri()
        ),
        false,
    )?;

    let status = send_signed_request(&signer(None), req, b"", b"").await?;
    assert_eq!(StatusCode::OK, status);
    Ok(())
}

#[tokio::test]
async fn test_create_email_with_body() -> Result<()> {
    let server = start_gateway(None).await;
    let body = br#"{"subject":"hello","from":["a@example.com"],"to":["b@example.com"]}"#;
    let req = request(Method::POST, format!("{}/emails", server.uri()), true)?;

    let status = send_signed_request(&signer(None), req, body, body).await?;
    assert_eq!(StatusCode::OK, status);
    Ok(())
}

#[tokio::test]
async fn test_save_email_with_session_token() -> Result<()> {
    let token = "session-token";
    let server = start_gateway(Some(token)).await;
    let body = br#"{"subject":"draft","generateText":"auto"}"#;
    let req = request(Method::PUT, format!("{}/emails/messageID", server.uri()), true)?;

    let status = send_signed_request(&signer(Some(token)), req, body, body).await?;
    assert_eq!(StatusCode::OK, status);
    Ok(())
}

#[tokio::test]
async fn test_delete_email() -> Result<()> {
    let server = start_gateway(None).await;
    let req = request(Method::DELETE, format!("{}/emails/messageID", server.uri()), false)?;

    let status = send_signed_request(&signer(None), req, b"", b"").await?;
    assert_eq!(StatusCode::OK, status);
    Ok(())
}

#[tokio::test]
async fn test_tampered_body_is_rejected() -> Result<()> {
    let server = start_gateway(None).await;
    let req = request(Method::POST, format!("{}/emails", server.uri()), true)?;

    let status =
        send_signed_request(&signer(None), req, br#"{"subject":"a"}"#, br#"{"subject":"b"}"#)
            .await?;
    assert_eq!(StatusCode::NOT_FOUND, status);
    Ok(())
}

#[tokio::test]
async fn test_missing_session_token_is_rejected() -> Result<()> {
    let server = start_gateway(Some("session-token")).await;
    let req = request(Method::GET, format!("{}/emails/messageID", server.uri()), false)?;

    let status = send_signed_request(&signer(None), req, b"", b"").await?;
    assert_eq!(StatusCode::NOT_FOUND, status);
    Ok(())
}
