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
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use pretty_assertions::assert_eq;

async fn get(path_and_query: String) -> Result<StatusCode> {
    let server = start_gateway(None).await;
    let req = Request::builder()
        .method(Method::GET)
        .uri(format!("{}{path_and_query}", server.uri()))
        .header(header::ACCEPT, "application/json")
        .body(())?;

    send_signed_request(&signer(None), req, b"", b"").await
}

#[tokio::test]
async fn test_message_id_with_special_characters() -> Result<()> {
    let id = utf8_percent_encode("!@#$%^&*()_+-=;:'><,?.id", NON_ALPHANUMERIC);

    assert_eq!(StatusCode::OK, get(format!("/emails/{id}")).await?);
    Ok(())
}

#[tokio::test]
async fn test_message_id_with_unicode() -> Result<()> {
    let id = utf8_percent_encode("메시지 ID", NON_ALPHANUMERIC);

    assert_eq!(StatusCode::OK, get(format!("/emails/{id}/trash")).await?);
    Ok(())
}

#[tokio::test]
async fn test_next_cursor_with_reserved_characters() -> Result<()> {
    let cursor = form_urlencoded::byte_serialize(b"eyJpZCI6IjEyMyJ9+/==").collect::<String>();

    assert_eq!(
        StatusCode::OK,
        get(format!("/emails?type=sent&next_cursor={cursor}")).await?
    );
    Ok(())
}
