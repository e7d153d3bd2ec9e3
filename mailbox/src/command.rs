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

//! One function per operation for command line front ends.
//!
//! Every function builds a fresh [`Client`] over [`default_context`] and the
//! default credential chain, so each invocation picks up rotated credentials.
//! Identity fields left empty are filled from `MAILBOX_*` env.

use std::path::PathBuf;

use mailbox_aws_v4::DefaultCredentialProvider;
use mailbox_core::Result;

use crate::{default_context, email, Client, ClientConfig};

fn client(api_id: &str, region: &str, endpoint: &str, verbose: bool) -> Client {
    let ctx = default_context();
    let config = ClientConfig::new(api_id, region)
        .with_endpoint(endpoint)
        .with_verbose(verbose)
        .from_env(&ctx);

    Client::new(ctx, config, DefaultCredentialProvider::new())
}

/// Flat options for [`list`].
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub api_id: String,
    pub region: String,
    pub endpoint: String,
    pub verbose: bool,

    pub email_type: String,
    pub year: String,
    pub month: String,
    /// asc or desc (default)
    pub order: String,
    pub next_cursor: String,
}

/// List emails.
pub async fn list(options: ListOptions) -> Result<String> {
    client(
        &options.api_id,
        &options.region,
        &options.endpoint,
        options.verbose,
    )
    .list(email::ListOptions {
        email_type: options.email_type,
        year: options.year,
        month: options.month,
        order: options.order,
        next_cursor: options.next_cursor,
    })
    .await
}

/// Flat options for the operations that only need a message id.
#[derive(Debug, Clone, Default)]
pub struct MessageOptions {
    pub api_id: String,
    pub region: String,
    pub endpoint: String,
    pub verbose: bool,

    pub message_id: String,
}

impl MessageOptions {
    fn client(&self) -> Client {
        client(&self.api_id, &self.region, &self.endpoint, self.verbose)
    }
}

/// Flat options for [`get`].
pub type GetOptions = MessageOptions;
/// Flat options for [`send`].
pub type SendOptions = MessageOptions;
/// Flat options for [`trash`].
pub type TrashOptions = MessageOptions;
/// Flat options for [`untrash`].
pub type UntrashOptions = MessageOptions;
/// Flat options for [`delete`].
pub type DeleteOptions = MessageOptions;

/// Get a single email.
pub async fn get(options: GetOptions) -> Result<String> {
    options
        .client()
        .get(email::GetOptions::new(options.message_id))
        .await
}

/// Send a draft.
pub async fn send(options: SendOptions) -> Result<String> {
    options
        .client()
        .send(email::SendOptions::new(options.message_id))
        .await
}

/// Move an email to trash.
pub async fn trash(options: TrashOptions) -> Result<String> {
    options
        .client()
        .trash(email::TrashOptions::new(options.message_id))
        .await
}

/// Restore an email from trash.
pub async fn untrash(options: UntrashOptions) -> Result<String> {
    options
        .client()
        .untrash(email::UntrashOptions::new(options.message_id))
        .await
}

/// Delete an email permanently.
pub async fn delete(options: DeleteOptions) -> Result<String> {
    options
        .client()
        .delete(email::DeleteOptions::new(options.message_id))
        .await
}

/// Flat options for [`create`].
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub api_id: String,
    pub region: String,
    pub endpoint: String,
    pub verbose: bool,

    pub subject: String,
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub reply_to: Vec<String>,
    pub text: String,
    pub html: String,
    pub generate_text: String,
    pub send: bool,

    pub file: Option<PathBuf>,
}

/// Create an email.
pub async fn create(options: CreateOptions) -> Result<String> {
    client(
        &options.api_id,
        &options.region,
        &options.endpoint,
        options.verbose,
    )
    .create(email::CreateOptions {
        subject: options.subject,
        from: options.from,
        to: options.to,
        cc: options.cc,
        bcc: options.bcc,
        reply_to: options.reply_to,
        text: options.text,
        html: options.html,
        generate_text: options.generate_text,
        send: options.send,
        file: options.file,
    })
    .await
}

/// Flat options for [`save`].
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    pub api_id: String,
    pub region: String,
    pub endpoint: String,
    pub verbose: bool,

    pub message_id: String,
    pub subject: String,
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub reply_to: Vec<String>,
    pub body: String,
    pub text: String,
    pub html: String,
    pub generate_text: String,
    pub send: bool,

    pub file: Option<PathBuf>,
}

/// Save a draft.
pub async fn save(options: SaveOptions) -> Result<String> {
    client(
        &options.api_id,
        &options.region,
        &options.endpoint,
        options.verbose,
    )
    .save(email::SaveOptions {
        message_id: options.message_id,
        subject: options.subject,
        from: options.from,
        to: options.to,
        cc: options.cc,
        bcc: options.bcc,
        reply_to: options.reply_to,
        body: options.body,
        text: options.text,
        html: options.html,
        generate_text: options.generate_text,
        send: options.send,
        file: options.file,
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailbox_core::ErrorKind;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn vars(endpoint: &str) -> [(&'static str, Option<String>); 6] {
        [
            ("AWS_ACCESS_KEY_ID", Some("AKIDEXAMPLE".to_string())),
            ("AWS_SECRET_ACCESS_KEY", Some("secret".to_string())),
            ("AWS_SESSION_TOKEN", None),
            ("AWS_EC2_METADATA_DISABLED", Some("true".to_string())),
            ("MAILBOX_ENDPOINT", Some(endpoint.to_string())),
            ("MAILBOX_REGION", Some("us-west-2".to_string())),
        ]
    }

    #[tokio::test]
    async fn test_list_with_env_identity() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/emails"))
            .and(header_exists("authorization"))
            .and(header_exists("x-amz-date"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"{"count":0,"items":[]}"#, "application/json"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = temp_env::async_with_vars(
            vars(&server.uri()),
            list(ListOptions {
                email_type: "inbox".to_string(),
                ..Default::default()
            }),
        )
        .await;

        assert_eq!(
            result.expect("list must succeed"),
            "{\n  \"count\": 0,\n  \"items\": []\n}"
        );
    }

    #[tokio::test]
    async fn test_save_sends_payload() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/emails/draft-1"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "subject": "hello",
                "from": ["a@example.com"],
                "to": ["b@example.com"],
                "cc": [],
                "bcc": [],
                "replyTo": [],
                "body": "",
                "text": "hi",
                "html": "",
                "generateText": "auto",
                "send": false,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("saved"))
            .expect(1)
            .mount(&server)
            .await;

        let result = temp_env::async_with_vars(
            vars(&server.uri()),
            save(SaveOptions {
                message_id: "draft-1".to_string(),
                subject: "hello".to_string(),
                from: vec!["a@example.com".to_string()],
                to: vec!["b@example.com".to_string()],
                text: "hi".to_string(),
                ..Default::default()
            }),
        )
        .await;

        assert_eq!(result.expect("save must succeed"), "saved");
    }

    #[tokio::test]
    async fn test_validation_before_network() {
        let server = MockServer::start().await;

        let err = temp_env::async_with_vars(
            vars(&server.uri()),
            trash(TrashOptions::default()),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "invalid message id");
        assert!(server
            .received_requests()
            .await
            .unwrap_or_default()
            .is_empty());
    }
}
