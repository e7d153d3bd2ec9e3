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

//! Operation options and their validators.
//!
//! Every `check` is pure and runs before anything touches the network.

use std::path::PathBuf;

use log::debug;
use mailbox_core::{Context, Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Emails received by the mailbox.
pub const EMAIL_TYPE_INBOX: &str = "inbox";
/// Emails sent from the mailbox.
pub const EMAIL_TYPE_SENT: &str = "sent";
/// Emails saved but not sent yet.
pub const EMAIL_TYPE_DRAFT: &str = "draft";

/// Oldest first.
pub const ORDER_ASC: &str = "asc";
/// Newest first.
pub const ORDER_DESC: &str = "desc";

/// Always generate the text part from html.
pub const GENERATE_TEXT_ON: &str = "on";
/// Never generate the text part.
pub const GENERATE_TEXT_OFF: &str = "off";
/// Generate the text part only when it's missing.
pub const GENERATE_TEXT_AUTO: &str = "auto";

fn check_message_id(message_id: &str) -> Result<()> {
    if message_id.is_empty() {
        return Err(Error::validation("invalid message id"));
    }
    Ok(())
}

fn check_generate_text(generate_text: &str) -> Result<()> {
    match generate_text {
        "" | GENERATE_TEXT_ON | GENERATE_TEXT_OFF | GENERATE_TEXT_AUTO => Ok(()),
        _ => Err(Error::validation("invalid generate text")),
    }
}

/// Options for listing emails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// One of `inbox`, `sent` or `draft`.
    pub email_type: String,
    /// Year filter, passed through unchecked.
    pub year: String,
    /// Month filter, passed through unchecked.
    pub month: String,
    /// `asc`, `desc` or empty for the server default.
    pub order: String,
    /// Cursor returned by the previous page.
    pub next_cursor: String,
}

impl ListOptions {
    /// Validate the options.
    pub fn check(&self) -> Result<()> {
        match self.email_type.as_str() {
            EMAIL_TYPE_INBOX | EMAIL_TYPE_SENT | EMAIL_TYPE_DRAFT => {}
            _ => return Err(Error::validation("invalid type")),
        }
        match self.order.as_str() {
            "" | ORDER_ASC | ORDER_DESC => Ok(()),
            _ => Err(Error::validation("invalid order")),
        }
    }

    /// Query pairs in wire order. Empty values are omitted later.
    pub(crate) fn query(&self) -> [(&'static str, &str); 5] {
        [
            ("type", self.email_type.as_str()),
            ("year", self.year.as_str()),
            ("month", self.month.as_str()),
            ("order", self.order.as_str()),
            ("next_cursor", self.next_cursor.as_str()),
        ]
    }
}

macro_rules! message_id_options {
    ($($(#[$doc:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Default, PartialEq, Eq)]
            pub struct $name {
                /// Id of the target email.
                pub message_id: String,
            }

            impl $name {
                /// Create options for the given email.
                pub fn new(message_id: impl Into<String>) -> Self {
                    Self {
                        message_id: message_id.into(),
                    }
                }

                /// Validate the options.
                pub fn check(&self) -> Result<()> {
                    check_message_id(&self.message_id)
                }
            }
        )+
    };
}

message_id_options!(
    /// Options for fetching a single email.
    GetOptions,
    /// Options for moving an email to trash.
    TrashOptions,
    /// Options for restoring an email from trash.
    UntrashOptions,
    /// Options for deleting an email permanently.
    DeleteOptions,
    /// Options for sending a draft.
    SendOptions,
);

/// Options for creating an email.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOptions {
    pub subject: String,
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub reply_to: Vec<String>,
    pub text: String,
    pub html: String,
    /// `on`, `off` or `auto`; empty means `auto`.
    pub generate_text: String,
    /// Send right away instead of keeping a draft.
    pub send: bool,

    /// JSON file whose top level keys override the fields above.
    #[serde(skip)]
    pub file: Option<PathBuf>,
}

impl CreateOptions {
    /// Validate the options.
    pub fn check(&self) -> Result<()> {
        check_generate_text(&self.generate_text)
    }

    /// Merge the payload file and apply defaults.
    pub async fn resolve(self, ctx: &Context) -> Result<Self> {
        let mut options = match &self.file {
            Some(path) => {
                let mut merged = merge_file(ctx, &self, path).await?;
                merged.file = None;
                merged
            }
            None => self,
        };
        if options.generate_text.is_empty() {
            options.generate_text = GENERATE_TEXT_AUTO.to_string();
        }
        Ok(options)
    }
}

/// Options for saving a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOptions {
    /// Id of the draft, carried in the path.
    #[serde(skip)]
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
    /// `on`, `off` or `auto`; empty means `auto`.
    pub generate_text: String,
    /// Send right away instead of keeping a draft.
    pub send: bool,

    /// JSON file whose top level keys override the fields above.
    #[serde(skip)]
    pub file: Option<PathBuf>,
}

impl SaveOptions {
    /// Validate the options.
    pub fn check(&self) -> Result<()> {
        check_message_id(&self.message_id)?;
        if self.subject.is_empty() {
            return Err(Error::validation("invalid subject"));
        }
        if self.from.is_empty() {
            return Err(Error::validation("invalid from"));
        }
        if self.to.is_empty() {
            return Err(Error::validation("invalid to"));
        }
        check_generate_text(&self.generate_text)
    }

    /// Merge the payload file and apply defaults.
    pub async fn resolve(self, ctx: &Context) -> Result<Self> {
        let mut options = match &self.file {
            Some(path) => {
                let mut merged = merge_file(ctx, &self, path).await?;
                merged.message_id = self.message_id;
                merged.file = None;
                merged
            }
            None => self,
        };
        if options.generate_text.is_empty() {
            options.generate_text = GENERATE_TEXT_AUTO.to_string();
        }
        Ok(options)
    }
}

/// Overlay every top level key of the JSON object in `path` onto `options`.
async fn merge_file<T>(ctx: &Context, options: &T, path: &std::path::Path) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let path = path.to_string_lossy();
    let file_error = |message: &str| {
        Error::file_load(message.to_string()).with_context(format!("path: {path}"))
    };

    let content = ctx
        .file_read(&path)
        .await
        .map_err(|e| file_error("failed to read payload file").with_source(e))?;
    let overrides: Map<String, Value> = serde_json::from_slice(&content)
        .map_err(|e| file_error("payload file is not a json object").with_source(e))?;
    debug!(
        "payload file {path} overrides keys: {:?}",
        overrides.keys().collect::<Vec<_>>()
    );

    let mut base = match serde_json::to_value(options) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(Error::unexpected("options must serialize to a json object")),
        Err(e) => {
            return Err(Error::unexpected("failed to serialize options").with_source(e));
        }
    };
    base.extend(overrides);

    serde_json::from_value(Value::Object(base))
        .map_err(|e| file_error("payload file has invalid fields").with_source(e))
}
