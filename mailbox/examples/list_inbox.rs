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

//! List the newest emails in the inbox.
//!
//! ```shell
//! MAILBOX_API_ID=abc123 MAILBOX_REGION=us-west-2 cargo run --example list_inbox
//! ```

use mailbox::command::{self, ListOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let emails = command::list(ListOptions {
        verbose: true,
        email_type: "inbox".to_string(),
        order: "desc".to_string(),
        ..Default::default()
    })
    .await?;
    println!("{emails}");

    Ok(())
}
