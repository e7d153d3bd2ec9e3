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

//! Tokio-based file reading implementation for mailbox.
//!
//! This crate provides `TokioFileRead`, an async file reader that implements
//! the `FileRead` trait from `mailbox_core` using Tokio's file system operations.
//! It backs shared profile lookups and payload override files.
//!
//! ## Example
//!
//! ```no_run
//! use mailbox_core::{Context, OsEnv};
//! use mailbox_file_read_tokio::TokioFileRead;
//!
//! #[tokio::main]
//! async fn main() {
//!     let ctx = Context::new()
//!         .with_file_read(TokioFileRead)
//!         .with_env(OsEnv);
//!
//!     match ctx.file_read("/path/to/payload.json").await {
//!         Ok(content) => println!("Read {} bytes", content.len()),
//!         Err(e) => eprintln!("Failed to read file: {}", e),
//!     }
//! }
//! ```

use async_trait::async_trait;
use mailbox_core::{Error, FileRead, Result};

/// Tokio-based implementation of the `FileRead` trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileRead;

#[async_trait]
impl FileRead for TokioFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        tokio::fs::read(path).await.map_err(|e| {
            Error::unexpected(format!("failed to read file: {e}"))
                .with_context(format!("path: {path}"))
                .with_source(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailbox_core::Context;
    use std::io::Write;

    #[tokio::test]
    async fn test_file_read() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new().expect("temp file must be created");
        write!(file, r#"{{"subject":"hello"}}"#).expect("write must succeed");

        let ctx = Context::new().with_file_read(TokioFileRead);
        let content = ctx
            .file_read_as_string(file.path().to_str().expect("path must be utf-8"))
            .await?;
        assert_eq!(content, r#"{"subject":"hello"}"#);
        Ok(())
    }

    #[tokio::test]
    async fn test_file_read_missing() {
        let ctx = Context::new().with_file_read(TokioFileRead);
        let err = ctx
            .file_read("/non/existent/payload.json")
            .await
            .unwrap_err();
        assert_eq!(err.context(), &["path: /non/existent/payload.json"]);
    }
}
