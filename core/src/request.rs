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

use crate::{Error, Result};
use http::header::HeaderName;
use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::HeaderValue;
use http::Method;
use http::Uri;
use std::mem;
use std::str::FromStr;

/// Signing context for request.
///
/// Built from `http::request::Parts`, mutated by a signer, then applied back.
/// The query keeps whatever encoding the signer leaves in it, so the request
/// that goes out carries exactly the query that was signed.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path, still percent encoded as it appeared in the uri.
    pub path: String,
    /// HTTP query parameters, percent decoded.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let uri = mem::take(&mut parts.uri).into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme.unwrap_or(Scheme::HTTP),
            authority: uri.authority.ok_or_else(|| {
                Error::request_invalid("request without authority is invalid for signing")
            })?,
            path: paq.path().to_string(),
            query: paq
                .query()
                .map(|v| {
                    form_urlencoded::parse(v.as_bytes())
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect()
                })
                .unwrap_or_default(),

            // Take the headers out of the request to avoid copy.
            // We will return it back when apply the context.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Apply the signing context back to http::request::Parts.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        let query_size = self.query_size();

        // Return headers back.
        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method;
        parts.uri = {
            let mut uri_parts = mem::take(&mut parts.uri).into_parts();
            uri_parts.scheme = Some(self.scheme);
            uri_parts.authority = Some(self.authority);
            uri_parts.path_and_query = {
                let paq = if query_size == 0 {
                    self.path
                } else {
                    let mut s = self.path;
                    s.reserve(query_size + 1);

                    s.push('?');
                    for (i, (k, v)) in self.query.iter().enumerate() {
                        if i > 0 {
                            s.push('&');
                        }

                        s.push_str(k);
                        s.push('=');
                        s.push_str(v);
                    }

                    s
                };

                Some(PathAndQuery::from_str(&paq)?)
            };
            Uri::from_parts(uri_parts)?
        };

        Ok(())
    }

    /// Get query size.
    #[inline]
    pub fn query_size(&self) -> usize {
        self.query
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
    }

    /// Get header value by name.
    ///
    /// Returns empty string if header not found.
    #[inline]
    pub fn header_get_or_default(&self, key: &HeaderName) -> Result<&str> {
        match self.headers.get(key) {
            Some(v) => Ok(v.to_str()?),
            None => Ok(""),
        }
    }

    /// Normalize header value.
    ///
    /// Leading and trailing spaces are trimmed and every inner run of spaces
    /// becomes a single space.
    pub fn header_value_normalize(v: &mut HeaderValue) {
        let bs = v.as_bytes();
        if !bs.starts_with(b" ") && !bs.ends_with(b" ") && !bs.windows(2).any(|w| w == b"  ") {
            return;
        }

        let mut normalized = Vec::with_capacity(bs.len());
        for part in bs.split(|b| *b == b' ').filter(|p| !p.is_empty()) {
            if !normalized.is_empty() {
                normalized.push(b' ');
            }
            normalized.extend_from_slice(part);
        }

        // This can't fail because we started with a valid HeaderValue and then only removed spaces
        let sensitive = v.is_sensitive();
        *v = HeaderValue::from_bytes(&normalized).expect("invalid header value");
        v.set_sensitive(sensitive);
    }

    /// Get header names as sorted vector.
    pub fn header_name_to_vec_sorted(&self) -> Vec<&str> {
        let mut h = self
            .headers
            .keys()
            .map(|k| k.as_str())
            .collect::<Vec<&str>>();
        h.sort_unstable();

        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parts(uri: &str) -> http::request::Parts {
        http::Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header("Accept", "application/json")
            .body(())
            .expect("request must be valid")
            .into_parts()
            .0
    }

    #[test]
    fn test_build_and_apply() -> Result<()> {
        let mut parts = parts("https://example.com/emails?type=inbox&order=desc");
        let req = SigningRequest::build(&mut parts)?;

        assert_eq!(req.authority.as_str(), "example.com");
        assert_eq!(req.path, "/emails");
        assert_eq!(
            req.query,
            vec![
                ("type".to_string(), "inbox".to_string()),
                ("order".to_string(), "desc".to_string())
            ]
        );
        assert!(parts.headers.is_empty());

        req.apply(&mut parts)?;
        assert_eq!(
            parts.uri.to_string(),
            "https://example.com/emails?type=inbox&order=desc"
        );
        assert_eq!(parts.headers["accept"], "application/json");
        Ok(())
    }

    #[test]
    fn test_build_without_authority() {
        let mut parts = parts("/emails");
        let err = SigningRequest::build(&mut parts).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_header_value_normalize() {
        let mut v = HeaderValue::from_static("  application/json ");
        SigningRequest::header_value_normalize(&mut v);
        assert_eq!(v, "application/json");

        let mut v = HeaderValue::from_static(" a   b  c ");
        v.set_sensitive(true);
        SigningRequest::header_value_normalize(&mut v);
        assert_eq!(v, "a b c");
        assert!(v.is_sensitive());

        let mut v = HeaderValue::from_static("a\tb");
        SigningRequest::header_value_normalize(&mut v);
        assert_eq!(v, "a\tb");
    }

    #[test]
    fn test_header_name_to_vec_sorted() -> Result<()> {
        let mut parts = parts("https://example.com/emails");
        parts.headers.insert("x-amz-date", HeaderValue::from_static("x"));
        parts.headers.insert("host", HeaderValue::from_static("example.com"));
        let req = SigningRequest::build(&mut parts)?;

        assert_eq!(
            req.header_name_to_vec_sorted(),
            vec!["accept", "host", "x-amz-date"]
        );
        Ok(())
    }
}
