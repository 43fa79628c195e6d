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

use crate::constants::{
    AWS_QUERY_ENCODE_SET, AWS_URI_ENCODE_SET, X_AMZ_CONTENT_SHA_256, X_AMZ_DATE,
};
use http::header::{HeaderName, HOST};
use http::{HeaderMap, HeaderValue, Method};
use percent_encoding::{percent_decode_str, utf8_percent_encode};
use s3sign_core::time::{format_iso8601, DateTime};
use s3sign_core::{Error, Result};

/// Description of one PUT object request to be signed.
///
/// The descriptor carries everything the canonical request is built from.
/// Header names are lower-cased on insertion.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    host: String,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    payload_hash: String,
}

impl RequestDescriptor {
    /// Create a descriptor for `host` and `path` without any headers.
    ///
    /// Required headers must be added with [`RequestDescriptor::with_header`];
    /// [`RequestDescriptor::put_object`] fills them in for the common case.
    pub fn new(
        host: impl Into<String>,
        path: impl Into<String>,
        payload_hash: impl Into<String>,
    ) -> Self {
        let mut path = path.into();
        if !path.starts_with('/') {
            path.insert(0, '/');
        }

        Self {
            host: host.into(),
            path,
            query: Vec::new(),
            headers: HeaderMap::new(),
            payload_hash: payload_hash.into(),
        }
    }

    /// Build the descriptor of a virtual hosted style PUT object request.
    ///
    /// - host: `<bucket>.s3.<region>.amazonaws.com`
    /// - path: `/<key>`, with `key` taken literally and percent encoded
    /// - headers: `host`, `x-amz-content-sha256` and `x-amz-date`
    pub fn put_object(
        bucket: &str,
        region: &str,
        key: &str,
        payload_hash: &str,
        time: DateTime,
    ) -> Result<Self> {
        if bucket.is_empty() {
            return Err(Error::invalid_input("bucket must not be empty"));
        }
        if region.is_empty() {
            return Err(Error::invalid_input("region must not be empty"));
        }
        if key.is_empty() {
            return Err(Error::invalid_input("object key must not be empty"));
        }

        let host = format!("{bucket}.s3.{region}.amazonaws.com");
        // The key is taken literally, so a `%` in it must survive the decode
        // pass of the canonical uri.
        let path = format!("/{}", utf8_percent_encode(key, &AWS_URI_ENCODE_SET));

        Self::new(host.clone(), path, payload_hash)
            .with_header(HOST.as_str(), &host)?
            .with_header(X_AMZ_CONTENT_SHA_256, payload_hash)?
            .with_header(X_AMZ_DATE, &format_iso8601(time))
    }

    /// Append a header. Repeated names keep every value in insertion order.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            Error::encoding(format!("header name {name} is invalid")).with_source(e)
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            Error::encoding(format!("value of header {name} is invalid")).with_source(e)
        })?;
        value.to_str().map_err(|e| {
            Error::encoding(format!("value of header {name} is not visible ascii")).with_source(e)
        })?;
        self.headers.append(name, value);
        Ok(self)
    }

    /// Remove every value of a header.
    pub fn without_header(mut self, name: &str) -> Self {
        self.headers.remove(name);
        self
    }

    /// Append a query pair, given unencoded.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append every pair of a raw `a=b&c` query string.
    pub fn with_query_str(mut self, query: &str) -> Self {
        self.query.extend(
            form_urlencoded::parse(query.as_bytes()).map(|(k, v)| (k.into_owned(), v.into_owned())),
        );
        self
    }

    /// HTTP method, always `PUT`.
    pub fn method(&self) -> Method {
        Method::PUT
    }

    /// Host the request is sent to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Request path as given, always starting with `/`. It may be raw or
    /// percent encoded; it is decoded once before canonical encoding.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Unencoded query pairs in insertion order.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Headers to sign.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Hex encoded SHA256 of the request body.
    ///
    /// Signed exactly as given. Pass the lowercase digest S3 computes, for
    /// example from [`s3sign_core::hash::hex_sha256`]; an uppercase digest is
    /// not rewritten.
    pub fn payload_hash(&self) -> &str {
        &self.payload_hash
    }

    /// URL the transport should send the request to.
    ///
    /// Path and query use the same encoding as the canonical request, so the
    /// server rebuilds the exact bytes that were signed.
    pub fn endpoint(&self) -> Result<String> {
        let mut url = format!("https://{}{}", self.host, canonical_uri(&self.path)?);
        let query = canonical_query(&self.query);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        Ok(url)
    }
}

/// Percent encode the request path per the S3 `UriEncode` rules.
///
/// The path is decoded once first so callers may pass it either raw or
/// already encoded without getting it double encoded.
pub(crate) fn canonical_uri(path: &str) -> Result<String> {
    if path.is_empty() {
        return Ok("/".to_string());
    }

    let path = percent_decode_str(path)
        .decode_utf8()
        .map_err(|e| Error::encoding(format!("path {path} is not valid utf-8")).with_source(e))?;

    Ok(utf8_percent_encode(&path, &AWS_URI_ENCODE_SET).to_string())
}

/// Encode query pairs and join them sorted by name, then value.
pub(crate) fn canonical_query(query: &[(String, String)]) -> String {
    let mut pairs = query
        .iter()
        .map(|(k, v)| {
            (
                utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET).to_string(),
                utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET).to_string(),
            )
        })
        .collect::<Vec<_>>();
    pairs.sort();

    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Trim a header value and collapse inner whitespace runs to one space.
pub(crate) fn normalize_header_value(value: &str) -> String {
    let mut s = String::with_capacity(value.len());
    for (idx, part) in value.split_ascii_whitespace().enumerate() {
        if idx != 0 {
            s.push(' ');
        }
        s.push_str(part);
    }
    s
}
