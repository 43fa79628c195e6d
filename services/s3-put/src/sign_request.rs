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
    ALGORITHM, DEFAULT_CONTENT_TYPE, REQUIRED_HEADERS, X_AMZ_CONTENT_SHA_256, X_AMZ_DATE,
};
use crate::descriptor::{canonical_query, canonical_uri, normalize_header_value};
use crate::key::{derive_signing_key, SigningKeyCache};
use crate::trace::{SigningStage, SigningTrace};
use crate::{Credentials, RequestDescriptor, SigningScope};
use http::header::{AUTHORIZATION, CONTENT_TYPE, HOST};
use http::{HeaderMap, HeaderValue};
use log::debug;
use s3sign_core::hash::{hex_sha256, is_hex_sha256};
use s3sign_core::time::{format_date, format_iso8601, DateTime};
use s3sign_core::utils::Redact;
use s3sign_core::{Error, Result};
use std::fmt::Write;
use std::sync::Arc;

/// RequestSigner that implement AWS SigV4 for S3 PUT object requests.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// The signer holds no credentials. It is `Send + Sync` and one instance
/// can sign requests from many threads at once.
#[derive(Debug, Clone, Default)]
pub struct RequestSigner {
    cache: Option<Arc<SigningKeyCache>>,
    trace: Option<Arc<dyn SigningTrace>>,
}

impl RequestSigner {
    /// Create a new signer that derives the signing key on every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look signing keys up in `cache` instead of deriving them every time.
    pub fn with_key_cache(mut self, cache: Arc<SigningKeyCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Report intermediate signing material to `trace`.
    pub fn with_trace(mut self, trace: impl SigningTrace) -> Self {
        self.trace = Some(Arc::new(trace));
        self
    }

    /// Sign `desc` at `time`.
    ///
    /// All inputs are validated before anything is hashed. On success the
    /// result is complete; on failure nothing is returned but the error.
    pub fn sign(
        &self,
        desc: &RequestDescriptor,
        scope: &SigningScope,
        cred: &Credentials,
        time: DateTime,
    ) -> Result<SigningResult> {
        cred.validate()?;
        scope.validate()?;
        if scope.date() != format_date(time) {
            return Err(Error::invalid_input(format!(
                "scope date {} does not match signing time {}",
                scope.date(),
                format_iso8601(time)
            )));
        }
        let amz_date = format_iso8601(time);

        validate_payload_hash(desc)?;
        let headers = canonicalize_headers(desc, &amz_date)?;
        let creq = canonical_request_string(desc, &headers)?;
        self.emit(SigningStage::CanonicalRequest, &creq);

        // Scope: "20220313/<region>/s3/aws4_request"
        let scope_str = scope.to_string();
        debug!("calculated scope: {scope_str}");

        // StringToSign:
        //
        // AWS4-HMAC-SHA256
        // 20220313T072004Z
        // 20220313/<region>/s3/aws4_request
        // <hashed_canonical_request>
        let string_to_sign = {
            let mut f = String::new();
            writeln!(f, "{ALGORITHM}")?;
            writeln!(f, "{amz_date}")?;
            writeln!(f, "{scope_str}")?;
            write!(f, "{}", hex_sha256(creq.as_bytes()))?;
            f
        };
        self.emit(SigningStage::StringToSign, &string_to_sign);

        let signing_key = match &self.cache {
            Some(cache) => cache.get_or_derive(cred, scope)?,
            None => derive_signing_key(cred.secret_access_key.as_bytes(), scope)?,
        };
        let signature = signing_key.sign(string_to_sign.as_bytes());

        let signed_headers = signed_headers_string(&headers);
        let authorization = format!(
            "{ALGORITHM} Credential={}/{}, SignedHeaders={}, Signature={}",
            cred.access_key_id, scope_str, signed_headers, signature
        );
        self.emit(SigningStage::Authorization, &authorization);
        debug!(
            "signed request for {:?} with headers {signed_headers}",
            Redact::from(&cred.access_key_id)
        );

        Ok(SigningResult {
            canonical_request: creq,
            string_to_sign,
            signature,
            authorization,
            amz_date,
            payload_hash: desc.payload_hash().to_string(),
        })
    }

    fn emit(&self, stage: SigningStage, value: &str) {
        if let Some(trace) = &self.trace {
            trace.trace(stage, value);
        }
    }
}

/// Output of [`RequestSigner::sign`].
///
/// Values are produced fresh for every call and are never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningResult {
    canonical_request: String,
    string_to_sign: String,
    signature: String,
    authorization: String,
    amz_date: String,
    payload_hash: String,
}

impl SigningResult {
    /// The canonical request that was hashed.
    pub fn canonical_request(&self) -> &str {
        &self.canonical_request
    }

    /// The string that was HMAC signed.
    pub fn string_to_sign(&self) -> &str {
        &self.string_to_sign
    }

    /// Lowercase hex signature, 64 characters.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Value of the `Authorization` header.
    pub fn authorization(&self) -> &str {
        &self.authorization
    }

    /// Value of the `x-amz-date` header.
    pub fn amz_date(&self) -> &str {
        &self.amz_date
    }

    /// Value of the `x-amz-content-sha256` header.
    pub fn payload_hash(&self) -> &str {
        &self.payload_hash
    }

    /// Headers the transport attaches verbatim to the PUT request.
    ///
    /// `content_type` defaults to `application/octet-stream`. The
    /// authorization value is marked sensitive so it stays out of `Debug`
    /// output of the header map.
    pub fn transport_headers(&self, content_type: Option<&str>) -> Result<HeaderMap> {
        let mut authorization = HeaderValue::from_str(&self.authorization)?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::with_capacity(4);
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(X_AMZ_DATE, HeaderValue::from_str(&self.amz_date)?);
        headers.insert(
            X_AMZ_CONTENT_SHA_256,
            HeaderValue::from_str(&self.payload_hash)?,
        );
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(content_type.unwrap_or(DEFAULT_CONTENT_TYPE))?,
        );
        Ok(headers)
    }
}

fn validate_payload_hash(desc: &RequestDescriptor) -> Result<()> {
    if !is_hex_sha256(desc.payload_hash()) {
        return Err(Error::invalid_payload_hash(format!(
            "payload hash {} is not a 64 character hex sha256 digest",
            desc.payload_hash()
        )));
    }
    Ok(())
}

/// Check required headers and build the sorted `(name, value)` list that is
/// signed.
fn canonicalize_headers(desc: &RequestDescriptor, amz_date: &str) -> Result<Vec<(String, String)>> {
    for name in REQUIRED_HEADERS {
        if !desc.headers().contains_key(name) {
            return Err(Error::missing_required_header(format!(
                "header {name} is required for signing"
            )));
        }
    }

    let mut headers = Vec::with_capacity(desc.headers().keys_len());
    for name in desc.headers().keys() {
        let mut values = Vec::new();
        for value in desc.headers().get_all(name) {
            let value = value.to_str().map_err(|e| {
                Error::encoding(format!("value of header {name} is not visible ascii"))
                    .with_source(e)
            })?;
            values.push(normalize_header_value(value));
        }
        headers.push((name.as_str().to_string(), values.join(",")));
    }
    headers.sort_unstable();

    let get = |name: &str| {
        headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .unwrap_or_default()
    };
    if get(X_AMZ_CONTENT_SHA_256) != desc.payload_hash() {
        return Err(Error::invalid_payload_hash(format!(
            "header {X_AMZ_CONTENT_SHA_256} does not match payload hash {}",
            desc.payload_hash()
        )));
    }
    if get(X_AMZ_DATE) != amz_date {
        return Err(Error::invalid_input(format!(
            "header {X_AMZ_DATE} {} does not match signing time {amz_date}",
            get(X_AMZ_DATE)
        )));
    }
    if get(HOST.as_str()) != desc.host() {
        return Err(Error::invalid_input(format!(
            "header host {} does not match request host {}",
            get(HOST.as_str()),
            desc.host()
        )));
    }

    Ok(headers)
}

fn signed_headers_string(headers: &[(String, String)]) -> String {
    headers
        .iter()
        .map(|(k, _)| k.as_str())
        .collect::<Vec<_>>()
        .join(";")
}

fn canonical_request_string(
    desc: &RequestDescriptor,
    headers: &[(String, String)],
) -> Result<String> {
    // 256 is specially chosen to avoid reallocation for most requests.
    let mut f = String::with_capacity(256);

    // Insert method
    writeln!(f, "{}", desc.method())?;
    // Insert encoded path
    writeln!(f, "{}", canonical_uri(desc.path())?)?;
    // Insert query
    writeln!(f, "{}", canonical_query(desc.query()))?;
    // Insert signed headers
    for (name, value) in headers {
        writeln!(f, "{name}:{value}")?;
    }
    writeln!(f)?;
    writeln!(f, "{}", signed_headers_string(headers))?;
    write!(f, "{}", desc.payload_hash())?;

    Ok(f)
}
