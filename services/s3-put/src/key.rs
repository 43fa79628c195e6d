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

use crate::constants::SECRET_PREFIX;
use crate::{Credentials, SigningScope};
use log::trace;
use s3sign_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use s3sign_core::utils::{Redact, RedactBytes};
use s3sign_core::{Error, Result};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::{PoisonError, RwLock};

/// Scoped signing key derived from a secret access key.
///
/// The key is only valid for the date, region and service of the scope it
/// was derived for.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SigningKey([u8; 32]);

impl SigningKey {
    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Sign `content` with this key, returning lowercase hex.
    pub fn sign(&self, content: &[u8]) -> String {
        hex_hmac_sha256(&self.0, content)
    }
}

impl Debug for SigningKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SigningKey")
            .field(&RedactBytes(&self.0))
            .finish()
    }
}

/// Derive the scoped signing key for `scope` from a secret access key.
///
/// ```text
/// kDate    = HMAC("AWS4" + secret, date)
/// kRegion  = HMAC(kDate, region)
/// kService = HMAC(kRegion, service)
/// kSigning = HMAC(kService, "aws4_request")
/// ```
pub fn derive_signing_key(secret: &[u8], scope: &SigningScope) -> Result<SigningKey> {
    if secret.is_empty() {
        return Err(Error::invalid_input("secret access key must not be empty"));
    }
    scope.validate()?;

    let mut secret_key = Vec::with_capacity(SECRET_PREFIX.len() + secret.len());
    secret_key.extend_from_slice(SECRET_PREFIX.as_bytes());
    secret_key.extend_from_slice(secret);

    // Sign date
    let sign_date = hmac_sha256(&secret_key, scope.date().as_bytes());
    // Sign region
    let sign_region = hmac_sha256(&sign_date, scope.region().as_bytes());
    // Sign service
    let sign_service = hmac_sha256(&sign_region, scope.service().as_bytes());
    // Sign request
    let sign_request = hmac_sha256(&sign_service, scope.terminator().as_bytes());

    Ok(SigningKey(sign_request))
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    access_key_id: String,
    // sha256 of the secret, so a rotated secret never hits an old entry.
    secret_digest: String,
    scope: SigningScope,
}

/// Read-through cache of derived signing keys.
///
/// Lookups take a shared lock and may run concurrently. Entries are never
/// updated in place: when credentials are rotated call [`SigningKeyCache::clear`]
/// to drop every entry at once. Inserting a key for a new date drops the
/// entries of older dates, which can no longer produce valid signatures.
#[derive(Default)]
pub struct SigningKeyCache {
    keys: RwLock<HashMap<CacheKey, SigningKey>>,
}

impl SigningKeyCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached key for `cred` and `scope`, deriving it on a miss.
    pub fn get_or_derive(&self, cred: &Credentials, scope: &SigningScope) -> Result<SigningKey> {
        cred.validate()?;
        scope.validate()?;

        let cache_key = CacheKey {
            access_key_id: cred.access_key_id.clone(),
            secret_digest: hex_sha256(cred.secret_access_key.as_bytes()),
            scope: scope.clone(),
        };

        {
            let keys = self.keys.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(key) = keys.get(&cache_key) {
                trace!(
                    "signing key cache hit for {:?} in {scope}",
                    Redact::from(&cred.access_key_id)
                );
                return Ok(*key);
            }
        }

        trace!(
            "signing key cache miss for {:?} in {scope}",
            Redact::from(&cred.access_key_id)
        );
        let key = derive_signing_key(cred.secret_access_key.as_bytes(), scope)?;

        let mut keys = self.keys.write().unwrap_or_else(PoisonError::into_inner);
        keys.retain(|k, _| k.scope.date() >= scope.date());
        Ok(*keys.entry(cache_key).or_insert(key))
    }

    /// Drop every cached key.
    pub fn clear(&self) {
        self.keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if the cache holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Debug for SigningKeyCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeyCache")
            .field("len", &self.len())
            .finish()
    }
}
