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

use s3sign_core::utils::Redact;
use s3sign_core::{Error, Result};
use std::fmt::{Debug, Formatter};

/// Credentials that hold the access key id and the secret access key.
///
/// Credentials are handed to the signer per call and never stored by it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Access key id, written into the authorization header.
    pub access_key_id: String,
    /// Secret access key, only ever used as HMAC key material.
    pub secret_access_key: String,
}

impl Credentials {
    /// Create new credentials.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    /// Reject credentials with an empty access key id or secret.
    pub fn validate(&self) -> Result<()> {
        if self.access_key_id.is_empty() {
            return Err(Error::invalid_input("access key id must not be empty"));
        }
        if self.secret_access_key.is_empty() {
            return Err(Error::invalid_input("secret access key must not be empty"));
        }
        Ok(())
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .finish()
    }
}
