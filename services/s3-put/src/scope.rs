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

use crate::constants::{S3_SERVICE, SCOPE_TERMINATOR};
use s3sign_core::time::{format_date, DateTime};
use s3sign_core::{Error, Result};
use std::fmt::{Display, Formatter};

/// SigningScope identifies which derived key signs a request.
///
/// Two requests that share a scope and credentials share a signing key.
/// The scope renders as the credential scope:
/// `20130524/us-east-1/s3/aws4_request`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SigningScope {
    date: String,
    region: String,
}

impl SigningScope {
    /// Create a scope from an 8 digit UTC date (`YYYYMMDD`) and a region.
    ///
    /// Inputs are checked by [`SigningScope::validate`] when signing, not here.
    pub fn new(date: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            region: region.into(),
        }
    }

    /// Create a scope for the UTC date of `time`.
    pub fn from_time(time: DateTime, region: impl Into<String>) -> Self {
        Self::new(format_date(time), region)
    }

    /// Date part of the scope, `YYYYMMDD`.
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Region part of the scope.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Service part of the scope, always `s3`.
    pub fn service(&self) -> &str {
        S3_SERVICE
    }

    /// Request type marker closing the scope, always `aws4_request`.
    pub fn terminator(&self) -> &str {
        SCOPE_TERMINATOR
    }

    /// Check that the scope can produce a meaningful key.
    pub fn validate(&self) -> Result<()> {
        if self.date.is_empty() {
            return Err(Error::invalid_input("scope date must not be empty"));
        }
        if self.date.len() != 8 || !self.date.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_input(format!(
                "scope date {} is not in YYYYMMDD format",
                self.date
            )));
        }
        if self.region.is_empty() {
            return Err(Error::invalid_input("scope region must not be empty"));
        }
        // A slash would make the credential scope ambiguous.
        if self.region.contains('/') || self.region.chars().any(char::is_whitespace) {
            return Err(Error::invalid_input(format!(
                "scope region {} contains invalid characters",
                self.region
            )));
        }
        Ok(())
    }
}

impl Display for SigningScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.date,
            self.region,
            self.service(),
            self.terminator()
        )
    }
}
