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

use crate::constants::*;
use crate::{RequestDescriptor, SigningScope};
use log::debug;
use s3sign_core::time::DateTime;
use s3sign_core::{Env, Error, Result};

/// Config for s3 put requests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// `region` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_REGION`]
    /// - env value: [`AWS_DEFAULT_REGION`]
    pub region: Option<String>,
    /// `bucket` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`S3_BUCKET`]
    pub bucket: Option<String>,
    /// `content_type` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`S3_CONTENT_TYPE`]
    /// - default to `application/octet-stream` when building transport headers
    pub content_type: Option<String>,
}

impl Config {
    /// Load config from env, keeping every field that is already set.
    pub fn from_env(mut self, env: &dyn Env) -> Self {
        if self.region.is_none() {
            self.region = env
                .var(AWS_REGION)
                .or_else(|| env.var(AWS_DEFAULT_REGION))
                .filter(|v| !v.is_empty());
        }
        if self.bucket.is_none() {
            self.bucket = env.var(S3_BUCKET).filter(|v| !v.is_empty());
        }
        if self.content_type.is_none() {
            self.content_type = env.var(S3_CONTENT_TYPE).filter(|v| !v.is_empty());
        }

        debug!(
            "loaded config: region {:?}, bucket {:?}",
            self.region, self.bucket
        );
        self
    }

    /// Region, which must be configured.
    pub fn region(&self) -> Result<&str> {
        self.region
            .as_deref()
            .ok_or_else(|| Error::invalid_input("region is not configured"))
    }

    /// Bucket, which must be configured.
    pub fn bucket(&self) -> Result<&str> {
        self.bucket
            .as_deref()
            .ok_or_else(|| Error::invalid_input("bucket is not configured"))
    }

    /// Content type to attach to uploads.
    pub fn content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    /// Signing scope for requests sent at `time`.
    pub fn scope(&self, time: DateTime) -> Result<SigningScope> {
        Ok(SigningScope::from_time(time, self.region()?))
    }

    /// Descriptor of a PUT of `key` into the configured bucket.
    pub fn descriptor(
        &self,
        key: &str,
        payload_hash: &str,
        time: DateTime,
    ) -> Result<RequestDescriptor> {
        RequestDescriptor::put_object(self.bucket()?, self.region()?, key, payload_hash, time)
    }
}
