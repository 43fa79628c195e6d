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

use std::fmt::{Debug, Display, Formatter};

/// Intermediate value produced while signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningStage {
    /// The canonical request text.
    CanonicalRequest,
    /// The string to sign.
    StringToSign,
    /// The assembled authorization header value.
    Authorization,
}

impl Display for SigningStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SigningStage::CanonicalRequest => write!(f, "canonical request"),
            SigningStage::StringToSign => write!(f, "string to sign"),
            SigningStage::Authorization => write!(f, "authorization"),
        }
    }
}

/// Observer of the intermediate signing material.
///
/// Attach one with [`crate::RequestSigner::with_trace`] to inspect why the
/// server computed a different signature. Neither the secret access key nor
/// the derived signing key is ever passed to a trace.
pub trait SigningTrace: Debug + Send + Sync + 'static {
    /// Called once per stage, in signing order, after the value is complete.
    fn trace(&self, stage: SigningStage, value: &str);
}

/// SigningTrace that writes every stage as a `debug` log record.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTrace;

impl SigningTrace for LogTrace {
    fn trace(&self, stage: SigningStage, value: &str) {
        log::debug!("calculated {stage}: {value}");
    }
}
