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

//! Core components shared by the s3sign crates.
//!
//! This crate carries the pieces that are not specific to one signing
//! protocol:
//!
//! - [`Error`] and [`ErrorKind`]: the error type every signing step returns
//! - [`hash`]: SHA-256 and HMAC-SHA256 helpers
//! - [`time`]: UTC timestamps and their SigV4 text forms
//! - [`utils`]: redaction of credential material in logs
//! - [`Env`]: environment access used by config loading
//!
//! ## Example
//!
//! ```
//! use s3sign_core::hash::hex_sha256;
//! use s3sign_core::time::{format_date, format_iso8601, parse_iso8601};
//!
//! let t = parse_iso8601("20130524T000000Z").unwrap();
//! assert_eq!(format_date(t), "20130524");
//! assert_eq!(format_iso8601(t), "20130524T000000Z");
//! assert_eq!(hex_sha256(b"").len(), 64);
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod env;
pub use env::Env;
pub use env::OsEnv;
pub use env::StaticEnv;
mod error;
pub use error::{Error, ErrorKind, Result};
