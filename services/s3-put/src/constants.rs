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

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

/// Algorithm label used in the string to sign and the authorization header.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";
/// Prefix prepended to the secret access key before the first HMAC step.
pub const SECRET_PREFIX: &str = "AWS4";
/// Request type marker closing every credential scope.
pub const SCOPE_TERMINATOR: &str = "aws4_request";
/// Service name for the object storage API.
pub const S3_SERVICE: &str = "s3";
/// Content type attached to uploads when the caller does not pick one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

// Headers used in s3 put requests.
pub const X_AMZ_CONTENT_SHA_256: &str = "x-amz-content-sha256";
pub const X_AMZ_DATE: &str = "x-amz-date";

/// Headers every signed request must carry.
pub const REQUIRED_HEADERS: [&str; 3] = ["host", X_AMZ_CONTENT_SHA_256, X_AMZ_DATE];

// Env values used by config loading.
pub const AWS_REGION: &str = "AWS_REGION";
pub const AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
pub const S3_BUCKET: &str = "S3_BUCKET";
pub const S3_CONTENT_TYPE: &str = "S3_CONTENT_TYPE";

/// AsciiSet for [AWS UriEncode](https://docs.aws.amazon.com/AmazonS3/latest/API/sig-v4-header-based-auth.html)
///
/// - URI encode every byte except the unreserved characters: 'A'-'Z', 'a'-'z', '0'-'9', '-', '.', '_', and '~'.
/// - Keep '/' as the object key path separator.
pub static AWS_URI_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// AsciiSet for [AWS UriEncode](https://docs.aws.amazon.com/AmazonS3/latest/API/sig-v4-header-based-auth.html)
///
/// But used in query, where '/' is encoded too.
pub static AWS_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
