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

// Env values used to configure the client.
pub const CONJUR_APPLIANCE_URL: &str = "CONJUR_APPLIANCE_URL";
pub const CONJUR_ACCOUNT: &str = "CONJUR_ACCOUNT";
pub const CONJUR_AUTHN_URL: &str = "CONJUR_AUTHN_URL";
pub const CONJUR_AUTHN_TOKEN: &str = "CONJUR_AUTHN_TOKEN";
pub const CONJUR_AUTHN_TOKEN_FILE: &str = "CONJUR_AUTHN_TOKEN_FILE";
pub const CONJUR_AUTHN_LOGIN: &str = "CONJUR_AUTHN_LOGIN";
pub const CONJUR_AUTHN_API_KEY: &str = "CONJUR_AUTHN_API_KEY";
pub const CONJUR_IGNORE_UNTRUSTED_SSL: &str = "CONJUR_IGNORE_UNTRUSTED_SSL";

/// AsciiSet for encoding ids and logins that land in a URL path segment.
///
/// Conjur ids contain `/` and logins like `host/my-app` contain `/` and `:`,
/// all of which must be encoded so the appliance sees a single segment.
pub static PATH_SEGMENT_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
