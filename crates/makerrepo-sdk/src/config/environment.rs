// Copyright 2025 The MakerRepo Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{fmt, str::FromStr};

/// The version reported to the server with support requests.
pub const APP_VERSION: &str = "1.0.0";

/// The release channel shown next to [`APP_VERSION`].
pub const APP_RELEASE_TYPE: &str = "Beta";

/// The deployment the client talks to.
///
/// Each environment has a fixed base URL. The `Client` picks
/// [`Environment::current()`] unless told otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Environment {
    /// A server running on the developer's machine.
    Development,
    /// The public MakerRepo deployment.
    Production,
}

impl Environment {
    /// The environment matching the build profile: debug builds talk to a
    /// local server, release builds to production.
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Production
        }
    }

    /// The base URL every route is resolved against.
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Development => "http://localhost:3000",
            Self::Production => "https://makerepo.com",
        }
    }

    /// The lowercase name of the environment.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error returned when parsing an unknown environment name.
#[derive(Debug, thiserror::Error)]
#[error("unknown environment `{0}`, expected `development` or `production`")]
pub struct UnknownEnvironment(String);

impl FromStr for Environment {
    type Err = UnknownEnvironment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(UnknownEnvironment(s.to_owned())),
        }
    }
}
