//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::warn;

// Option store errors.
#[derive(Debug)]
pub enum Error {
    OptionNotFound(String),
    OptionInvalid(String, String),
}

// ===== impl Error =====

impl Error {
    pub fn log(&self) {
        match self {
            Error::OptionNotFound(name) => {
                warn!(%name, "{}", self);
            }
            Error::OptionInvalid(name, value) => {
                warn!(%name, %value, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::OptionNotFound(..) => write!(f, "option not found"),
            Error::OptionInvalid(..) => write!(f, "invalid option value"),
        }
    }
}

impl std::error::Error for Error {}
