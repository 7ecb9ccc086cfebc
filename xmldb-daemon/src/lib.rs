//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

#![warn(rust_2018_idioms)]

pub mod config;
pub mod daemon;
pub mod error;
pub mod request;
pub mod rollback;

pub use crate::daemon::Daemon;
pub use crate::error::{Error, Result};
