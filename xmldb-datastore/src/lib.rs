//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

#![warn(rust_2018_idioms)]

mod debug;
mod file;

pub mod cache;
pub mod commit;
pub mod edit;
pub mod element;
pub mod error;
pub mod startup;
pub mod xmldb;
pub mod xpath;

pub use crate::cache::CONFIG_ROOT;
pub use crate::edit::EditOp;
pub use crate::element::{
    CANDIDATE, DbElement, NO_SESSION, RUNNING, STARTUP, TMP,
};
pub use crate::error::{Error, IoError};
pub use crate::file::MULTI_ROOT_FILE;
pub use crate::xmldb::Xmldb;
