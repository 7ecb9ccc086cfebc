//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

#![warn(rust_2018_idioms)]

use std::sync::{Arc, Mutex};

use pickledb::PickleDb;

pub mod data;
pub mod error;
pub mod options;

pub use crate::data::{DataKey, DataStore, DataValue, StartupStatus};
pub use crate::error::Error;
pub use crate::options::{Options, StartupMode, XmldbOptions};

pub type Database = Arc<Mutex<PickleDb>>;
