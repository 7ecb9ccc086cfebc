//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use xmldb_xml::XmlTree;

use crate::error::Error;

// Well-known database names.
pub const CANDIDATE: &str = "candidate";
pub const RUNNING: &str = "running";
pub const STARTUP: &str = "startup";
pub const TMP: &str = "tmp";

// Session identifier meaning "no session".
pub const NO_SESSION: u32 = 0;

// Named databases known to the engine.
pub type Registry = BTreeMap<String, DbElement>;

// State of one named database.
#[derive(Debug, Default)]
pub struct DbElement {
    // Cached configuration, absent until first loaded.
    pub(crate) xml: Option<XmlTree>,
    // Session holding the advisory lock.
    pub(crate) lock: u32,
    pub(crate) lock_time: Option<DateTime<Utc>>,
    // Holds uncommitted edits.
    pub(crate) modified: bool,
    // The backing file had no content when loaded.
    pub(crate) empty: bool,
    // Edits stay in memory until explicitly written.
    pub(crate) volatile: bool,
}

// ===== impl DbElement =====

impl DbElement {
    pub fn xml(&self) -> Option<&XmlTree> {
        self.xml.as_ref()
    }

    pub fn lock(&self) -> u32 {
        self.lock
    }

    pub fn lock_time(&self) -> Option<DateTime<Utc>> {
        self.lock_time
    }

    pub fn is_locked(&self) -> bool {
        self.lock != NO_SESSION
    }

    pub fn modified(&self) -> bool {
        self.modified
    }

    pub fn empty(&self) -> bool {
        self.empty
    }

    pub fn volatile(&self) -> bool {
        self.volatile
    }

    pub(crate) fn set_lock(&mut self, session: u32) {
        self.lock = session;
        self.lock_time = Some(Utc::now());
    }

    pub(crate) fn clear_lock(&mut self) {
        self.lock = NO_SESSION;
        self.lock_time = None;
    }
}

// ===== global functions =====

// Checks that a database name can be used as a file name component.
pub fn validate_name(db: &str) -> Result<(), Error> {
    let valid = !db.is_empty()
        && db.chars().all(|c| {
            c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'
        })
        && !db.starts_with('.');
    match valid {
        true => Ok(()),
        false => Err(Error::InvalidName(db.to_owned())),
    }
}
