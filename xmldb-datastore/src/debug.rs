//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::path::Path;

use tracing::{debug, debug_span, trace, trace_span};

use crate::edit::EditOp;

// Datastore debug messages.
#[derive(Debug)]
pub enum Debug<'a> {
    Load(&'a str, &'a Path),
    Write(&'a str, &'a Path),
    Create(&'a str),
    Delete(&'a str),
    Copy(&'a str, &'a str),
    Rename(&'a Path, &'a Path),
    Lock(&'a str, u32),
    Unlock(&'a str, u32),
    UnlockAll(u32),
    Edit(&'a str, EditOp, &'a str),
    Get(&'a str, &'a str),
    Commit(u32),
    Discard(u32),
    Upgrade(&'a str, &'a Path),
}

// ===== impl Debug =====

impl Debug<'_> {
    pub fn log(&self) {
        match self {
            Debug::Load(db, path) | Debug::Write(db, path) => {
                trace_span!("xmldb").in_scope(|| {
                    trace!(%db, path = %path.display(), "{}", self);
                });
            }
            Debug::Create(db) | Debug::Delete(db) => {
                debug_span!("xmldb").in_scope(|| {
                    debug!(%db, "{}", self);
                });
            }
            Debug::Copy(from, to) => {
                debug_span!("xmldb").in_scope(|| {
                    debug!(%from, %to, "{}", self);
                });
            }
            Debug::Upgrade(db, path) => {
                debug_span!("xmldb").in_scope(|| {
                    debug!(%db, path = %path.display(), "{}", self);
                });
            }
            Debug::Rename(from, to) => {
                debug_span!("xmldb").in_scope(|| {
                    debug!(
                        from = %from.display(), to = %to.display(),
                        "{}", self
                    );
                });
            }
            Debug::Lock(db, session) | Debug::Unlock(db, session) => {
                debug_span!("xmldb").in_scope(|| {
                    debug!(%db, %session, "{}", self);
                });
            }
            Debug::UnlockAll(session)
            | Debug::Commit(session)
            | Debug::Discard(session) => {
                debug_span!("xmldb").in_scope(|| {
                    debug!(%session, "{}", self);
                });
            }
            Debug::Edit(db, operation, path) => {
                trace_span!("xmldb").in_scope(|| {
                    trace!(%db, %operation, %path, "{}", self);
                });
            }
            Debug::Get(db, xpath) => {
                trace_span!("xmldb")
                    .in_scope(|| trace!(%db, %xpath, "{}", self));
            }
        }
    }
}

impl std::fmt::Display for Debug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::Load(..) => write!(f, "datastore loaded"),
            Debug::Write(..) => write!(f, "datastore written"),
            Debug::Create(..) => write!(f, "datastore created"),
            Debug::Delete(..) => write!(f, "datastore deleted"),
            Debug::Copy(..) => write!(f, "datastore copied"),
            Debug::Rename(..) => write!(f, "datastore file renamed"),
            Debug::Lock(..) => write!(f, "datastore locked"),
            Debug::Unlock(..) => write!(f, "datastore unlocked"),
            Debug::UnlockAll(..) => write!(f, "session locks released"),
            Debug::Edit(..) => write!(f, "edit applied"),
            Debug::Get(..) => write!(f, "data requested"),
            Debug::Commit(..) => write!(f, "candidate committed"),
            Debug::Discard(..) => write!(f, "candidate changes discarded"),
            Debug::Upgrade(..) => write!(f, "datastore layout upgraded"),
        }
    }
}
