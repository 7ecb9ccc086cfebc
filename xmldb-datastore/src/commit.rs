//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use crate::debug::Debug;
use crate::element::{CANDIDATE, NO_SESSION, RUNNING};
use crate::error::Error;
use crate::xmldb::Xmldb;

// ===== impl Xmldb =====

impl Xmldb {
    // Promotes the candidate configuration to the running one.
    pub fn commit(&mut self, session: u32) -> Result<(), Error> {
        self.check_lock(RUNNING, session)?;
        self.check_lock(CANDIDATE, session)?;

        // Save edits made to a volatile candidate first, so that its file
        // can be copied along with its cache.
        self.get_cache(CANDIDATE)?;
        self.write(CANDIDATE)?;
        self.copy(CANDIDATE, RUNNING)?;
        self.set_modified(CANDIDATE, false)?;
        Debug::Commit(session).log();

        Ok(())
    }

    // Reverts the candidate configuration to the running one.
    pub fn discard_changes(&mut self, session: u32) -> Result<(), Error> {
        self.check_lock(CANDIDATE, session)?;

        self.get_cache(RUNNING)?;
        self.copy(RUNNING, CANDIDATE)?;
        self.set_modified(CANDIDATE, false)?;
        Debug::Discard(session).log();

        Ok(())
    }

    // Fails when the database is locked by another session.
    pub fn check_lock(&self, db: &str, session: u32) -> Result<(), Error> {
        match self.is_locked(db) {
            NO_SESSION => Ok(()),
            holder if holder == session => Ok(()),
            holder => Err(Error::LockDenied(db.to_owned(), holder)),
        }
    }
}
