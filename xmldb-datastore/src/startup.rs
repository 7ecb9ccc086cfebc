//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::{info, warn};
use xmldb_utils::{StartupMode, StartupStatus};
use xmldb_xml::Bind;

use crate::element::{CANDIDATE, RUNNING, STARTUP};
use crate::error::Error;
use crate::xmldb::Xmldb;

// ===== impl Xmldb =====

impl Xmldb {
    // Provisions the datastores when the daemon starts.
    //
    // Filesystem errors are returned. Configurations that fail to load or
    // don't match the data model are reported through the returned status,
    // in which case the running datastore is left as it was.
    pub fn startup(&mut self, mode: StartupMode) -> Result<StartupStatus, Error> {
        if self.options.multi {
            for db in [RUNNING, STARTUP, CANDIDATE] {
                self.multi_upgrade(db)?;
            }
        }

        let status = match mode {
            StartupMode::None => {
                if !self.exists(RUNNING)? {
                    self.reset(RUNNING)?;
                }
                StartupStatus::Ok
            }
            StartupMode::Init => {
                self.reset(RUNNING)?;
                StartupStatus::Ok
            }
            StartupMode::Running => self.startup_load(RUNNING)?,
            StartupMode::Startup => {
                if !self.exists(STARTUP)? {
                    self.reset(STARTUP)?;
                }
                let status = self.startup_load(STARTUP)?;
                if status == StartupStatus::Ok {
                    self.copy(STARTUP, RUNNING)?;
                }
                status
            }
        };

        // The candidate starts as a copy of the running configuration,
        // or empty when the running one can't be loaded.
        if mode == StartupMode::Running && status == StartupStatus::Err {
            self.reset(CANDIDATE)?;
            self.get_cache(CANDIDATE)?;
        } else {
            self.get_cache(RUNNING)?;
            self.copy(RUNNING, CANDIDATE)?;
        }
        self.set_modified(CANDIDATE, false)?;

        match status {
            StartupStatus::Ok => info!(%mode, "datastores provisioned"),
            _ => warn!(%mode, ?status, "startup configuration not loaded"),
        }
        Ok(status)
    }

    // Loads a database from disk and validates it against the data model.
    fn startup_load(&mut self, db: &str) -> Result<StartupStatus, Error> {
        self.clear(db);
        match self.load_cache(db) {
            Ok(Some(Bind::NotBound(_))) => Ok(StartupStatus::Invalid),
            Ok(_) => Ok(StartupStatus::Ok),
            Err(Error::Xml(error)) => {
                error.log();
                self.clear(db);
                Ok(StartupStatus::Err)
            }
            Err(error) => Err(error),
        }
    }
}
