//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use xmldb_utils::{Options, XmldbOptions};
use xmldb_xml::{Bind, ResolveCtx, XmlTree};
use xmldb_yang::YangSpec;

use crate::debug::Debug;
use crate::element::{self, DbElement, NO_SESSION, Registry};
use crate::error::Error;
use crate::file::{self, MULTI_ROOT_FILE};

/// XML datastore engine.
///
/// Owns the registry of named databases ("candidate", "running",
/// "startup"...), each with an optional cached configuration tree and its
/// lock, modified, empty and volatile state. Databases are persisted either
/// as a single `<dir>/<db>_db` file or, in multi-file mode, as a
/// `<dir>/<db>.d/` directory whose root content is stored in `0.xml`.
///
/// The engine isn't synchronized: requests must be handled one at a time.
/// The advisory lock only coordinates sessions multiplexed through the
/// same engine.
#[derive(Debug)]
pub struct Xmldb {
    pub(crate) options: XmldbOptions,
    pub(crate) resolve: ResolveCtx,
    pub(crate) spec: Option<Arc<YangSpec>>,
    pub(crate) registry: Registry,
}

// ===== impl Xmldb =====

impl Xmldb {
    pub fn new(options: &Options, spec: Option<Arc<YangSpec>>) -> Xmldb {
        Xmldb {
            options: options.xmldb.clone(),
            resolve: ResolveCtx::new(options.namespace_netconf_default),
            spec,
            registry: Default::default(),
        }
    }

    pub fn options(&self) -> &XmldbOptions {
        &self.options
    }

    pub fn resolve_ctx(&self) -> &ResolveCtx {
        &self.resolve
    }

    pub fn spec(&self) -> Option<&Arc<YangSpec>> {
        self.spec.as_ref()
    }

    pub fn set_spec(&mut self, spec: Option<Arc<YangSpec>>) {
        self.spec = spec;
    }

    pub fn element(&self, db: &str) -> Option<&DbElement> {
        self.registry.get(db)
    }

    // Returns the names of the registered databases.
    pub fn databases(&self) -> impl Iterator<Item = &str> + '_ {
        self.registry.keys().map(String::as_str)
    }

    pub(crate) fn element_mut(&mut self, db: &str) -> Option<&mut DbElement> {
        self.registry.get_mut(db)
    }

    // Returns the element of a database, registering it on first access.
    pub(crate) fn element_get_create(
        &mut self,
        db: &str,
    ) -> Result<&mut DbElement, Error> {
        element::validate_name(db)?;
        Ok(self.registry.entry(db.to_owned()).or_default())
    }

    fn element_get_mut(&mut self, db: &str) -> Result<&mut DbElement, Error> {
        self.registry
            .get_mut(db)
            .ok_or_else(|| Error::DatastoreNotFound(db.to_owned()))
    }

    fn element_get(&self, db: &str) -> Result<&DbElement, Error> {
        self.registry
            .get(db)
            .ok_or_else(|| Error::DatastoreNotFound(db.to_owned()))
    }

    // Returns the file holding the root content of a database.
    pub fn db2file(&self, db: &str) -> Result<PathBuf, Error> {
        self.db_file(db, self.options.multi)
    }

    // Returns the directory of a multi-file database.
    pub fn db2subdir(&self, db: &str) -> Result<PathBuf, Error> {
        element::validate_name(db)?;
        Ok(self.options.dir.join(format!("{db}.d")))
    }

    fn db_file(&self, db: &str, multi: bool) -> Result<PathBuf, Error> {
        element::validate_name(db)?;
        let path = match multi {
            true => self.db2subdir(db)?.join(MULTI_ROOT_FILE),
            false => self.options.dir.join(format!("{db}_db")),
        };
        Ok(path)
    }

    // Prepares the datastore directory.
    pub fn connect(&mut self) -> Result<(), Error> {
        file::mkdir(&self.options.dir)?;
        Ok(())
    }

    // Releases every cached tree. Registered databases are kept.
    pub fn disconnect(&mut self) {
        for element in self.registry.values_mut() {
            element.xml = None;
        }
    }

    // Returns whether the database has a non-empty backing file.
    pub fn exists(&self, db: &str) -> Result<bool, Error> {
        let path = self.db2file(db)?;
        Ok(file::has_content(&path))
    }

    // Creates the backing storage of a database, emptying it if it exists.
    // The database ends up registered with no cache and no lock.
    pub fn create(&mut self, db: &str) -> Result<(), Error> {
        let path = self.db2file(db)?;
        let element = self.element_get_create(db)?;
        element.xml = None;
        element.modified = false;
        element.clear_lock();

        if self.options.multi {
            file::mkdir(&self.db2subdir(db)?)?;
        }
        file::create(&path)?;
        Debug::Create(db).log();

        Ok(())
    }

    // Frees the cache and empties the backing file(s). Files are truncated
    // rather than removed so that their ownership and permissions are kept.
    //
    // The lock, if any, is left in place.
    pub fn delete(&mut self, db: &str) -> Result<(), Error> {
        let path = self.db2file(db)?;
        if let Some(element) = self.element_mut(db) {
            element.xml = None;
        }

        if path.exists() {
            file::truncate(&path)?;
        }
        if self.options.multi {
            for path in file::regular_files(&self.db2subdir(db)?)? {
                file::truncate(&path)?;
            }
        }
        Debug::Delete(db).log();

        Ok(())
    }

    // Deletes the database if it exists, then creates it empty.
    pub fn reset(&mut self, db: &str) -> Result<(), Error> {
        if self.exists(db)? {
            self.delete(db)?;
        }
        self.create(db)
    }

    // Frees the cache and clears the in-memory state of a database. The
    // backing file is left untouched.
    pub fn clear(&mut self, db: &str) {
        if let Some(element) = self.element_mut(db) {
            element.xml = None;
            element.modified = false;
            element.clear_lock();
        }
    }

    // Copies a database, both its cache and its backing file(s). The lock
    // and flags of the destination are kept. Copying a database onto itself
    // does nothing.
    pub fn copy(&mut self, from: &str, to: &str) -> Result<(), Error> {
        let from_file = self.db2file(from)?;
        let to_file = self.db2file(to)?;
        if from_file == to_file {
            return Ok(());
        }

        let xml = self
            .registry
            .get(from)
            .and_then(|element| element.xml.as_ref())
            .map(XmlTree::duplicate);
        match xml {
            Some(xml) => {
                self.element_get_create(to)?.xml = Some(xml);
            }
            None => {
                if let Some(element) = self.element_mut(to) {
                    element.xml = None;
                }
            }
        }

        if self.options.multi {
            let to_dir = self.db2subdir(to)?;
            file::mkdir(&to_dir)?;
            for path in file::aux_files(&to_dir)? {
                file::truncate(&path)?;
            }
        }
        file::copy(&from_file, &to_file)?;
        if self.options.multi {
            file::copy_dir(&self.db2subdir(from)?, &self.db2subdir(to)?)?;
        }
        Debug::Copy(from, to).log();

        Ok(())
    }

    // Renames the backing file of a database to that of `newdb` (or its
    // own when absent) followed by `suffix`. Does nothing when both are
    // absent.
    pub fn rename(
        &mut self,
        db: &str,
        newdb: Option<&str>,
        suffix: Option<&str>,
    ) -> Result<(), Error> {
        let old = self.db2file(db)?;
        if newdb.is_none() && suffix.is_none() {
            return Ok(());
        }

        let mut new = match newdb {
            Some(newdb) => self.db2file(newdb)?,
            None => old.clone(),
        }
        .into_os_string();
        if let Some(suffix) = suffix {
            new.push(suffix);
        }
        let new = PathBuf::from(new);

        file::rename(&old, &new)?;
        Debug::Rename(&old, &new).log();

        Ok(())
    }

    // Locks a database on behalf of a session, replacing any previous
    // holder. Callers needing exclusivity must check `is_locked` first.
    pub fn lock(&mut self, db: &str, session: u32) -> Result<(), Error> {
        self.element_get_create(db)?.set_lock(session);
        Debug::Lock(db, session).log();
        Ok(())
    }

    pub fn unlock(&mut self, db: &str) -> Result<(), Error> {
        let element = self.element_get_mut(db)?;
        let session = element.lock;
        element.clear_lock();
        Debug::Unlock(db, session).log();
        Ok(())
    }

    // Releases every lock held by a session.
    pub fn unlock_all(&mut self, session: u32) {
        for element in self
            .registry
            .values_mut()
            .filter(|element| element.lock == session)
        {
            element.clear_lock();
        }
        Debug::UnlockAll(session).log();
    }

    // Returns the session holding the lock of a database, or 0.
    pub fn is_locked(&self, db: &str) -> u32 {
        self.registry
            .get(db)
            .map(|element| element.lock)
            .unwrap_or(NO_SESSION)
    }

    pub fn lock_timestamp(
        &self,
        db: &str,
    ) -> Result<Option<DateTime<Utc>>, Error> {
        Ok(self.element_get(db)?.lock_time)
    }

    pub fn modified(&self, db: &str) -> Result<bool, Error> {
        Ok(self.element_get(db)?.modified)
    }

    pub fn set_modified(&mut self, db: &str, value: bool) -> Result<(), Error> {
        self.element_get_mut(db)?.modified = value;
        Ok(())
    }

    pub fn empty(&self, db: &str) -> Result<bool, Error> {
        Ok(self.element_get(db)?.empty)
    }

    pub fn set_empty(&mut self, db: &str, value: bool) -> Result<(), Error> {
        self.element_get_mut(db)?.empty = value;
        Ok(())
    }

    pub fn volatile(&self, db: &str) -> Result<bool, Error> {
        Ok(self.element_get(db)?.volatile)
    }

    pub fn set_volatile(&mut self, db: &str, value: bool) -> Result<(), Error> {
        self.element_get_mut(db)?.volatile = value;
        Ok(())
    }

    // Binds the cached tree of a database to the data model and adds the
    // schema default values.
    //
    // Defaults are only added when every element could be bound.
    pub fn populate(&mut self, db: &str) -> Result<Bind, Error> {
        let spec = self.spec.clone().ok_or_else(|| {
            Error::SchemaIncomplete("no data model loaded".to_owned())
        })?;
        let resolve = self.resolve;
        let xml = self
            .element_mut(db)
            .and_then(|element| element.xml.as_mut())
            .ok_or_else(|| Error::CacheNotFound(db.to_owned()))?;

        let bind = xml.bind_schema(&spec, &resolve)?;
        if bind == Bind::Bound {
            xml.add_global_defaults(&spec)?;
            let root = xml.root();
            xml.add_defaults(root, &spec)?;
        }

        Ok(bind)
    }

    // Migrates a single-file database to the multi-file layout. The legacy
    // file is left in place.
    pub fn multi_upgrade(&mut self, db: &str) -> Result<(), Error> {
        let to_file = self.db_file(db, true)?;
        if to_file.exists() {
            return Ok(());
        }

        self.element_get_create(db)?.xml = None;
        file::mkdir(&self.db2subdir(db)?)?;
        file::create(&to_file)?;

        let from_file = self.db_file(db, false)?;
        if file::is_regular(&from_file) {
            file::copy(&from_file, &to_file)?;
        }
        Debug::Upgrade(db, &to_file).log();

        Ok(())
    }

    // Dumps the state of every registered database.
    pub fn print(&self) -> String {
        let mut output = String::new();
        for (db, element) in &self.registry {
            output.push_str(&format!("Datastore:  {db}\n"));
            output.push_str(&format!("  Session:  {}\n", element.lock));
            output.push_str(&format!(
                "  XML:      {}\n",
                match &element.xml {
                    Some(xml) => format!("{} nodes", xml.len()),
                    None => "none".to_owned(),
                }
            ));
            output.push_str(&format!(
                "  Modified: {}\n",
                element.modified as u8
            ));
            output.push_str(&format!("  Empty:    {}\n", element.empty as u8));
        }
        output
    }
}
