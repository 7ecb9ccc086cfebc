//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use xmldb_xml::{Bind, NodeKind, PrintOpts, XmlTree};

use crate::debug::Debug;
use crate::error::Error;
use crate::file;
use crate::xmldb::Xmldb;

// Name of the document element of every datastore.
pub const CONFIG_ROOT: &str = "config";

// ===== impl Xmldb =====

impl Xmldb {
    // Returns the cached tree of a database, if loaded.
    pub fn cache(&self, db: &str) -> Option<&XmlTree> {
        self.element(db).and_then(|element| element.xml())
    }

    // Returns the cached tree of a database, loading it from disk first if
    // needed.
    pub fn get_cache(&mut self, db: &str) -> Result<&XmlTree, Error> {
        self.load_cache(db)?;
        self.cache(db).ok_or_else(|| Error::CacheNotFound(db.to_owned()))
    }

    pub(crate) fn get_cache_mut(
        &mut self,
        db: &str,
    ) -> Result<&mut XmlTree, Error> {
        self.load_cache(db)?;
        self.element_mut(db)
            .and_then(|element| element.xml.as_mut())
            .ok_or_else(|| Error::CacheNotFound(db.to_owned()))
    }

    // Loads a database into the cache unless already there.
    //
    // Returns the outcome of binding the freshly loaded tree to the data
    // model, or `None` when nothing was bound.
    pub(crate) fn load_cache(
        &mut self,
        db: &str,
    ) -> Result<Option<Bind>, Error> {
        if self.element_get_create(db)?.xml.is_some() {
            return Ok(None);
        }

        let path = self.db2file(db)?;
        let text = file::read(&path)?;
        let empty = text.trim().is_empty();
        let mut xml = match empty {
            true => XmlTree::new(CONFIG_ROOT),
            false => XmlTree::parse(&text)?,
        };

        // Auxiliary files are merged into the root content.
        if self.options.multi {
            let spec = self.spec.clone();
            for path in file::aux_files(&self.db2subdir(db)?)? {
                let text = file::read(&path)?;
                if text.trim().is_empty() {
                    continue;
                }
                let aux = XmlTree::parse(&text)?;
                let root = xml.root();
                xml.merge(root, &aux, aux.root(), spec.as_deref())?;
            }
        }
        Debug::Load(db, &path).log();

        let element = self.element_get_create(db)?;
        element.xml = Some(xml);
        element.empty = empty;

        if self.spec.is_none() {
            return Ok(None);
        }
        let bind = self.populate(db)?;
        if let Bind::NotBound(reason) = &bind {
            Error::SchemaIncomplete(reason.clone()).log();
        }

        Ok(Some(bind))
    }

    // Saves the cached tree of a database. Values added from schema
    // defaults aren't saved.
    pub fn write(&mut self, db: &str) -> Result<(), Error> {
        let path = self.db2file(db)?;
        let xml = self
            .cache(db)
            .ok_or_else(|| Error::CacheNotFound(db.to_owned()))?;
        let opts = PrintOpts {
            pretty: self.options.pretty,
            skip_defaults: true,
        };
        let text = xml.print(xml.root(), opts)?;
        let empty = xml
            .children(xml.root(), Some(NodeKind::Element))
            .all(|child| xml.is_default(child));

        if self.options.multi {
            let dir = self.db2subdir(db)?;
            file::mkdir(&dir)?;
            file::write(&path, &text)?;
            // The auxiliary content is now part of the root file.
            for path in file::aux_files(&dir)? {
                file::truncate(&path)?;
            }
        } else {
            file::write(&path, &text)?;
        }
        Debug::Write(db, &path).log();

        self.set_empty(db, empty)?;

        Ok(())
    }
}
