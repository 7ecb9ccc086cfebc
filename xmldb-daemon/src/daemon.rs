//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::{Arc, Mutex};

use chrono::Utc;
use itertools::Itertools;
use pickledb::PickleDb;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::Receiver;
use tracing::{debug, error, info, instrument, trace};
use xmldb_datastore::{
    CANDIDATE, EditOp, Error as DsError, NO_SESSION, RUNNING, Xmldb,
};
use xmldb_utils::{DataStore, Database, StartupStatus};
use xmldb_xml::{NsContext, PrintOpts, XmlTree};
use xmldb_yang::YangSpec;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::request::Request;
use crate::rollback::{self, Transaction};

pub struct Daemon {
    // Datastore engine.
    xmldb: Xmldb,
    // Runtime data.
    data: DataStore,
    // Rollback log.
    db: Database,
    // Session of the control channel.
    session: u32,
}

// ===== impl Daemon =====

impl Daemon {
    // Loads the data model and provisions the datastores.
    pub fn init(config: &Config, db: PickleDb) -> Result<Daemon> {
        let db = Arc::new(Mutex::new(db));
        let mut data = DataStore::default();
        data.set_argv(std::env::args().collect());
        if let Ok(username) = std::env::var("USER") {
            data.set_username(&username);
        }

        // Load the compiled data model.
        let spec = match &config.yang.spec_file {
            Some(path) => {
                let spec = YangSpec::load(path)
                    .map_err(|error| Error::YangSpec(path.clone(), error))?;
                let spec = Arc::new(spec);
                data.set_dbspec(spec.clone());
                data.set_nsctx_global(NsContext::from_schema_root(&spec));
                Some(spec)
            }
            None => None,
        };

        // Provision the datastores.
        let options = config.options();
        let mut xmldb = Xmldb::new(&options, spec);
        xmldb.connect()?;
        let status = xmldb.startup(options.startup_mode)?;
        data.set_startup_status(status);

        let session = data.next_session_id();
        debug!(%session, "control session allocated");

        Ok(Daemon {
            xmldb,
            data,
            db,
            session,
        })
    }

    pub fn xmldb(&self) -> &Xmldb {
        &self.xmldb
    }

    pub fn data(&self) -> &DataStore {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut DataStore {
        &mut self.data
    }

    pub fn startup_status(&self) -> StartupStatus {
        self.data.startup_status()
    }

    // Main event loop.
    #[instrument(skip_all, "daemon")]
    pub async fn run(mut self, mut signal_rx: Receiver<()>) {
        if self.data.quit_upgrade() {
            info!("datastores upgraded, exiting");
            self.shutdown();
            return;
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();
        loop {
            tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if let Some(response) = self.process_line(&line) {
                            let response = format!("{response}\n");
                            if let Err(error) =
                                stdout.write_all(response.as_bytes()).await
                            {
                                error!(%error, "failed to write response");
                                break;
                            }
                            if let Err(error) = stdout.flush().await {
                                error!(%error, "failed to flush response");
                                break;
                            }
                        }
                    }
                    // End of input.
                    Ok(None) => break,
                    Err(error) => {
                        error!(%error, "failed to read request");
                        break;
                    }
                },
                _ = signal_rx.recv() => break,
            }
        }

        self.shutdown();
    }

    // Processes a single request line and returns the response to it.
    //
    // Blank lines and comments are ignored.
    pub fn process_line(&mut self, line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let response = line
            .parse::<Request>()
            .and_then(|request| self.process_request(request));
        match response {
            Ok(response) => Some(response),
            Err(error) => {
                error.log();
                Some(format!("error: {error}"))
            }
        }
    }

    // Processes a request received from the control channel.
    pub fn process_request(&mut self, request: Request) -> Result<String> {
        trace!(?request, "received request");

        let session = self.session;
        match request {
            Request::Lock(db) => {
                self.xmldb.check_lock(&db, session)?;
                self.xmldb.lock(&db, session)?;
                Ok("ok".to_owned())
            }
            Request::Unlock(db) => {
                self.xmldb.check_lock(&db, session)?;
                self.xmldb.unlock(&db)?;
                Ok("ok".to_owned())
            }
            Request::UnlockAll => {
                self.xmldb.unlock_all(session);
                Ok("ok".to_owned())
            }
            Request::Locked(db) => self.process_locked(&db),
            Request::Show(db, xpath) => self.process_show(&db, xpath),
            Request::Edit(db, op, xml) => {
                let edit = XmlTree::parse(&xml)?;
                self.xmldb.put(&db, op, &edit, session)?;
                Ok("ok".to_owned())
            }
            Request::Commit(comment) => self.process_commit(comment),
            Request::Discard => {
                self.xmldb.discard_changes(session)?;
                Ok("ok".to_owned())
            }
            Request::Copy(from, to) => {
                self.xmldb.check_lock(&to, session)?;
                self.xmldb.copy(&from, &to)?;
                Ok("ok".to_owned())
            }
            Request::Reset(db) => {
                self.xmldb.check_lock(&db, session)?;
                self.xmldb.reset(&db)?;
                Ok("ok".to_owned())
            }
            Request::Delete(db) => {
                self.xmldb.check_lock(&db, session)?;
                self.xmldb.delete(&db)?;
                Ok("ok".to_owned())
            }
            Request::Exists(db) => Ok(self.xmldb.exists(&db)?.to_string()),
            Request::Print => Ok(self.xmldb.print().trim_end().to_owned()),
            Request::Compare(db1, db2) => self.process_compare(&db1, &db2),
            Request::History => Ok(self.process_history()),
            Request::Rollback(id) => self.process_rollback(id),
        }
    }

    fn process_locked(&self, db: &str) -> Result<String> {
        let session = self.xmldb.is_locked(db);
        match self.xmldb.lock_timestamp(db) {
            Ok(Some(time)) if session != NO_SESSION => {
                Ok(format!("{} {}", session, time.to_rfc3339()))
            }
            _ => Ok(session.to_string()),
        }
    }

    fn process_show(
        &mut self,
        db: &str,
        xpath: Option<String>,
    ) -> Result<String> {
        let nsctx = self.data.nsctx_global().cloned();
        let xml = self.xmldb.get(
            db,
            xpath.as_deref().unwrap_or("/"),
            nsctx.as_ref(),
        )?;
        let opts = PrintOpts {
            pretty: true,
            skip_defaults: false,
        };
        Ok(xml.print(xml.root(), opts)?)
    }

    // Commits the candidate configuration and records the result in the
    // rollback log.
    fn process_commit(&mut self, comment: String) -> Result<String> {
        self.xmldb.commit(self.session)?;

        let running = self.xmldb.get_cache(RUNNING)?;
        let opts = PrintOpts {
            pretty: false,
            skip_defaults: true,
        };
        let configuration = running.print(running.root(), opts)?;
        let mut transaction =
            Transaction::new(Utc::now(), comment, configuration);
        let mut db = self.db.lock().unwrap();
        rollback::transaction_record(&mut db, &mut transaction);
        info!(id = %transaction.id, "configuration committed");

        Ok(format!("ok {}", transaction.id))
    }

    // Lists the differences between two databases, one per line:
    // `-` removed, `+` added and `~` changed.
    fn process_compare(&mut self, db1: &str, db2: &str) -> Result<String> {
        self.xmldb.get_cache(db1)?;
        self.xmldb.get_cache(db2)?;
        let (Some(old), Some(new)) =
            (self.xmldb.cache(db1), self.xmldb.cache(db2))
        else {
            return Err(DsError::CacheNotFound(db1.to_owned()).into());
        };
        let spec = self.xmldb.spec().map(Arc::as_ref);

        let diff = old.diff(old.root(), new, new.root(), spec);
        let removed = diff
            .removed
            .iter()
            .map(|node| format!("- {}", old.path(*node)));
        let added = diff
            .added
            .iter()
            .map(|node| format!("+ {}", new.path(*node)));
        let changed = diff.changed.iter().map(|(old_node, new_node)| {
            format!(
                "~ {}: {} -> {}",
                old.path(*old_node),
                old.body(*old_node).unwrap_or_default(),
                new.body(*new_node).unwrap_or_default()
            )
        });
        Ok(removed.chain(added).chain(changed).join("\n"))
    }

    fn process_history(&self) -> String {
        let db = self.db.lock().unwrap();
        rollback::transaction_get_all(&db)
            .iter()
            .map(|transaction| {
                format!(
                    "{} {} {}",
                    transaction.id,
                    transaction.date.to_rfc3339(),
                    transaction.comment
                )
                .trim_end()
                .to_owned()
            })
            .join("\n")
    }

    // Loads a configuration from the rollback log into the candidate.
    fn process_rollback(&mut self, id: u32) -> Result<String> {
        let transaction = {
            let db = self.db.lock().unwrap();
            rollback::transaction_get(&db, id)
                .ok_or(Error::TransactionIdNotFound(id))?
        };
        let configuration = XmlTree::parse(&transaction.configuration)?;
        self.xmldb.put(
            CANDIDATE,
            EditOp::Replace,
            &configuration,
            self.session,
        )?;
        Ok("ok".to_owned())
    }

    fn shutdown(&mut self) {
        self.xmldb.unlock_all(self.session);
        self.xmldb.disconnect();
    }
}
