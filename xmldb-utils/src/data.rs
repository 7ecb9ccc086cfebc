//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::sync::Arc;

use enum_as_inner::EnumAsInner;
use xmldb_xml::NsContext;
use xmldb_yang::YangSpec;

// Keys of the runtime data store.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum DataKey {
    // Loaded data model.
    DbSpec,
    // Namespace context of all loaded modules.
    NsctxGlobal,
    Username,
    StartupStatus,
    // Last allocated session identifier.
    SessionId,
    Argv,
    // Exit once the datastores are upgraded.
    QuitUpgrade,
}

#[derive(Clone, Debug, EnumAsInner)]
pub enum DataValue {
    Spec(Arc<YangSpec>),
    NsContext(NsContext),
    Str(String),
    Int(u32),
    Bool(bool),
    StartupStatus(StartupStatus),
    Argv(Vec<String>),
}

// Outcome of loading the startup configuration.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum StartupStatus {
    #[default]
    Ok,
    // Failed to load or parse.
    Err,
    // Loaded, but doesn't match the data model.
    Invalid,
}

// Runtime data computed by the daemon. Last write wins.
#[derive(Debug, Default)]
pub struct DataStore {
    values: BTreeMap<DataKey, DataValue>,
}

// ===== impl DataStore =====

impl DataStore {
    pub fn get(&self, key: DataKey) -> Option<&DataValue> {
        self.values.get(&key)
    }

    // Sets a value, returning the one it replaces.
    pub fn set(&mut self, key: DataKey, value: DataValue) -> Option<DataValue> {
        self.values.insert(key, value)
    }

    pub fn del(&mut self, key: DataKey) -> Option<DataValue> {
        self.values.remove(&key)
    }

    pub fn exists(&self, key: DataKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn dbspec(&self) -> Option<&Arc<YangSpec>> {
        self.get(DataKey::DbSpec)?.as_spec()
    }

    pub fn set_dbspec(&mut self, spec: Arc<YangSpec>) {
        self.set(DataKey::DbSpec, DataValue::Spec(spec));
    }

    pub fn nsctx_global(&self) -> Option<&NsContext> {
        self.get(DataKey::NsctxGlobal)?.as_ns_context()
    }

    pub fn set_nsctx_global(&mut self, nsctx: NsContext) {
        self.set(DataKey::NsctxGlobal, DataValue::NsContext(nsctx));
    }

    pub fn username(&self) -> Option<&str> {
        self.get(DataKey::Username)?.as_str().map(String::as_str)
    }

    pub fn set_username(&mut self, username: &str) {
        self.set(DataKey::Username, DataValue::Str(username.to_owned()));
    }

    pub fn startup_status(&self) -> StartupStatus {
        self.get(DataKey::StartupStatus)
            .and_then(|value| value.as_startup_status())
            .copied()
            .unwrap_or_default()
    }

    pub fn set_startup_status(&mut self, status: StartupStatus) {
        self.set(DataKey::StartupStatus, DataValue::StartupStatus(status));
    }

    pub fn session_id(&self) -> Option<u32> {
        self.get(DataKey::SessionId)?.as_int().copied()
    }

    pub fn set_session_id(&mut self, id: u32) {
        self.set(DataKey::SessionId, DataValue::Int(id));
    }

    // Allocates a new session identifier. Identifiers start at 1 since 0
    // stands for "no session".
    pub fn next_session_id(&mut self) -> u32 {
        let id = self.session_id().unwrap_or(0).wrapping_add(1).max(1);
        self.set_session_id(id);
        id
    }

    pub fn argv(&self) -> &[String] {
        self.get(DataKey::Argv)
            .and_then(|value| value.as_argv())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn set_argv(&mut self, argv: Vec<String>) {
        self.set(DataKey::Argv, DataValue::Argv(argv));
    }

    pub fn quit_upgrade(&self) -> bool {
        self.get(DataKey::QuitUpgrade)
            .and_then(|value| value.as_bool())
            .copied()
            .unwrap_or(false)
    }

    pub fn set_quit_upgrade(&mut self, quit: bool) {
        self.set(DataKey::QuitUpgrade, DataValue::Bool(quit));
    }
}
