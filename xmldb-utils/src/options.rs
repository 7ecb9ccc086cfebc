//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

#![allow(clippy::derivable_impls)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// Configuration options of the datastore engine.
//
// Well-known options are typed fields. Any other option is kept as a
// string in the named-option map, where it can be queried as a string,
// integer or boolean.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    pub xmldb: XmldbOptions,
    pub namespace_netconf_default: bool,
    pub startup_mode: StartupMode,
    #[serde(rename = "options")]
    pub named: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct XmldbOptions {
    // Directory holding the datastore files.
    pub dir: PathBuf,
    // Store each datastore as a directory of numbered files.
    pub multi: bool,
    // Indent saved documents.
    pub pretty: bool,
}

// How the datastores are provisioned when the daemon starts.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StartupMode {
    // Keep the running datastore as it is.
    #[default]
    None,
    // Start with an empty running datastore.
    Init,
    // Commit the running datastore into itself, as if it were a startup
    // configuration.
    Running,
    // Load the running datastore from the startup datastore.
    Startup,
}

// ===== impl Options =====

impl Options {
    pub fn exists(&self, name: &str) -> bool {
        self.named.contains_key(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    pub fn int(&self, name: &str) -> Result<i64, Error> {
        let value = self
            .str(name)
            .ok_or_else(|| Error::OptionNotFound(name.to_owned()))?;
        value.trim().parse().map_err(|_| {
            Error::OptionInvalid(name.to_owned(), value.to_owned())
        })
    }

    // Returns true only when the option is set to "true".
    pub fn bool(&self, name: &str) -> bool {
        self.str(name) == Some("true")
    }

    pub fn set_str(&mut self, name: &str, value: &str) {
        self.named.insert(name.to_owned(), value.to_owned());
    }

    pub fn set_int(&mut self, name: &str, value: i64) {
        self.named.insert(name.to_owned(), value.to_string());
    }

    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.named.insert(name.to_owned(), value.to_string());
    }

    pub fn del(&mut self, name: &str) -> Result<(), Error> {
        self.named
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::OptionNotFound(name.to_owned()))
    }
}

impl Default for Options {
    fn default() -> Options {
        Options {
            xmldb: Default::default(),
            namespace_netconf_default: false,
            startup_mode: Default::default(),
            named: Default::default(),
        }
    }
}

// ===== impl XmldbOptions =====

impl Default for XmldbOptions {
    fn default() -> XmldbOptions {
        XmldbOptions {
            dir: PathBuf::from("/var/opt/xmldb"),
            multi: false,
            pretty: true,
        }
    }
}

// ===== impl StartupMode =====

impl std::str::FromStr for StartupMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<StartupMode, Error> {
        match s {
            "none" => Ok(StartupMode::None),
            "init" => Ok(StartupMode::Init),
            "running" => Ok(StartupMode::Running),
            "startup" => Ok(StartupMode::Startup),
            _ => Err(Error::OptionInvalid(
                "startup_mode".to_owned(),
                s.to_owned(),
            )),
        }
    }
}

impl std::fmt::Display for StartupMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartupMode::None => write!(f, "none"),
            StartupMode::Init => write!(f, "init"),
            StartupMode::Running => write!(f, "running"),
            StartupMode::Startup => write!(f, "startup"),
        }
    }
}
