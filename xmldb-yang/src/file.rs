//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::spec::{Keyword, SchemaNodeId, YangSpec};

// Serialized form of a compiled YANG statement.
//
// The schema compiler is an external tool: it emits the statement tree of
// all loaded modules as a JSON array of these objects.
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StmtDef {
    pub keyword: Keyword,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<StmtDef>,
}

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
}

// ===== impl YangSpec =====

impl YangSpec {
    // Builds a specification from its JSON representation.
    pub fn from_json(data: &str) -> Result<YangSpec, Error> {
        let defs: Vec<StmtDef> =
            serde_json::from_str(data).map_err(Error::Json)?;
        let mut spec = YangSpec::new();
        let root = spec.root();
        for def in &defs {
            spec.add_def(root, def);
        }
        Ok(spec)
    }

    // Reads a specification from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<YangSpec, Error> {
        let data = std::fs::read_to_string(&path).map_err(Error::Io)?;
        let spec = YangSpec::from_json(&data)?;
        debug!(
            path = %path.as_ref().display(),
            modules = spec.modules().count(),
            "loaded YANG specification"
        );
        Ok(spec)
    }

    // Returns the JSON representation of the specification.
    pub fn to_json(&self) -> String {
        let defs = self
            .children(self.root())
            .map(|id| self.to_def(id))
            .collect::<Vec<_>>();
        // Serializing plain data structures can't fail.
        serde_json::to_string_pretty(&defs).unwrap_or_default()
    }

    fn add_def(&mut self, parent: SchemaNodeId, def: &StmtDef) {
        let id = self.add(parent, def.keyword, def.argument.as_deref());
        for child in &def.children {
            self.add_def(id, child);
        }
    }

    fn to_def(&self, id: SchemaNodeId) -> StmtDef {
        let stmt = self.get(id);
        StmtDef {
            keyword: stmt.keyword,
            argument: stmt.argument.clone(),
            children: stmt.children.iter().map(|c| self.to_def(*c)).collect(),
        }
    }
}

// ===== impl Error =====

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(..) => write!(f, "failed to read YANG specification"),
            Error::Json(..) => {
                write!(f, "failed to decode YANG specification")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(error) => Some(error),
            Error::Json(error) => Some(error),
        }
    }
}
