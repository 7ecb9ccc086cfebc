//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::{trace, trace_span};

#[derive(Debug)]
pub enum Debug<'a> {
    NsDeclare(Option<&'a str>, &'a str),
    SchemaBind(&'a str),
    SchemaUnbound(&'a str, &'a str),
    DefaultAdd(&'a str),
}

// ===== impl Debug =====

impl Debug<'_> {
    pub fn log(&self) {
        match self {
            Debug::NsDeclare(prefix, uri) => {
                trace_span!("xml").in_scope(|| {
                    trace!(?prefix, %uri, "{}", self);
                });
            }
            Debug::SchemaBind(path) => {
                trace_span!("xml").in_scope(|| {
                    trace!(%path, "{}", self);
                });
            }
            Debug::SchemaUnbound(path, reason) => {
                trace_span!("xml").in_scope(|| {
                    trace!(%path, %reason, "{}", self);
                });
            }
            Debug::DefaultAdd(path) => {
                trace_span!("xml").in_scope(|| trace!(%path, "{}", self));
            }
        }
    }
}

impl std::fmt::Display for Debug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::NsDeclare(..) => write!(f, "namespace declared"),
            Debug::SchemaBind(..) => write!(f, "bound to schema"),
            Debug::SchemaUnbound(..) => write!(f, "no matching schema node"),
            Debug::DefaultAdd(..) => write!(f, "default value added"),
        }
    }
}
