//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod file;
pub mod spec;

pub use crate::spec::{Keyword, SchemaNodeId, YangSpec, YangStmt};

// NETCONF base namespace (RFC 6241, section 3.1).
pub const NETCONF_BASE_NAMESPACE: &str =
    "urn:ietf:params:xml:ns:netconf:base:1.0";

// Canonical prefix of the NETCONF base namespace.
pub const NETCONF_BASE_PREFIX: &str = "nc";
