//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::warn;

// XML tree errors.
#[derive(Debug)]
pub enum Error {
    NamespaceNotFound(Option<String>),
    SchemaIncomplete(String),
    NodeCreate(&'static str),
    NodeNotFound,
    CopyConflict,
    XmlParse(quick_xml::Error),
    XmlInvalid(String),
}

// ===== impl Error =====

impl Error {
    pub fn log(&self) {
        match self {
            Error::NamespaceNotFound(prefix) => {
                warn!(?prefix, "{}", self);
            }
            Error::SchemaIncomplete(reason) => {
                warn!(%reason, "{}", self);
            }
            Error::NodeCreate(reason) => {
                warn!(%reason, "{}", self);
            }
            Error::NodeNotFound | Error::CopyConflict => {
                warn!("{}", self);
            }
            Error::XmlParse(error) => {
                warn!(%error, "{}", self);
            }
            Error::XmlInvalid(reason) => {
                warn!(%reason, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NamespaceNotFound(Some(prefix)) => {
                write!(f, "namespace prefix not found: {prefix}")
            }
            Error::NamespaceNotFound(None) => {
                write!(f, "default namespace not found")
            }
            Error::SchemaIncomplete(..) => {
                write!(f, "incomplete YANG schema")
            }
            Error::NodeCreate(..) => write!(f, "failed to create XML node"),
            Error::NodeNotFound => write!(f, "XML node not found"),
            Error::CopyConflict => {
                write!(f, "copy destination already has children")
            }
            Error::XmlParse(..) => write!(f, "failed to parse XML document"),
            Error::XmlInvalid(..) => write!(f, "invalid XML document"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::XmlParse(error) => Some(error),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(error: quick_xml::Error) -> Error {
        Error::XmlParse(error)
    }
}
