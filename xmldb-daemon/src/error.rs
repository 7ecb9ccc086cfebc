//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::warn;

//
// Type aliases.
//
pub type Result<T> = std::result::Result<T, Error>;

//
// Daemon errors.
//
#[derive(Debug)]
pub enum Error {
    Datastore(xmldb_datastore::Error),
    Xml(xmldb_xml::Error),
    YangSpec(String, xmldb_yang::file::Error),
    RequestInvalid(String),
    TransactionIdNotFound(u32),
}

// ===== impl Error =====

impl Error {
    pub fn log(&self) {
        match self {
            Error::Datastore(error) => {
                error.log();
            }
            Error::Xml(error) => {
                error.log();
            }
            Error::YangSpec(path, error) => {
                warn!(
                    %path,
                    error = %with_source(error),
                    "failed to load the YANG specification"
                );
            }
            Error::RequestInvalid(..) => {
                warn!("{}", self);
            }
            Error::TransactionIdNotFound(id) => {
                warn!(%id, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Datastore(error) => {
                use xmldb_datastore::Error as DsError;
                match error {
                    DsError::LockDenied(db, session) => {
                        write!(f, "{}: {} (session {})", db, error, session)
                    }
                    DsError::DatastoreNotFound(detail)
                    | DsError::InvalidName(detail)
                    | DsError::CacheNotFound(detail)
                    | DsError::InvalidPath(detail)
                    | DsError::EditInvalid(detail)
                    | DsError::DataExists(detail)
                    | DsError::DataMissing(detail)
                    | DsError::SchemaIncomplete(detail) => {
                        write!(f, "{}: {}", error, detail)
                    }
                    DsError::IoError(error) => {
                        write!(f, "{}", with_source(error))
                    }
                    DsError::Xml(error) => {
                        write!(f, "{}", with_source(error))
                    }
                }
            }
            Error::Xml(error) => {
                write!(f, "invalid XML data: {}", with_source(error))
            }
            Error::YangSpec(path, error) => {
                write!(f, "{}: {}", path, with_source(error))
            }
            Error::RequestInvalid(reason) => {
                write!(f, "invalid request: {}", reason)
            }
            Error::TransactionIdNotFound(id) => {
                write!(f, "transaction ID not found: {}", id)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Datastore(error) => Some(error),
            Error::Xml(error) => Some(error),
            Error::YangSpec(_, error) => Some(error),
            _ => None,
        }
    }
}

impl From<xmldb_datastore::Error> for Error {
    fn from(error: xmldb_datastore::Error) -> Error {
        Error::Datastore(error)
    }
}

impl From<xmldb_xml::Error> for Error {
    fn from(error: xmldb_xml::Error) -> Error {
        Error::Xml(error)
    }
}

// ===== global functions =====

fn with_source<E: std::error::Error>(error: E) -> String {
    if let Some(source) = error.source() {
        format!("{} ({})", error, with_source(source))
    } else {
        error.to_string()
    }
}
