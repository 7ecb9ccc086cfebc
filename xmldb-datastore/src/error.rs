//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::path::PathBuf;

use tracing::{error, warn};

// Datastore errors.
#[derive(Debug)]
pub enum Error {
    DatastoreNotFound(String),
    InvalidName(String),
    IoError(IoError),
    Xml(xmldb_xml::Error),
    SchemaIncomplete(String),
    CacheNotFound(String),
    LockDenied(String, u32),
    InvalidPath(String),
    EditInvalid(String),
    DataExists(String),
    DataMissing(String),
}

// Filesystem errors, along with the path they refer to.
#[derive(Debug)]
pub enum IoError {
    Read(PathBuf, std::io::Error),
    Write(PathBuf, std::io::Error),
    Create(PathBuf, std::io::Error),
    Truncate(PathBuf, std::io::Error),
    Mkdir(PathBuf, std::io::Error),
    ReadDir(PathBuf, std::io::Error),
    Copy(PathBuf, PathBuf, std::io::Error),
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ===== impl Error =====

impl Error {
    pub fn log(&self) {
        match self {
            Error::DatastoreNotFound(db) | Error::CacheNotFound(db) => {
                warn!(%db, "{}", self);
            }
            Error::InvalidName(name) => {
                warn!(%name, "{}", self);
            }
            Error::IoError(error) => {
                error.log();
            }
            Error::Xml(error) => {
                warn!(error = %with_source(error), "{}", self);
            }
            Error::SchemaIncomplete(reason) | Error::EditInvalid(reason) => {
                warn!(%reason, "{}", self);
            }
            Error::LockDenied(db, session) => {
                warn!(%db, %session, "{}", self);
            }
            Error::InvalidPath(path)
            | Error::DataExists(path)
            | Error::DataMissing(path) => {
                warn!(%path, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::DatastoreNotFound(..) => {
                write!(f, "datastore does not exist")
            }
            Error::InvalidName(..) => write!(f, "invalid datastore name"),
            Error::IoError(error) => error.fmt(f),
            Error::Xml(..) => write!(f, "XML processing failed"),
            Error::SchemaIncomplete(..) => {
                write!(f, "incomplete YANG schema")
            }
            Error::CacheNotFound(..) => write!(f, "XML cache not found"),
            Error::LockDenied(..) => {
                write!(f, "datastore is locked by another session")
            }
            Error::InvalidPath(..) => write!(f, "invalid data path"),
            Error::EditInvalid(..) => write!(f, "invalid edit request"),
            Error::DataExists(..) => write!(f, "data already exists"),
            Error::DataMissing(..) => write!(f, "data does not exist"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(error) => Some(error),
            Error::Xml(error) => Some(error),
            _ => None,
        }
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl From<xmldb_xml::Error> for Error {
    fn from(error: xmldb_xml::Error) -> Error {
        Error::Xml(error)
    }
}

// ===== impl IoError =====

impl IoError {
    pub(crate) fn log(&self) {
        match self {
            IoError::Read(path, error)
            | IoError::Write(path, error)
            | IoError::Create(path, error)
            | IoError::Truncate(path, error)
            | IoError::Mkdir(path, error)
            | IoError::ReadDir(path, error) => {
                error!(path = %path.display(), %error, "{}", self);
            }
            IoError::Copy(from, to, error)
            | IoError::Rename(from, to, error) => {
                error!(
                    from = %from.display(), to = %to.display(), %error,
                    "{}", self
                );
            }
        }
    }
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoError::Read(..) => write!(f, "failed to read datastore file"),
            IoError::Write(..) => write!(f, "failed to write datastore file"),
            IoError::Create(..) => {
                write!(f, "failed to create datastore file")
            }
            IoError::Truncate(..) => {
                write!(f, "failed to truncate datastore file")
            }
            IoError::Mkdir(..) => {
                write!(f, "failed to create datastore directory")
            }
            IoError::ReadDir(..) => {
                write!(f, "failed to read datastore directory")
            }
            IoError::Copy(..) => write!(f, "failed to copy datastore file"),
            IoError::Rename(..) => {
                write!(f, "failed to rename datastore file")
            }
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IoError::Read(_, error)
            | IoError::Write(_, error)
            | IoError::Create(_, error)
            | IoError::Truncate(_, error)
            | IoError::Mkdir(_, error)
            | IoError::ReadDir(_, error)
            | IoError::Copy(_, _, error)
            | IoError::Rename(_, _, error) => Some(error),
        }
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
