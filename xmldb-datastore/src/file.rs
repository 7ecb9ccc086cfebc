//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::IoError;

// Name of the root file of a multi-file datastore.
pub const MULTI_ROOT_FILE: &str = "0.xml";

// Reads a whole file. A missing file reads as empty.
pub(crate) fn read(path: &Path) -> Result<String, IoError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            Ok(String::new())
        }
        Err(error) => Err(IoError::Read(path.to_owned(), error)),
    }
}

pub(crate) fn write(path: &Path, text: &str) -> Result<(), IoError> {
    fs::write(path, text).map_err(|error| IoError::Write(path.to_owned(), error))
}

// Creates a file, or empties it when it already exists.
pub(crate) fn create(path: &Path) -> Result<(), IoError> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map(|_| ())
        .map_err(|error| IoError::Create(path.to_owned(), error))
}

// Empties an existing file.
pub(crate) fn truncate(path: &Path) -> Result<(), IoError> {
    OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .map(|_| ())
        .map_err(|error| IoError::Truncate(path.to_owned(), error))
}

pub(crate) fn mkdir(path: &Path) -> Result<(), IoError> {
    fs::create_dir_all(path)
        .map_err(|error| IoError::Mkdir(path.to_owned(), error))
}

// Copies a file. A missing source leaves an empty destination.
pub(crate) fn copy(from: &Path, to: &Path) -> Result<(), IoError> {
    if !from.exists() {
        return create(to);
    }
    fs::copy(from, to)
        .map(|_| ())
        .map_err(|error| IoError::Copy(from.to_owned(), to.to_owned(), error))
}

// Copies the regular files of a directory into another one.
pub(crate) fn copy_dir(from: &Path, to: &Path) -> Result<(), IoError> {
    mkdir(to)?;
    for path in regular_files(from)? {
        if let Some(name) = path.file_name() {
            copy(&path, &to.join(name))?;
        }
    }
    Ok(())
}

pub(crate) fn rename(from: &Path, to: &Path) -> Result<(), IoError> {
    fs::rename(from, to).map_err(|error| {
        IoError::Rename(from.to_owned(), to.to_owned(), error)
    })
}

// Returns whether the path exists and has content, without following
// symbolic links.
pub(crate) fn has_content(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|metadata| metadata.len() > 0)
        .unwrap_or(false)
}

pub(crate) fn is_regular(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|metadata| metadata.file_type().is_file())
        .unwrap_or(false)
}

// Returns the regular files of a directory. A missing directory has none.
pub(crate) fn regular_files(dir: &Path) -> Result<Vec<PathBuf>, IoError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Ok(vec![]);
        }
        Err(error) => return Err(IoError::ReadDir(dir.to_owned(), error)),
    };

    let mut files = vec![];
    for entry in entries {
        let entry =
            entry.map_err(|error| IoError::ReadDir(dir.to_owned(), error))?;
        let path = entry.path();
        if is_regular(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

// Returns the auxiliary files of a multi-file datastore (`1.xml`,
// `2.xml`...), in numeric order.
pub(crate) fn aux_files(dir: &Path) -> Result<Vec<PathBuf>, IoError> {
    let mut files = regular_files(dir)?
        .into_iter()
        .filter_map(|path| {
            let number = path
                .file_name()?
                .to_str()?
                .strip_suffix(".xml")?
                .parse::<u32>()
                .ok()
                .filter(|number| *number > 0)?;
            Some((number, path))
        })
        .collect::<Vec<_>>();
    files.sort_by_key(|(number, _)| *number);
    Ok(files.into_iter().map(|(_, path)| path).collect())
}
