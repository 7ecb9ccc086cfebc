//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use xmldb_datastore::EditOp;

use crate::error::{Error, Result};

// Request read from the control channel, one per line.
#[derive(Debug, Eq, PartialEq)]
pub enum Request {
    // lock <db>
    Lock(String),
    // unlock <db>
    Unlock(String),
    // unlock-all
    UnlockAll,
    // locked <db>
    Locked(String),
    // show <db> [xpath]
    Show(String, Option<String>),
    // edit <db> <operation> <xml>
    Edit(String, EditOp, String),
    // commit [comment]
    Commit(String),
    // discard
    Discard,
    // copy <from> <to>
    Copy(String, String),
    // reset <db>
    Reset(String),
    // delete <db>
    Delete(String),
    // exists <db>
    Exists(String),
    // print
    Print,
    // compare <db> <db>
    Compare(String, String),
    // history
    History,
    // rollback <transaction-id>
    Rollback(u32),
}

// ===== impl Request =====

impl std::str::FromStr for Request {
    type Err = Error;

    fn from_str(line: &str) -> Result<Request> {
        let (command, args) = split_word(line.trim());
        let request = match command {
            "lock" => Request::Lock(single_arg(command, args)?),
            "unlock" => Request::Unlock(single_arg(command, args)?),
            "unlock-all" => {
                no_args(command, args)?;
                Request::UnlockAll
            }
            "locked" => Request::Locked(single_arg(command, args)?),
            "show" => {
                let (db, xpath) = split_word(args);
                if db.is_empty() {
                    return Err(missing_arg(command));
                }
                let xpath = (!xpath.is_empty()).then(|| xpath.to_owned());
                Request::Show(db.to_owned(), xpath)
            }
            "edit" => {
                let (db, rest) = split_word(args);
                let (op, xml) = split_word(rest);
                if db.is_empty() || op.is_empty() || xml.is_empty() {
                    return Err(missing_arg(command));
                }
                let op = op.parse().map_err(|_| {
                    Error::RequestInvalid(format!("unknown operation {op}"))
                })?;
                Request::Edit(db.to_owned(), op, xml.to_owned())
            }
            "commit" => Request::Commit(args.to_owned()),
            "discard" => {
                no_args(command, args)?;
                Request::Discard
            }
            "copy" => {
                let (from, to) = pair_args(command, args)?;
                Request::Copy(from, to)
            }
            "reset" => Request::Reset(single_arg(command, args)?),
            "delete" => Request::Delete(single_arg(command, args)?),
            "exists" => Request::Exists(single_arg(command, args)?),
            "print" => {
                no_args(command, args)?;
                Request::Print
            }
            "compare" => {
                let (db1, db2) = pair_args(command, args)?;
                Request::Compare(db1, db2)
            }
            "history" => {
                no_args(command, args)?;
                Request::History
            }
            "rollback" => {
                let id = single_arg(command, args)?;
                let id = id.parse().map_err(|_| {
                    Error::RequestInvalid(format!("invalid transaction ID {id}"))
                })?;
                Request::Rollback(id)
            }
            _ => {
                return Err(Error::RequestInvalid(format!(
                    "unknown command {command}"
                )));
            }
        };

        Ok(request)
    }
}

// ===== helper functions =====

// Splits the first whitespace-separated word off a string.
fn split_word(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (s, ""),
    }
}

fn no_args(command: &str, args: &str) -> Result<()> {
    if !args.is_empty() {
        return Err(too_many_args(command));
    }
    Ok(())
}

fn single_arg(command: &str, args: &str) -> Result<String> {
    let (arg, rest) = split_word(args);
    if arg.is_empty() {
        return Err(missing_arg(command));
    }
    if !rest.is_empty() {
        return Err(too_many_args(command));
    }
    Ok(arg.to_owned())
}

fn pair_args(command: &str, args: &str) -> Result<(String, String)> {
    let (first, rest) = split_word(args);
    let second = single_arg(command, rest)?;
    if first.is_empty() {
        return Err(missing_arg(command));
    }
    Ok((first.to_owned(), second))
}

fn missing_arg(command: &str) -> Error {
    Error::RequestInvalid(format!("missing argument to {command}"))
}

fn too_many_args(command: &str) -> Error {
    Error::RequestInvalid(format!("too many arguments to {command}"))
}
