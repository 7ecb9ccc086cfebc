//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use xmldb_daemon::Error;
use xmldb_daemon::request::Request;
use xmldb_datastore::EditOp;

//
// Helper functions.
//

fn parse(line: &str) -> Request {
    line.parse().unwrap()
}

fn parse_error(line: &str) -> String {
    match line.parse::<Request>() {
        Err(Error::RequestInvalid(reason)) => reason,
        other => panic!("unexpected result: {other:?}"),
    }
}

//
// Tests.
//

#[test]
fn test_parse_commands() {
    assert_eq!(parse("lock candidate"), Request::Lock("candidate".to_owned()));
    assert_eq!(parse("  unlock   running "), Request::Unlock("running".to_owned()));
    assert_eq!(parse("unlock-all"), Request::UnlockAll);
    assert_eq!(parse("locked startup"), Request::Locked("startup".to_owned()));
    assert_eq!(parse("discard"), Request::Discard);
    assert_eq!(
        parse("copy running startup"),
        Request::Copy("running".to_owned(), "startup".to_owned())
    );
    assert_eq!(parse("reset tmp"), Request::Reset("tmp".to_owned()));
    assert_eq!(parse("delete tmp"), Request::Delete("tmp".to_owned()));
    assert_eq!(parse("exists tmp"), Request::Exists("tmp".to_owned()));
    assert_eq!(parse("print"), Request::Print);
    assert_eq!(
        parse("compare running candidate"),
        Request::Compare("running".to_owned(), "candidate".to_owned())
    );
    assert_eq!(parse("history"), Request::History);
    assert_eq!(parse("rollback 3"), Request::Rollback(3));
}

#[test]
fn test_parse_show() {
    assert_eq!(parse("show running"), Request::Show("running".to_owned(), None));
    assert_eq!(
        parse("show running /if:interfaces/interface[name='eth 0']"),
        Request::Show(
            "running".to_owned(),
            Some("/if:interfaces/interface[name='eth 0']".to_owned())
        )
    );
}

#[test]
fn test_parse_edit() {
    assert_eq!(
        parse("edit candidate replace <config> <a>1</a> </config>"),
        Request::Edit(
            "candidate".to_owned(),
            EditOp::Replace,
            "<config> <a>1</a> </config>".to_owned()
        )
    );
    assert_eq!(
        parse_error("edit candidate frob <config/>"),
        "unknown operation frob"
    );
    assert_eq!(parse_error("edit candidate merge"), "missing argument to edit");
}

#[test]
fn test_parse_commit_comment() {
    assert_eq!(parse("commit"), Request::Commit(String::new()));
    assert_eq!(
        parse("commit add uplink interfaces"),
        Request::Commit("add uplink interfaces".to_owned())
    );
}

#[test]
fn test_parse_errors() {
    assert_eq!(parse_error("frobnicate"), "unknown command frobnicate");
    assert_eq!(parse_error("lock"), "missing argument to lock");
    assert_eq!(parse_error("lock running candidate"), "too many arguments to lock");
    assert_eq!(parse_error("print all"), "too many arguments to print");
    assert_eq!(parse_error("copy running"), "missing argument to copy");
    assert_eq!(parse_error("rollback latest"), "invalid transaction ID latest");
}
