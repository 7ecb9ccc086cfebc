//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::path::Path;
use std::sync::Arc;

use maplit::btreemap;
use xmldb_utils::{
    DataKey, DataStore, DataValue, Error, Options, StartupMode, StartupStatus,
};
use xmldb_xml::NsContext;
use xmldb_yang::YangSpec;

#[test]
fn test_options_defaults() {
    let options = Options::default();
    assert_eq!(options.xmldb.dir, Path::new("/var/opt/xmldb"));
    assert!(!options.xmldb.multi);
    assert!(!options.namespace_netconf_default);
    assert_eq!(options.startup_mode, StartupMode::None);
    assert!(options.named.is_empty());
}

#[test]
fn test_options_from_toml() {
    let options: Options = toml::from_str(
        r#"
        namespace_netconf_default = true
        startup_mode = "startup"

        [xmldb]
        dir = "/tmp/xmldb"
        multi = true

        [options]
        CLICON_AUTOCOMMIT = "1"
        CLICON_MODULE_LIBRARY_RFC7895 = "true"
        "#,
    )
    .unwrap();
    assert_eq!(options.xmldb.dir, Path::new("/tmp/xmldb"));
    assert!(options.xmldb.multi);
    assert!(options.xmldb.pretty);
    assert!(options.namespace_netconf_default);
    assert_eq!(options.startup_mode, StartupMode::Startup);
    assert_eq!(
        options.named,
        btreemap! {
            "CLICON_AUTOCOMMIT".to_owned() => "1".to_owned(),
            "CLICON_MODULE_LIBRARY_RFC7895".to_owned() => "true".to_owned(),
        }
    );

    assert!(toml::from_str::<Options>("bogus = 1").is_err());
    assert!(toml::from_str::<Options>(r#"startup_mode = "later""#).is_err());
}

#[test]
fn test_named_options() {
    let mut options = Options::default();
    options.set_str("CLICON_XMLDB_FORMAT", "xml");
    options.set_int("CLICON_SOCK_PORT", 4535);
    options.set_bool("CLICON_QUIET", true);
    options.set_str("CLICON_BAD_INT", "four");

    assert!(options.exists("CLICON_XMLDB_FORMAT"));
    assert_eq!(options.str("CLICON_XMLDB_FORMAT"), Some("xml"));
    assert_eq!(options.int("CLICON_SOCK_PORT").unwrap(), 4535);
    assert!(options.bool("CLICON_QUIET"));
    assert!(!options.bool("CLICON_XMLDB_FORMAT"));
    assert!(!options.bool("CLICON_MISSING"));
    assert!(matches!(
        options.int("CLICON_MISSING"),
        Err(Error::OptionNotFound(_))
    ));
    assert!(matches!(
        options.int("CLICON_BAD_INT"),
        Err(Error::OptionInvalid(..))
    ));

    // Last write wins.
    options.set_bool("CLICON_QUIET", false);
    assert!(!options.bool("CLICON_QUIET"));

    options.del("CLICON_QUIET").unwrap();
    assert!(!options.exists("CLICON_QUIET"));
    assert!(options.del("CLICON_QUIET").is_err());
}

#[test]
fn test_startup_mode_parse() {
    assert_eq!("init".parse::<StartupMode>().unwrap(), StartupMode::Init);
    assert_eq!(StartupMode::Running.to_string(), "running");
    assert!("later".parse::<StartupMode>().is_err());
}

#[test]
fn test_data_store() {
    let mut data = DataStore::default();
    assert!(data.dbspec().is_none());
    assert_eq!(data.startup_status(), StartupStatus::Ok);
    assert!(data.argv().is_empty());
    assert!(!data.quit_upgrade());

    let spec = Arc::new(YangSpec::new());
    data.set_dbspec(spec.clone());
    assert!(Arc::ptr_eq(data.dbspec().unwrap(), &spec));

    data.set_nsctx_global(NsContext::init(Some("a"), Some("urn:a")));
    assert_eq!(data.nsctx_global().unwrap().get(Some("a")), Some("urn:a"));

    data.set_username("admin");
    assert_eq!(data.username(), Some("admin"));
    data.set_startup_status(StartupStatus::Invalid);
    assert_eq!(data.startup_status(), StartupStatus::Invalid);
    data.set_argv(vec!["-f".to_owned(), "x".to_owned()]);
    assert_eq!(data.argv().len(), 2);

    assert_eq!(data.next_session_id(), 1);
    assert_eq!(data.next_session_id(), 2);
    assert_eq!(data.session_id(), Some(2));

    // Values of another type are not returned by the typed getters.
    let old = data.set(DataKey::Username, DataValue::Int(7));
    assert!(old.is_some());
    assert_eq!(data.username(), None);

    assert!(data.del(DataKey::Username).is_some());
    assert!(!data.exists(DataKey::Username));
    assert!(data.del(DataKey::Username).is_none());
}
