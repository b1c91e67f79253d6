//! Integration test for the process-wide converter.
//!
//! Kept in its own test binary: the global converter can only be
//! configured once per process.

use darkskin::{DarkModeConfig, DarkModeConverter, Error, convert_css};

#[test]
fn global_converter_lifecycle() {
    let config = DarkModeConfig::default().with_marker("/* global-dark */");
    let installed = DarkModeConverter::init_global(config).unwrap();
    assert_eq!(installed.config().marker, "/* global-dark */");

    let out = convert_css("a{color:#3366cc}");
    assert_eq!(out, "/* global-dark */\na{color: #3366cc}");
    assert_eq!(DarkModeConverter::global().cache_stats().entries, 1);

    let again = DarkModeConverter::init_global(DarkModeConfig::default());
    assert!(matches!(again, Err(Error::AlreadyInitialized)));
}
