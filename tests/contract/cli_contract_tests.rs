//! CLI contract tests for pullbox argument validation.

use pullbox::Error;

fn expect_usage(args: &[&str]) {
    let err = pullbox::run(args.iter().copied()).expect_err("command should fail");
    let actual = err
        .downcast_ref::<Error>()
        .unwrap_or_else(|| panic!("unexpected error type: {err:?}"));
    assert!(matches!(actual, Error::Usage(_)));
}

#[test]
fn sftp_requires_all_positional_parameters() {
    expect_usage(&["pullbox", "sftp"]);
    expect_usage(&["pullbox", "sftp", "seedbox"]);
    expect_usage(&["pullbox", "sftp", "seedbox", "/incoming"]);
    expect_usage(&["pullbox", "sftp", "seedbox", "/incoming", "/data/sync"]);
}

#[test]
fn rsync_requires_all_positional_parameters() {
    expect_usage(&["pullbox", "rsync"]);
    expect_usage(&["pullbox", "rsync", "seedbox:/incoming/"]);
    expect_usage(&["pullbox", "rsync", "seedbox:/incoming/", "/data/sync"]);
}

#[test]
fn surplus_positional_parameters_are_rejected() {
    expect_usage(&[
        "pullbox",
        "rsync",
        "seedbox:/incoming/",
        "/data/sync",
        "/keys/id",
        "surplus",
    ]);
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    expect_usage(&["pullbox"]);
}

#[test]
fn unknown_subcommand_is_a_usage_error() {
    expect_usage(&["pullbox", "scp", "seedbox"]);
}

#[test]
fn help_is_not_an_error() {
    pullbox::run(["pullbox", "--help"]).expect("help should succeed");
    pullbox::run(["pullbox", "sftp", "--help"]).expect("subcommand help should succeed");
}

#[test]
fn cli_definition_is_consistent() {
    pullbox::cli::clap_command().debug_assert();
}
