use super::*;

#[test]
fn test_cli_build() {
    let app = build_cli();
    assert_eq!(app.get_name(), "wtstatus");
}

#[test]
fn test_cli_requires_subcommand() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["wtstatus"]);
    assert!(matches.is_err());
}

#[test]
fn test_cli_status_command() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["wtstatus", "status", "/repo"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    let status_matches = matches.subcommand_matches("status").unwrap();
    assert_eq!(status_matches.get_one::<String>("path").unwrap(), "/repo");
    assert!(!status_matches.get_flag("json"));
    assert!(!status_matches.get_flag("no-diff"));
}

#[test]
fn test_cli_status_flags() {
    let app = build_cli();
    let matches = app
        .try_get_matches_from(vec!["wtstatus", "status", "/repo", "--json", "--no-diff"])
        .unwrap();
    let status_matches = matches.subcommand_matches("status").unwrap();
    assert!(status_matches.get_flag("json"));
    assert!(status_matches.get_flag("no-diff"));
}

#[test]
fn test_cli_status_requires_path() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["wtstatus", "status"]);
    assert!(matches.is_err());
}

#[test]
fn test_cli_watch_multiple_paths() {
    let app = build_cli();
    let matches = app
        .try_get_matches_from(vec!["wtstatus", "watch", "/a", "/b", "--interval-ms", "2500"])
        .unwrap();
    let watch_matches = matches.subcommand_matches("watch").unwrap();

    let paths: Vec<&String> = watch_matches.get_many::<String>("paths").unwrap().collect();
    assert_eq!(paths, vec!["/a", "/b"]);
    assert_eq!(watch_matches.get_one::<u64>("interval-ms"), Some(&2500));
    assert!(!watch_matches.get_flag("passive"));
    assert!(!watch_matches.get_flag("no-watch"));
}

#[test]
fn test_cli_watch_rejects_non_numeric_interval() {
    let app = build_cli();
    let matches =
        app.try_get_matches_from(vec!["wtstatus", "watch", "/a", "--interval-ms", "soon"]);
    assert!(matches.is_err());
}

#[test]
fn test_cli_watch_flags() {
    let app = build_cli();
    let matches = app
        .try_get_matches_from(vec![
            "wtstatus",
            "watch",
            "/a",
            "--passive",
            "--json",
            "--no-watch",
        ])
        .unwrap();
    let watch_matches = matches.subcommand_matches("watch").unwrap();
    assert!(watch_matches.get_flag("passive"));
    assert!(watch_matches.get_flag("json"));
    assert!(watch_matches.get_flag("no-watch"));
}

#[test]
fn test_cli_global_flags_after_subcommand() {
    let app = build_cli();
    let matches = app
        .try_get_matches_from(vec![
            "wtstatus",
            "status",
            "/repo",
            "-v",
            "--no-color",
            "--config",
            "/tmp/wt.toml",
        ])
        .unwrap();
    assert!(matches.get_flag("verbose"));
    assert!(matches.get_flag("no-color"));

    let status_matches = matches.subcommand_matches("status").unwrap();
    assert_eq!(
        status_matches.get_one::<String>("config").unwrap(),
        "/tmp/wt.toml"
    );
}
