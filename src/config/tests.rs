use super::*;

#[test]
fn defaults_resolve_without_any_source() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.to_string(), "127.0.0.1:3000");
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert_eq!(
        settings.upstream.base_url.as_str(),
        "https://jsonplaceholder.typicode.com/"
    );
    assert_eq!(settings.upstream.request_timeout, Duration::from_millis(5_000));
    assert_eq!(settings.cache.operation_timeout, Duration::from_millis(250));
    assert_eq!(settings.cache.sweep_interval, Duration::from_millis(30_000));
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());
    raw.upstream.timeout_ms = Some(1_000);

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        upstream_timeout_ms: Some(750),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.upstream.request_timeout, Duration::from_millis(750));
}

#[test]
fn cache_overrides_resolve_to_durations() {
    let mut raw = RawSettings::default();
    raw.cache.operation_timeout_ms = Some(100);
    let overrides = ServeOverrides {
        cache_operation_timeout_ms: Some(1),
        cache_sweep_interval_ms: Some(1_500),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.cache.operation_timeout, Duration::from_millis(1));
    assert_eq!(settings.cache.sweep_interval, Duration::from_millis(1_500));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn zero_port_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero port");
    assert!(matches!(err, LoadError::Invalid { key: "server.port", .. }));
}

#[test]
fn zero_timeouts_are_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.operation_timeout_ms = Some(0);
    let err = Settings::from_raw(raw).expect_err("zero cache timeout");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.operation_timeout_ms",
            ..
        }
    ));

    let mut raw = RawSettings::default();
    raw.upstream.timeout_ms = Some(0);
    let err = Settings::from_raw(raw).expect_err("zero upstream timeout");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "upstream.timeout_ms",
            ..
        }
    ));
}

#[test]
fn upstream_url_must_be_http() {
    for candidate in ["ftp://example.com", "mailto:ops@example.com", "not a url"] {
        let mut raw = RawSettings::default();
        raw.upstream.base_url = Some(candidate.to_string());

        let err = Settings::from_raw(raw).expect_err("invalid upstream url");
        assert!(
            matches!(
                err,
                LoadError::Invalid {
                    key: "upstream.base_url",
                    ..
                }
            ),
            "{candidate} should be rejected"
        );
    }
}

#[test]
fn blank_upstream_url_falls_back_to_default() {
    let mut raw = RawSettings::default();
    raw.upstream.base_url = Some("   ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(
        settings.upstream.base_url.host_str(),
        Some("jsonplaceholder.typicode.com")
    );
}

#[test]
fn invalid_log_level_is_rejected() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());

    let err = Settings::from_raw(raw).expect_err("bad level");
    assert!(matches!(err, LoadError::Invalid { key: "logging.level", .. }));
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["postgate"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "postgate",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--upstream-base-url",
        "http://localhost:8080",
        "--cache-sweep-interval-ms",
        "1000",
        "--log-json",
        "true",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.upstream_base_url.as_deref(),
                Some("http://localhost:8080")
            );
            assert_eq!(serve.overrides.cache_sweep_interval_ms, Some(1000));
            assert_eq!(serve.overrides.log_json, Some(true));
        }
    }
}
