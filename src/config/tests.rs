use clap::Parser;

use super::*;

fn raw_with_endpoints() -> RawSettings {
    let mut raw = RawSettings::default();
    raw.dispatcher.endpoint = Some("http://dispatcher.local/invalidate".to_string());
    raw.catalog.endpoint = Some("http://catalog.local/graphql".to_string());
    raw.repository.endpoint = Some("http://repository.local/query".to_string());
    raw
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = raw_with_endpoints();
    raw.logging.level = Some("info".to_string());

    let overrides = EngineOverrides {
        log_level: Some("debug".to_string()),
        dispatcher_endpoint: Some("http://other.local/invalidate".to_string()),
        ..Default::default()
    };

    raw.apply_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.dispatcher.endpoint.host_str(), Some("other.local"));
}

#[test]
fn missing_endpoint_is_rejected() {
    let mut raw = raw_with_endpoints();
    raw.catalog.endpoint = None;

    let error = Settings::from_raw(raw).expect_err("missing endpoint should fail");
    assert!(matches!(
        error,
        LoadError::Invalid {
            key: "catalog.endpoint",
            ..
        }
    ));
}

#[test]
fn backend_timeouts_default_to_ten_seconds() {
    let settings = Settings::from_raw(raw_with_endpoints()).expect("valid settings");
    assert_eq!(settings.catalog.timeout, Duration::from_millis(10_000));
    assert_eq!(settings.repository.timeout, Duration::from_millis(10_000));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = raw_with_endpoints();
    let overrides = EngineOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn storefront_validation_rejects_relative_store_path() {
    let mut raw = raw_with_endpoints();
    raw.storefronts.push(StorefrontSettings {
        store_path: "content/site/en".to_string(),
        client_id: "default".to_string(),
        store_view: "en".to_string(),
        product_page: "/content/site/en/product-page".to_string(),
        category_page: "/content/site/en/category-page".to_string(),
    });

    let error = Settings::from_raw(raw).expect_err("relative store path should fail");
    assert!(matches!(
        error,
        LoadError::Invalid {
            key: "storefronts.store_path",
            ..
        }
    ));
}

#[test]
fn store_registry_is_built_from_bindings() {
    let mut raw = raw_with_endpoints();
    raw.storefronts.push(StorefrontSettings {
        store_path: "/content/site/en".to_string(),
        client_id: "default".to_string(),
        store_view: "en".to_string(),
        product_page: "/content/site/en/product-page".to_string(),
        category_page: "/content/site/en/category-page".to_string(),
    });

    let settings = Settings::from_raw(raw).expect("valid settings");
    let registry = settings.store_registry();
    assert!(registry.resolve("/content/site/en").is_some());
    assert!(registry.resolve("/content/site/fr").is_none());
}

#[test]
fn parse_run_arguments() {
    let args = CliArgs::parse_from([
        "scopa",
        "run",
        "--spool-poll-interval-ms",
        "250",
        "notification.json",
    ]);

    match args.command.expect("run command") {
        Command::Run(run) => {
            assert_eq!(run.notification, PathBuf::from("notification.json"));
            assert_eq!(run.overrides.spool_poll_interval_ms, Some(250));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn watch_is_the_bare_subcommand() {
    let args = CliArgs::parse_from(["scopa", "watch"]);
    assert!(matches!(args.command, Some(Command::Watch(_))));
}

#[test]
fn poll_interval_is_clamped_above_zero() {
    let mut raw = raw_with_endpoints();
    raw.engine.poll_interval_ms = Some(0);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.engine.poll_interval, Duration::from_millis(1));
}
