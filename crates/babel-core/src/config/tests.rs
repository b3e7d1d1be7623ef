use super::*;
use std::collections::HashMap;

#[test]
fn test_engines_config_defaults() {
    let cfg = EnginesConfig::default();
    assert_eq!(cfg.timeout_secs, 30);
    assert_eq!(cfg.custom_timeout_secs, 15);
    assert_eq!(cfg.max_connections, 10);
    assert!(cfg.fallback_openai_key.is_empty());
}

#[test]
fn test_config_from_partial_toml() {
    let toml_str = r#"
        [babel]
        data_dir = "/tmp/babel-data"

        [channel.telegram]
        enabled = true
        bot_token = "123:abc"
        owner_id = 42

        [engines]
        timeout_secs = 10
    "#;
    let cfg: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(cfg.babel.data_dir, "/tmp/babel-data");
    assert_eq!(cfg.babel.log_level, "info");
    let tg = cfg.channel.telegram.unwrap();
    assert_eq!(tg.owner_id, 42);
    assert_eq!(cfg.engines.timeout_secs, 10);
    assert_eq!(cfg.engines.custom_timeout_secs, 15);
    assert_eq!(cfg.search.min_interval_secs, 3);
    assert_eq!(cfg.composer.revert_delay_secs, 5);
}

#[test]
fn test_empty_toml_uses_defaults() {
    let cfg: Config = toml::from_str("").unwrap();
    assert_eq!(cfg.babel.name, "Babel");
    assert!(cfg.channel.telegram.is_none());
    assert!(cfg.search.enabled);
    assert_eq!(cfg.search.cache_ttl_secs, 300);
}

#[test]
fn test_data_paths() {
    let cfg = BabelConfig {
        data_dir: "/srv/babel".into(),
        ..Default::default()
    };
    assert_eq!(cfg.settings_path(), PathBuf::from("/srv/babel/settings.json"));
    assert_eq!(cfg.vocab_path(), PathBuf::from("/srv/babel/vocab.json"));
    assert_eq!(cfg.logs_path(), PathBuf::from("/srv/babel/logs"));
}

#[test]
fn test_env_overrides_fill_only_empty_values() {
    let env: HashMap<&str, &str> = [
        ("TELEGRAM_BOT_TOKEN", "env-token"),
        ("FALLBACK_OPENAI_KEY", "sk-env"),
        ("FALLBACK_GEMINI_KEY", "AIza-env"),
        ("TAVILY_API_KEY", "tvly-env"),
    ]
    .into_iter()
    .collect();

    let mut cfg = Config::default();
    cfg.engines.fallback_gemini_key = "AIza-file".into();
    apply_env_overrides(&mut cfg, |k| env.get(k).map(|v| v.to_string()));

    assert_eq!(cfg.channel.telegram.as_ref().unwrap().bot_token, "env-token");
    assert_eq!(cfg.engines.fallback_openai_key, "sk-env");
    assert_eq!(cfg.engines.fallback_gemini_key, "AIza-file");
    assert_eq!(cfg.search.tavily_api_key, "tvly-env");
}

#[test]
fn test_env_override_keeps_file_token() {
    let mut cfg = Config::default();
    cfg.channel.telegram = Some(TelegramConfig {
        enabled: true,
        bot_token: "file-token".into(),
        owner_id: 7,
    });
    apply_env_overrides(&mut cfg, |k| {
        (k == "TELEGRAM_BOT_TOKEN").then(|| "env-token".to_string())
    });
    assert_eq!(cfg.channel.telegram.unwrap().bot_token, "file-token");
}

#[test]
fn test_load_missing_file_returns_defaults() {
    let cfg = load("/nonexistent/babel/config.toml").unwrap();
    assert_eq!(cfg.babel.data_dir, "~/.babel");
}

#[test]
fn test_shellexpand_plain_path_untouched() {
    assert_eq!(shellexpand("/var/lib/babel"), "/var/lib/babel");
}
