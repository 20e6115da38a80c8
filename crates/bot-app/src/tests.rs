#[cfg(test)]
mod tests {
    use crate::config::*;
    use bot_types::config::{BotConfig, BotMode};
    use bot_types::BotError;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let config = parse_config(
            r#"
            [bot]
            mode = "v2"

            [media]
            image_model = "dall-e-3"
            "#,
        )
        .unwrap();

        assert_eq!(config.bot.mode, BotMode::Keyword);
        assert_eq!(config.bot.placeholder, "Please wait...");
        assert_eq!(config.media.image_model, "dall-e-3");
        assert_eq!(config.media.tts_voice, "nova");
        assert_eq!(config.llm.model, "gpt-4-1106-preview");
    }

    #[test]
    fn test_parse_config_rejects_bad_mode() {
        let err = parse_config("[bot]\nmode = \"v9\"\n").unwrap_err();
        assert!(matches!(err, BotError::Config(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.toml");
        std::fs::write(&path, "[llm]\nmodel = \"gpt-4o\"\nmax_tokens = 512\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.max_tokens, Some(512));
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, BotError::Fs { .. }));
        assert_eq!(load_config(None).unwrap().bot.files_dir, "files");
    }

    #[test]
    fn test_env_overrides_secrets() {
        let mut config = parse_config("[slack]\napp_token = \"from-file\"\n").unwrap();
        apply_env_overrides(
            &mut config,
            env(&[
                (ENV_SLACK_BOT_TOKEN, "xoxb-env"),
                (ENV_OPENAI_API_KEY, "sk-env"),
                (ENV_OPENAI_API_BASE, "http://localhost:8080"),
                (ENV_SLACK_APP_TOKEN, ""),
            ]),
        );

        assert_eq!(config.slack.app_token, "from-file");
        assert_eq!(config.slack.bot_token, "xoxb-env");
        assert_eq!(config.llm.api_key, "sk-env");
        assert_eq!(config.llm.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_validate_lists_missing_credentials() {
        let mut config = BotConfig::default();
        config.slack.app_token = "xapp-1".to_string();

        match validate(&config).unwrap_err() {
            BotError::Config(msg) => {
                assert!(msg.contains(ENV_SLACK_BOT_TOKEN));
                assert!(msg.contains(ENV_OPENAI_API_KEY));
                assert!(!msg.contains(ENV_SLACK_APP_TOKEN));
            }
            other => panic!("unexpected error {:?}", other),
        }

        config.slack.bot_token = "xoxb-1".to_string();
        config.llm.api_key = "sk-1".to_string();
        assert!(validate(&config).is_ok());
    }
}
