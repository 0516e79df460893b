use super::*;

mod default {
    use super::*;

    #[test]
    fn when_constructed_should_use_expected_defaults() {
        // Arrange & Act
        let config = Config::default();

        // Assert
        assert!(!config.trust_proxy);
        assert_eq!(config.trust_proxy_config, TrustProxyConfig::default());
        assert!(config.proxy_header.is_none());
        assert!(!config.enable_ip_validation);
        assert!(!config.case_sensitive);
        assert!(!config.strict_routing);
        assert_eq!(config.max_idle_contexts, DEFAULT_MAX_IDLE_CONTEXTS);
        assert_eq!(config.body_limit, DEFAULT_BODY_LIMIT);
        assert_eq!(config.subdomain_offset, 2);
        assert!(config.error_handler.is_none());
        assert!(config.xml_encoder.is_none());
    }

    #[test]
    fn when_default_should_pass_validation() {
        assert_eq!(Config::default().validate(), Ok(()));
    }
}

mod validate {
    use super::*;

    #[test]
    fn when_idle_contexts_zero_should_return_error() {
        // Arrange
        let config = Config {
            max_idle_contexts: 0,
            ..Config::default()
        };

        // Act
        let result = config.validate();

        // Assert
        assert_eq!(result, Err(ConfigError::ZeroIdleContexts));
    }

    #[test]
    fn when_proxy_header_is_not_token_should_return_error() {
        // Arrange
        let config = Config {
            proxy_header: Some("X Forwarded".into()),
            ..Config::default()
        };

        // Act
        let result = config.validate();

        // Assert
        assert_eq!(
            result,
            Err(ConfigError::InvalidProxyHeader("X Forwarded".into()))
        );
    }

    #[test]
    fn when_proxy_header_is_empty_should_return_error() {
        let config = Config {
            proxy_header: Some(String::new()),
            ..Config::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidProxyHeader(_))
        ));
    }

    #[test]
    fn when_body_limit_zero_should_return_error() {
        let config = Config {
            body_limit: 0,
            ..Config::default()
        };

        assert_eq!(config.validate(), Err(ConfigError::ZeroBodyLimit));
    }

    #[test]
    fn when_subdomain_offset_negative_should_return_error() {
        let config = Config {
            subdomain_offset: -1,
            ..Config::default()
        };

        assert_eq!(
            config.validate(),
            Err(ConfigError::NegativeSubdomainOffset(-1))
        );
    }

    #[test]
    fn when_proxy_header_valid_should_succeed() {
        let config = Config {
            proxy_header: Some("X-Forwarded-For".into()),
            ..Config::default()
        };

        assert_eq!(config.validate(), Ok(()));
    }
}
