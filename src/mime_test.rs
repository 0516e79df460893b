use super::*;

mod by_extension {
    use super::*;

    #[test]
    fn should_accept_extension_with_or_without_dot() {
        assert_eq!(by_extension("html"), Some("text/html"));
        assert_eq!(by_extension(".xml"), Some("application/xml"));
        assert_eq!(by_extension("JSON"), Some("application/json"));
    }

    #[test]
    fn should_return_none_when_unknown() {
        assert_eq!(by_extension("nope"), None);
        assert_eq!(by_extension(""), None);
    }
}

mod resolve_offer {
    use super::*;

    #[test]
    fn should_pass_media_types_through() {
        assert_eq!(resolve_offer("text/plain;a=b"), Some("text/plain;a=b"));
    }

    #[test]
    fn should_map_extensions() {
        assert_eq!(resolve_offer("txt"), Some("text/plain"));
    }
}

mod essence {
    use super::*;

    #[test]
    fn should_strip_parameters_and_lowercase() {
        assert_eq!(essence("Text/HTML; charset=utf-8"), "text/html");
    }
}
