use super::*;

fn request(pairs: &[(&str, &str)]) -> HeaderMap {
    pairs.iter().copied().collect()
}

mod etag_matches {
    use super::*;

    #[test]
    fn should_compare_weak_and_strong_tags_alike() {
        assert!(etag_matches("W/\"abc\"", "\"abc\""));
        assert!(etag_matches("\"abc\"", "\"zzz\", W/\"abc\""));
        assert!(!etag_matches("\"abc\"", "\"abd\""));
    }
}

mod parse_http_date {
    use super::*;

    #[test]
    fn should_read_imf_fixdate_and_reject_garbage() {
        let parsed = parse_http_date("Tue, 10 Nov 2009 23:00:00 GMT").map(|date| date.timestamp());

        assert_eq!(parsed, Some(1_257_894_000));
        assert!(parse_http_date("yesterday").is_none());
    }
}

mod is_fresh {
    use super::*;

    #[test]
    fn should_be_stale_without_validators() {
        let response = request(&[(header::ETAG, "\"abc\"")]);

        assert!(!is_fresh(&HeaderMap::new(), &response));
    }

    #[test]
    fn should_be_fresh_when_etag_matches() {
        // Arrange
        let req = request(&[(header::IF_NONE_MATCH, "\"abc\"")]);
        let res = request(&[(header::ETAG, "W/\"abc\"")]);

        // Act
        let fresh = is_fresh(&req, &res);

        // Assert
        assert!(fresh);
    }

    #[test]
    fn should_be_stale_when_etag_missing_or_different() {
        let req = request(&[(header::IF_NONE_MATCH, "\"abc\"")]);

        assert!(!is_fresh(&req, &HeaderMap::new()));
        assert!(!is_fresh(&req, &request(&[(header::ETAG, "\"xyz\"")])));
    }

    #[test]
    fn should_accept_any_etag_for_star() {
        let req = request(&[(header::IF_NONE_MATCH, "*")]);

        assert!(is_fresh(&req, &HeaderMap::new()));
    }

    #[test]
    fn should_be_stale_when_client_sends_no_cache() {
        let req = request(&[
            (header::IF_NONE_MATCH, "\"abc\""),
            (header::CACHE_CONTROL, "max-age=0, no-cache"),
        ]);
        let res = request(&[(header::ETAG, "\"abc\"")]);

        assert!(!is_fresh(&req, &res));
    }

    #[test]
    fn should_compare_last_modified_against_if_modified_since() {
        let req = request(&[(header::IF_MODIFIED_SINCE, "Tue, 10 Nov 2009 23:00:00 GMT")]);
        let older = request(&[(header::LAST_MODIFIED, "Mon, 09 Nov 2009 23:00:00 GMT")]);
        let newer = request(&[(header::LAST_MODIFIED, "Wed, 11 Nov 2009 23:00:00 GMT")]);

        assert!(is_fresh(&req, &older));
        assert!(!is_fresh(&req, &newer));
        assert!(!is_fresh(&req, &HeaderMap::new()));
    }

    #[test]
    fn should_be_stale_when_dates_do_not_parse() {
        let req = request(&[(header::IF_MODIFIED_SINCE, "not a date")]);
        let res = request(&[(header::LAST_MODIFIED, "Mon, 09 Nov 2009 23:00:00 GMT")]);

        assert!(!is_fresh(&req, &res));
    }
}
