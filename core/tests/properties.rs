//! Property-based tests for merging, URL resolution and classification.

use proptest::prelude::*;
use reqhttp_core::config::Params;
use reqhttp_core::outcome::is_success_status;
use reqhttp_core::{
    classify_status, merge, merge_headers, url, CallConfig, ClientDefaults, Headers,
    RequestOptions, Response,
};
use serde_json::Value;

fn headers_strategy() -> impl Strategy<Value = Headers> {
    prop::collection::btree_map("[A-Za-z][A-Za-z-]{0,8}", "[a-z0-9]{0,6}", 0..6)
}

fn response(status: Option<u16>) -> Response {
    Response {
        status,
        headers: Headers::new(),
        body: Value::Null,
    }
}

proptest! {
    /// Keys present in both layers carry the call value; every other key
    /// keeps the value of the only layer that has it.
    #[test]
    fn prop_call_headers_take_precedence(
        defaults in headers_strategy(),
        call in headers_strategy(),
    ) {
        let client = ClientDefaults::new(RequestOptions { headers: Some(defaults.clone()), ..Default::default() });
        let mut call_config = CallConfig::new("/p");
        call_config.options.headers = Some(call.clone());

        let effective = merge(&client, call_config).headers;

        for (key, value) in &effective {
            match call.get(key) {
                Some(expected) => { prop_assert_eq!(value, expected); }
                None => { prop_assert_eq!(Some(value), defaults.get(key)); }
            }
        }
        prop_assert_eq!(
            effective.len(),
            defaults.keys().chain(call.keys()).collect::<std::collections::BTreeSet<_>>().len()
        );
    }

    /// Folding header maps is the same as folding them pairwise.
    #[test]
    fn prop_merge_headers_is_associative(
        a in headers_strategy(),
        b in headers_strategy(),
        c in headers_strategy(),
    ) {
        let all_at_once = merge_headers([Some(&a), Some(&b), Some(&c)]);
        let ab = merge_headers([Some(&a), Some(&b)]);
        let stepwise = merge_headers([Some(&ab), None, Some(&c)]);
        prop_assert_eq!(all_at_once, stepwise);
    }

    /// Every `:name` occurrence is replaced and nothing else changes.
    #[test]
    fn prop_placeholder_substituted_everywhere(
        segments in prop::collection::vec("[a-z0-9/]{0,5}", 1..5),
        value in "[a-z0-9]{1,6}",
    ) {
        let template = segments.join(":name");
        let mut params = Params::new();
        params.insert("name".to_string(), Value::String(value.clone()));

        let resolved = url::resolve(&template, Some(&params));

        prop_assert_eq!(resolved.clone(), segments.join(&value));
        prop_assert!(!resolved.contains(":name"));
    }

    /// Resolving again with the same params is a no-op once no placeholder
    /// remains.
    #[test]
    fn prop_resolve_is_idempotent(
        prefix in "[a-z/]{0,5}",
        id in 0u32..100_000,
    ) {
        let template = format!("{prefix}/:id/tail");
        let mut params = Params::new();
        params.insert("id".to_string(), Value::from(id));

        let once = url::resolve(&template, Some(&params));
        let twice = url::resolve(&once, Some(&params));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_success_statuses_resolve(status in 200u16..400) {
        let config = merge(&ClientDefaults::default(), CallConfig::new("/s"));
        let resolved = classify_status(&config, response(Some(status)));
        prop_assert!(resolved.is_ok());
        prop_assert_eq!(resolved.unwrap().status, Some(status));
    }

    #[test]
    fn prop_error_statuses_reject_with_response(status in 400u16..600) {
        let config = merge(&ClientDefaults::default(), CallConfig::new("/s"));
        let err = classify_status(&config, response(Some(status))).unwrap_err();
        prop_assert_eq!(err.status_code(), Some(status));
    }

    #[test]
    fn prop_informational_statuses_are_failures(status in 100u16..200) {
        prop_assert!(!is_success_status(Some(status)));
    }
}
