//! Property tests for reverse routing.
//!
//! For templates without `*`, generating a URL and looking it up again must
//! yield the same route with the same parameter values.

use proptest::prelude::*;
use waypost_router::{HandlerRef, HttpMethod, RouteDefinition, Router};

fn router() -> Router {
    let router = Router::new();
    router
        .bind(
            "props",
            vec![
                RouteDefinition::new(
                    HttpMethod::Get,
                    "/items/{id}/{slug}",
                    HandlerRef::new("props", "item"),
                ),
                RouteDefinition::new(
                    HttpMethod::Get,
                    "/files/{path+}",
                    HandlerRef::new("props", "file"),
                ),
                RouteDefinition::new(
                    HttpMethod::Put,
                    "/users/{name}",
                    HandlerRef::new("props", "user"),
                ),
            ],
        )
        .unwrap();
    router
}

// Strategy: any non-empty value, including '/', '%', '?', spaces and non-ASCII
fn arb_value() -> impl Strategy<Value = String> {
    prop::string::string_regex(".{1,12}").unwrap()
}

// Strategy: a slash-separated path of non-empty segments
fn arb_rest() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::string::string_regex("[^/]{1,6}").unwrap(),
        1..5,
    )
    .prop_map(|segments| segments.join("/"))
}

proptest! {
    #[test]
    fn proptest_reverse_then_lookup_round_trips(id in arb_value(), slug in arb_value()) {
        let router = router();
        let handler = HandlerRef::new("props", "item");
        let url = router
            .reverse_url_pairs(&handler, &[("id", id.as_str()), ("slug", slug.as_str())])
            .unwrap();

        let m = router.lookup(HttpMethod::Get, &url);
        prop_assert_eq!(m.handler(), Some(&handler));
        prop_assert_eq!(m.param("id"), Some(id.as_str()));
        prop_assert_eq!(m.param("slug"), Some(slug.as_str()));
    }

    #[test]
    fn proptest_rest_parameter_round_trips(path in arb_rest()) {
        let router = router();
        let handler = HandlerRef::new("props", "file");
        let url = router.reverse_url_pairs(&handler, &[("path", path.as_str())]).unwrap();

        let m = router.lookup(HttpMethod::Get, &url);
        prop_assert_eq!(m.handler(), Some(&handler));
        prop_assert_eq!(m.param("path"), Some(path.as_str()));
    }

    #[test]
    fn proptest_generated_urls_have_no_raw_reserved_chars(name in arb_value()) {
        let router = router();
        let url = router
            .reverse_url_pairs(&HandlerRef::new("props", "user"), &[("name", name.as_str())])
            .unwrap();
        let tail = url.strip_prefix("/users/").unwrap();
        prop_assert!(!tail.contains('/'));
        prop_assert!(!tail.contains('?'));
        prop_assert!(!tail.contains('#'));
        prop_assert!(!tail.contains(' '));
    }

    #[test]
    fn proptest_lookup_never_panics(path in ".{0,40}") {
        let router = router();
        let _ = router.lookup(HttpMethod::Get, &path);
        let _ = router.allowed_methods(&path);
    }
}
