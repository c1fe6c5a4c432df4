use waymark::{build_href, Error, HrefParts, Params, QueryObject, QueryRead, Route, Router};

use serde_json::json;

fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|&(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
}

fn query(pairs: &[(&str, serde_json::Value)]) -> QueryObject {
    pairs
        .iter()
        .cloned()
        .map(|(k, v)| (k.to_owned(), v))
        .collect()
}

#[test]
fn missing_params_are_reported() {
    let route: Route<()> = Route::parse("@[handle]", "Profile").unwrap();
    let p = Params::new();
    let q = QueryObject::new();

    let err = build_href(&route, HrefParts::new(&p, &q)).unwrap_err();
    match err {
        Error::MissingParams {
            pattern,
            missing,
            provided,
            expected,
        } => {
            assert_eq!(pattern, "@[handle]");
            assert_eq!(missing, ["handle"]);
            assert!(provided.is_empty());
            assert_eq!(expected, ["handle"]);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn extra_params_are_tolerated() {
    let route: Route<()> = Route::parse("users/[id]", "User").unwrap();
    let p = params(&[("id", "42"), ("stale", "x")]);
    let q = QueryObject::new();
    assert_eq!(build_href(&route, HrefParts::new(&p, &q)).unwrap(), "/users/42");
}

#[test]
fn repeated_tokens_substitute_everywhere() {
    let route: Route<()> = Route::parse("report/[year]/summary-[year]", "Summary").unwrap();
    let p = params(&[("year", "2025")]);
    let q = QueryObject::new();
    assert_eq!(
        build_href(&route, HrefParts::new(&p, &q)).unwrap(),
        "/report/2025/summary-2025"
    );
}

#[test]
fn substituted_values_are_encoded() {
    let route: Route<()> = Route::parse("tags/[name]", "Tag").unwrap();
    let p = params(&[("name", "c# & more")]);
    let q = QueryObject::new();
    assert_eq!(
        build_href(&route, HrefParts::new(&p, &q)).unwrap(),
        "/tags/c%23%20%26%20more"
    );
}

#[test]
fn default_serialization_sorts_and_dedups_arrays() {
    let route: Route<()> = Route::parse("search", "Search").unwrap();
    let q = query(&[
        ("tag", json!(["beta", "alpha", "alpha", "charlie"])),
        ("page", json!(2)),
        ("skip", json!(null)),
    ]);
    let p = Params::new();
    assert_eq!(
        build_href(&route, HrefParts::new(&p, &q)).unwrap(),
        "/search?tag=alpha&tag=beta&tag=charlie&page=2"
    );
}

#[test]
fn whitespace_serializer_result_means_no_query() {
    let route: Route<()> = Route::parse("a", "A")
        .unwrap()
        .with_serializer(|_query, _args| "   ".to_owned());
    let q = query(&[("k", json!("v"))]);
    let p = Params::new();
    assert_eq!(build_href(&route, HrefParts::new(&p, &q)).unwrap(), "/a");
}

#[test]
fn custom_serializer_output_is_verbatim() {
    let route: Route<()> = Route::parse("files/[dir]", "Files")
        .unwrap()
        .with_serializer(|query, args| {
            let dir = args.params.get("dir").cloned().unwrap_or_default();
            let first = args.query_params.value("sort").unwrap_or("none");
            format!(" raw=custom&dir={}&sort={}&n={} ", dir, first, query.len())
        });
    let p = params(&[("dir", "src")]);
    // the synthetic reader keeps arrival order, it does not sort
    let q = query(&[("sort", json!(["size", "name"])), ("x", json!(1))]);
    assert_eq!(
        build_href(&route, HrefParts::new(&p, &q)).unwrap(),
        "/files/src?raw=custom&dir=src&sort=size&n=2"
    );
}

#[test]
fn custom_encoder_output_is_still_made_safe() {
    let route: Route<()> = Route::parse("a", "A")
        .unwrap()
        .with_encoder(|value| format!("v&{}", waymark::safe_string(value)));
    let q = query(&[("k", json!("x y"))]);
    let p = Params::new();
    assert_eq!(
        build_href(&route, HrefParts::new(&p, &q)).unwrap(),
        "/a?k=v%26x%20y"
    );
}

#[test]
fn stray_percents_never_reach_the_url() {
    let route: Route<()> = Route::parse("a", "A").unwrap();
    let q = query(&[("discount", json!("100%")), ("kept", json!("a%20b"))]);
    let p = Params::new();
    assert_eq!(
        build_href(&route, HrefParts::new(&p, &q)).unwrap(),
        "/a?discount=100%25&kept=a%20b"
    );
}

#[test]
fn fragments_are_encoded_once() {
    let route: Route<()> = Route::parse("a", "A").unwrap();
    let p = Params::new();
    let q = QueryObject::new();

    let mut parts = HrefParts::new(&p, &q);
    parts.fragment = Some("my section");
    assert_eq!(build_href(&route, parts).unwrap(), "/a#my%20section");

    let mut parts = HrefParts::new(&p, &q);
    parts.fragment = Some("my%20section");
    assert_eq!(build_href(&route, parts).unwrap(), "/a#my%20section");
}

#[test]
fn match_href_rebuilds_with_fragment() {
    let router: Router<()> = Router::new(vec![Route::parse("users/[id]", "User").unwrap()]);
    let found = router.find("/users/42#bio").unwrap();
    assert_eq!(found.href(None).unwrap(), "/users/42#bio");
}

#[test]
fn custom_href_hook_wins() {
    let route: Route<()> = Route::parse("legacy", "Legacy")
        .unwrap()
        .with_href(|_args| "/moved/here".to_owned());
    let router = Router::new(vec![route]);
    let found = router.find("/legacy").unwrap();
    assert_eq!(found.href(None).unwrap(), "/moved/here");
}
