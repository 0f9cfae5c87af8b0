//! Dispatcher-level tests: per-method lookup, Allow computation, the full
//! dispatch decision (serve, redirect, OPTIONS, 405, 404) and registration
//! panics.

use http::Method;
use radixmux::{Dispatch, Dispatcher, InsertError};

fn redirect(outcome: Dispatch<'_, '_, &str>) -> (String, u16) {
    match outcome {
        Dispatch::Redirect { location, code } => (location, code.as_u16()),
        other => panic!("expected redirect, got {other:?}"),
    }
}

#[test]
fn test_lookup() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.get("/user/:name", "user");

    // wrong method
    let found = dispatcher.lookup(&Method::POST, "/user/gopher");
    assert_eq!(found.handler, None);
    assert!(!found.tsr);

    // exact match with captured parameter
    let found = dispatcher.lookup(&Method::GET, "/user/gopher");
    assert_eq!(found.handler, Some(&"user"));
    assert_eq!(found.params.get("name"), Some("gopher"));
    assert_eq!(found.params[0].key, "name");
    assert!(!found.tsr);

    // trailing slash: no exact match, handler offered for fallback
    let found = dispatcher.lookup(&Method::GET, "/user/gopher/");
    assert_eq!(found.handler, Some(&"user"));
    assert!(found.tsr);

    let found = dispatcher.lookup(&Method::GET, "/nope");
    assert_eq!(found.handler, None);
    assert!(!found.tsr);
}

#[test]
fn test_dispatch_serves_exact_match() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.get("/", "index");
    dispatcher.get("/blog/:category/:post", "post");

    match dispatcher.dispatch(&Method::GET, "/") {
        Dispatch::Handler { handler, params } => {
            assert_eq!(*handler, "index");
            assert!(params.is_empty());
        }
        other => panic!("expected handler, got {other:?}"),
    }

    match dispatcher.dispatch(&Method::GET, "/blog/go/request-routers") {
        Dispatch::Handler { handler, params } => {
            assert_eq!(*handler, "post");
            assert_eq!(params.get("category"), Some("go"));
            assert_eq!(params.get("post"), Some("request-routers"));
        }
        other => panic!("expected handler, got {other:?}"),
    }
}

#[test]
fn test_dispatch_trailing_slash_redirect() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.get("/path", "get");
    dispatcher.put("/path", "put");
    dispatcher.get("/dir/", "dir");

    // 301 for GET, slash stripped
    let (location, code) = redirect(dispatcher.dispatch(&Method::GET, "/path/"));
    assert_eq!(location, "/path");
    assert_eq!(code, 301);

    // 307 for other methods so the request can be replayed
    let (location, code) = redirect(dispatcher.dispatch(&Method::PUT, "/path/"));
    assert_eq!(location, "/path");
    assert_eq!(code, 307);

    // slash appended when the registered route carries one
    let (location, code) = redirect(dispatcher.dispatch(&Method::GET, "/dir"));
    assert_eq!(location, "/dir/");
    assert_eq!(code, 301);
}

#[test]
fn test_dispatch_serves_handler_when_redirect_disabled() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.redirect_trailing_slash = false;
    dispatcher.get("/path", "get");

    // the resolution still carries the handler, so it is served directly
    match dispatcher.dispatch(&Method::GET, "/path/") {
        Dispatch::Handler { handler, .. } => assert_eq!(*handler, "get"),
        other => panic!("expected handler, got {other:?}"),
    }
}

#[test]
fn test_dispatch_fixed_path_redirect() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.get("/path", "get");
    dispatcher.get("/dir/", "dir");

    // case-insensitive rediscovery
    let (location, code) = redirect(dispatcher.dispatch(&Method::GET, "/PATH"));
    assert_eq!(location, "/path");
    assert_eq!(code, 301);

    // superfluous path elements are cleaned before rediscovery
    let (location, _) = redirect(dispatcher.dispatch(&Method::GET, "/..//Path"));
    assert_eq!(location, "/path");

    // both fixes at once: cleanup, casing and the trailing slash
    let (location, _) = redirect(dispatcher.dispatch(&Method::GET, "/DIR"));
    assert_eq!(location, "/dir/");

    let mut strict = Dispatcher::new();
    strict.redirect_fixed_path = false;
    strict.get("/path", "get");
    assert!(matches!(
        strict.dispatch(&Method::GET, "/PATH"),
        Dispatch::NotFound
    ));
}

#[test]
fn test_dispatch_options() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.get("/path", "get");
    dispatcher.put("/path", "put");

    match dispatcher.dispatch(&Method::OPTIONS, "/path") {
        Dispatch::Options { allow } => assert_eq!(allow, "GET, PUT, OPTIONS"),
        other => panic!("expected options reply, got {other:?}"),
    }

    // server-wide probe
    match dispatcher.dispatch(&Method::OPTIONS, "*") {
        Dispatch::Options { allow } => assert_eq!(allow, "GET, PUT, OPTIONS"),
        other => panic!("expected options reply, got {other:?}"),
    }

    // no reply for paths that exist under no method
    assert!(matches!(
        dispatcher.dispatch(&Method::OPTIONS, "/nope"),
        Dispatch::NotFound
    ));

    // a registered OPTIONS handler takes priority over the automatic reply
    dispatcher.options("/path", "custom");
    match dispatcher.dispatch(&Method::OPTIONS, "/path") {
        Dispatch::Handler { handler, .. } => assert_eq!(*handler, "custom"),
        other => panic!("expected handler, got {other:?}"),
    }

    let mut quiet = Dispatcher::new();
    quiet.handle_options = false;
    quiet.get("/path", "get");
    assert!(matches!(
        quiet.dispatch(&Method::OPTIONS, "/path"),
        Dispatch::NotFound
    ));
}

#[test]
fn test_dispatch_method_not_allowed() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.get("/path", "get");
    dispatcher.put("/path", "put");
    dispatcher.delete("/path", "delete");

    match dispatcher.dispatch(&Method::POST, "/path") {
        Dispatch::MethodNotAllowed { allow } => {
            assert_eq!(allow, "DELETE, GET, PUT, OPTIONS");
        }
        other => panic!("expected 405, got {other:?}"),
    }

    let mut quiet = Dispatcher::new();
    quiet.handle_method_not_allowed = false;
    quiet.get("/path", "get");
    assert!(matches!(
        quiet.dispatch(&Method::POST, "/path"),
        Dispatch::NotFound
    ));
}

#[test]
fn test_dispatch_not_found() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.get("/a", "a");

    assert!(matches!(
        dispatcher.dispatch(&Method::GET, "/b"),
        Dispatch::NotFound
    ));

    // an empty dispatcher routes nothing
    let empty: Dispatcher<&str> = Dispatcher::new();
    assert!(matches!(
        empty.dispatch(&Method::GET, "/"),
        Dispatch::NotFound
    ));
}

#[test]
fn test_allowed_reports_other_methods() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.get("/path", "get");
    dispatcher.post("/other", "post");

    assert_eq!(dispatcher.allowed("/path", &Method::POST), "GET, OPTIONS");
    assert_eq!(dispatcher.allowed("/path", &Method::GET), "");
    assert_eq!(dispatcher.allowed("*", &Method::GET), "GET, POST, OPTIONS");
    assert_eq!(dispatcher.allowed("/nope", &Method::GET), "");
}

#[test]
fn test_catch_all_routes() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.get("/files/*filepath", "files");

    match dispatcher.dispatch(&Method::GET, "/files/a/b.txt") {
        Dispatch::Handler { handler, params } => {
            assert_eq!(*handler, "files");
            assert_eq!(params.get("filepath"), Some("/a/b.txt"));
        }
        other => panic!("expected handler, got {other:?}"),
    }

    // the bare prefix redirects into the catch-all
    let (location, code) = redirect(dispatcher.dispatch(&Method::GET, "/files"));
    assert_eq!(location, "/files/");
    assert_eq!(code, 301);
}

#[test]
fn test_try_handle_reports_conflicts() {
    let mut dispatcher = Dispatcher::new();

    let err = dispatcher
        .try_handle(Method::GET, "noslash", "h")
        .unwrap_err();
    assert!(matches!(err, InsertError::MissingLeadingSlash { .. }));
    assert!(err.to_string().contains("noslash"));

    dispatcher.get("/user/:name", "h");
    let err = dispatcher
        .try_handle(Method::GET, "/user/gopher", "h")
        .unwrap_err();
    assert!(matches!(err, InsertError::WildcardConflict { .. }));
    assert!(err.to_string().contains("/user/gopher"));

    let err = dispatcher
        .try_handle(Method::GET, "/user/:name", "h")
        .unwrap_err();
    assert!(matches!(err, InsertError::DuplicateHandler { .. }));
}

#[test]
#[should_panic(expected = "path must begin with '/'")]
fn test_handle_panics_without_leading_slash() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.get("invalid", "h");
}

#[test]
#[should_panic(expected = "a handler is already registered for path '/'")]
fn test_handle_panics_on_duplicate() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.get("/", "first");
    dispatcher.get("/", "second");
}

#[test]
#[should_panic(expected = "catch-all routes are only allowed at the end")]
fn test_handle_panics_on_inner_catch_all() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.get("/src/*filepath/x", "h");
}

#[test]
fn test_methods_use_separate_trees() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.get("/path", "get");
    dispatcher.post("/path", "post");
    dispatcher.patch("/path", "patch");
    dispatcher.head("/path", "head");

    for (method, expected) in [
        (Method::GET, "get"),
        (Method::POST, "post"),
        (Method::PATCH, "patch"),
        (Method::HEAD, "head"),
    ] {
        match dispatcher.dispatch(&method, "/path") {
            Dispatch::Handler { handler, .. } => assert_eq!(*handler, expected),
            other => panic!("expected {expected}, got {other:?}"),
        }
    }
}
