//! Walks a handful of requests through every dispatch outcome.
//!
//! Run with: `cargo run --example dispatch`

use http::Method;
use radixmux::{Dispatch, Dispatcher};

fn main() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.get("/", "index");
    dispatcher.get("/hello/:name", "hello");
    dispatcher.get("/files/*filepath", "files");
    dispatcher.post("/hello/:name", "update");

    let requests = [
        (Method::GET, "/"),
        (Method::GET, "/hello/gopher"),
        (Method::GET, "/hello/gopher/"),
        (Method::GET, "/files"),
        (Method::GET, "/FILES/readme.md"),
        (Method::GET, "/..//hello/gopher"),
        (Method::PUT, "/hello/gopher"),
        (Method::OPTIONS, "/hello/gopher"),
        (Method::GET, "/missing"),
    ];

    for (method, path) in requests {
        match dispatcher.dispatch(&method, path) {
            Dispatch::Handler { handler, params } => {
                let captured: Vec<String> = params
                    .iter()
                    .map(|p| format!("{}={}", p.key, p.value))
                    .collect();
                println!("{method} {path} -> {handler} [{}]", captured.join(", "));
            }
            Dispatch::Redirect { location, code } => {
                println!("{method} {path} -> {} to {location}", code.as_u16());
            }
            Dispatch::Options { allow } => {
                println!("{method} {path} -> 204, Allow: {allow}");
            }
            Dispatch::MethodNotAllowed { allow } => {
                println!("{method} {path} -> 405, Allow: {allow}");
            }
            Dispatch::NotFound => {
                println!("{method} {path} -> 404");
            }
        }
    }
}
