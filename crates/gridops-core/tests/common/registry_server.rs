//! Stateful fake of the registry REST API on top of `http_server`.
//!
//! Supports token auth, RSE listing, and distance get/add/update. Add on an
//! existing pair answers 409 with `ExceptionClass: Duplicate`.

use super::http_server::{self, Request, Response, TestServer};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const TOKEN: &str = "root-/CN=op-unknown-0123456789abcdef";

#[derive(Debug, Default)]
pub struct RegistryState {
    pub rses: Vec<String>,
    pub distances: HashMap<(String, String), i64>,
    /// When true, `/auth/x509_proxy` answers 401.
    pub reject_auth: bool,
}

pub struct FakeRegistry {
    pub server: TestServer,
    pub state: Arc<Mutex<RegistryState>>,
}

impl FakeRegistry {
    pub fn distance(&self, src: &str, dst: &str) -> Option<i64> {
        self.state
            .lock()
            .unwrap()
            .distances
            .get(&(src.to_string(), dst.to_string()))
            .copied()
    }
}

pub fn start(state: RegistryState) -> FakeRegistry {
    let state = Arc::new(Mutex::new(state));
    let shared = Arc::clone(&state);
    let server = http_server::start(move |req| handle(&mut shared.lock().unwrap(), req));
    FakeRegistry { server, state }
}

fn distance_of(body: &str) -> Option<i64> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("distance")?.as_i64()
}

fn handle(state: &mut RegistryState, req: &Request) -> Response {
    if req.path == "/auth/x509_proxy" {
        if state.reject_auth || req.header("X-Rucio-Account").is_none() {
            return Response::new(401, "")
                .with_header("ExceptionClass", "CannotAuthenticate")
                .with_header("ExceptionMessage", "Cannot authenticate with given credentials");
        }
        return Response::new(200, "").with_header("X-Rucio-Auth-Token", TOKEN);
    }

    if req.header("X-Rucio-Auth-Token") != Some(TOKEN) {
        return Response::new(401, "").with_header("ExceptionClass", "CannotAuthenticate");
    }

    if req.method == "GET" && req.path == "/rses/" {
        let body: String = state
            .rses
            .iter()
            .map(|r| format!("{{\"rse\": \"{}\", \"rse_type\": \"DISK\"}}\n", r))
            .collect();
        return Response::new(200, body);
    }

    let parts: Vec<&str> = req.path.trim_start_matches('/').split('/').collect();
    let (src, dst) = match parts.as_slice() {
        ["rses", src, "distances", dst] => (src.to_string(), dst.to_string()),
        _ => return Response::new(404, "no route"),
    };
    let key = (src.clone(), dst.clone());

    match req.method.as_str() {
        "GET" => match state.distances.get(&key) {
            Some(d) => Response::new(
                200,
                format!(
                    "[{{\"src_rse_id\": \"{}\", \"dest_rse_id\": \"{}\", \"distance\": {}}}]",
                    src, dst, d
                ),
            ),
            None => Response::new(200, "[]"),
        },
        "POST" => {
            if state.distances.contains_key(&key) {
                return Response::new(409, "")
                    .with_header("ExceptionClass", "Duplicate")
                    .with_header("ExceptionMessage", "Distance already exists!");
            }
            match distance_of(&req.body) {
                Some(d) => {
                    state.distances.insert(key, d);
                    Response::new(201, "Created")
                }
                None => Response::new(400, "bad body"),
            }
        }
        "PUT" => match (state.distances.get_mut(&key), distance_of(&req.body)) {
            (Some(slot), Some(d)) => {
                *slot = d;
                Response::new(200, "")
            }
            (None, _) => Response::new(404, "").with_header("ExceptionClass", "DistanceNotFound"),
            (_, None) => Response::new(400, "bad body"),
        },
        _ => Response::new(404, "no route"),
    }
}
