//! Shared helpers for the integration suites: fixture route trees in a
//! tempdir and a registry of tagging middleware/handlers that record their
//! invocation order.
#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use fsroutes::{HandlerRegistry, HandlerResponse, Middleware};
use serde_json::json;

/// Write a fixture file under `root`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
}

/// Shared invocation log for tagging middleware and handlers.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn logged(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

struct Tag {
    name: String,
    log: CallLog,
}

impl Middleware for Tag {
    fn before(
        &self,
        _req: &fsroutes::HandlerRequest,
    ) -> Option<HandlerResponse> {
        self.log.lock().unwrap().push(self.name.clone());
        None
    }
}

/// Register a middleware that appends its name to the log when invoked.
pub fn register_tag(registry: &mut HandlerRegistry, name: &str, log: &CallLog) {
    registry.register_middleware(
        name,
        Arc::new(Tag {
            name: name.to_string(),
            log: log.clone(),
        }),
    );
}

/// Register a handler returning `200 {"from": <name>}` and logging its name.
pub fn register_handler(registry: &mut HandlerRegistry, name: &str, log: &CallLog) {
    let name = name.to_string();
    let log = log.clone();
    registry.register_handler_fn(name.clone(), move |_req| {
        log.lock().unwrap().push(name.clone());
        Ok(HandlerResponse::json(200, json!({ "from": name })))
    });
}
