use std::io::{self, Write};

use serde_json::{json, Value};

/// Stdout side of the engine protocol: one JSON-RPC object per line, flushed
/// per message. Logging goes to stderr, so stdout stays machine-parseable.
///
/// Notifications raised while a request is being handled (sandbox console
/// mirroring, selection events) are deferred and written after the reply, so
/// a client reading sequentially always sees its reply before any fallout
/// from the request it just made.
pub struct EngineTransport {
    deferred: Vec<Value>,
}

impl Default for EngineTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineTransport {
    pub fn new() -> Self {
        Self {
            deferred: Vec::new(),
        }
    }

    pub fn reply(&mut self, id: u64, result: Value) {
        self.write_frame(&reply_frame(id, result));
        self.flush_deferred();
    }

    pub fn reply_error(
        &mut self,
        id: u64,
        code: i32,
        message: impl Into<String>,
        data: Option<Value>,
    ) {
        self.write_frame(&error_frame(id, code, &message.into(), data));
        self.flush_deferred();
    }

    /// Queue a notification to go out right after the current reply.
    pub fn defer_notification(&mut self, method: &str, params: Value) {
        self.deferred.push(notification_frame(method, params));
    }

    fn flush_deferred(&mut self) {
        for frame in std::mem::take(&mut self.deferred) {
            self.write_frame(&frame);
        }
    }

    fn write_frame(&self, frame: &Value) {
        // Value's Display is compact single-line JSON, which is exactly the
        // NDJSON framing the protocol wants.
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{frame}");
        let _ = stdout.flush();
    }
}

fn reply_frame(id: u64, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn error_frame(id: u64, code: i32, message: &str, data: Option<Value>) -> Value {
    let mut error = json!({ "code": code, "message": message });
    if let Some(data) = data {
        error["data"] = data;
    }
    json!({ "jsonrpc": "2.0", "id": id, "error": error })
}

fn notification_frame(method: &str, params: Value) -> Value {
    json!({ "jsonrpc": "2.0", "method": method, "params": params })
}
