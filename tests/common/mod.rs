//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Builder for test VS Code user directory structures
pub struct UserDirBuilder {
    temp_dir: TempDir,
}

impl UserDirBuilder {
    /// Create a new builder with an empty user directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Add a session under `workspaceStorage/<workspace_id>/chatSessions/<name>`
    pub fn with_workspace_session(self, workspace_id: &str, name: &str, content: &str) -> Self {
        let dir = self.temp_dir.path().join("workspaceStorage").join(workspace_id).join("chatSessions");
        write_file(&dir, name, content);
        self
    }

    /// Add a session under `globalStorage/emptyWindowChatSessions/<name>`
    pub fn with_empty_window_session(self, name: &str, content: &str) -> Self {
        let dir = self.temp_dir.path().join("globalStorage").join("emptyWindowChatSessions");
        write_file(&dir, name, content);
        self
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for UserDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    fs::create_dir_all(dir).expect("Failed to create sessions dir");
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write session file");
    path
}

/// Builder for one request of a chat session document
pub struct RequestBuilder {
    prompt: String,
    replies: Vec<String>,
    timestamp: Option<i64>,
    padding: usize,
}

impl RequestBuilder {
    pub fn new(prompt: &str) -> Self {
        Self { prompt: prompt.to_string(), replies: Vec::new(), timestamp: None, padding: 0 }
    }

    pub fn reply(mut self, text: &str) -> Self {
        self.replies.push(text.to_string());
        self
    }

    pub fn timestamp(mut self, millis: i64) -> Self {
        self.timestamp = Some(millis);
        self
    }

    /// Attach an unrelated metadata field of roughly `bytes` bytes
    pub fn padding(mut self, bytes: usize) -> Self {
        self.padding = bytes;
        self
    }

    pub fn to_json(&self) -> String {
        let mut request = serde_json::json!({
            "requestId": "request_0",
            "message": { "text": self.prompt, "parts": [{ "kind": "text", "text": self.prompt }] },
            "response": self
                .replies
                .iter()
                .map(|r| serde_json::json!({ "value": r, "supportThemeIcons": false }))
                .collect::<Vec<_>>(),
        });
        if let Some(ts) = self.timestamp {
            request["timestamp"] = ts.into();
        }
        if self.padding > 0 {
            request["result"] = serde_json::json!({
                "metadata": { "blob": "x".repeat(self.padding), "nested": [[1, 2], {"a": null}] }
            });
        }
        request.to_string()
    }
}

/// Serialize a whole session document around the given requests
pub fn session_json(requests: &[RequestBuilder]) -> String {
    let requests = requests.iter().map(RequestBuilder::to_json).collect::<Vec<_>>().join(",");
    format!(
        r#"{{"version":3,"requesterUsername":"tester","responderUsername":"GitHub Copilot","requests":[{}],"sessionId":"abc"}}"#,
        requests
    )
}
