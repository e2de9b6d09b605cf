//! JSON payloads and helpers shared by the mock-server tests.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use httpmock::MockServer;
use serde_json::{Value, json};

use super::{Client, Coordinates};

pub const OWNER: &str = "owner";
pub const REPO: &str = "repo";
pub const BRANCH: &str = "main";

pub fn client_for(server: &MockServer) -> Client {
    Client::new(Coordinates::new(server.base_url(), OWNER, REPO, BRANCH)).unwrap()
}

pub fn api_path(endpoint: &str) -> String {
    format!("/api/v1/repos/{}/{}/{}", OWNER, REPO, endpoint)
}

pub fn file_json(path: &str, sha: &str, content: &[u8]) -> Value {
    let name = path.rsplit('/').next().unwrap_or(path);
    json!({
        "name": name,
        "path": path,
        "sha": sha,
        "last_commit_sha": "c0ffee",
        "type": "file",
        "size": content.len(),
        "encoding": "base64",
        "content": STANDARD.encode(content),
        "download_url": format!("http://localhost/{}", path),
    })
}

pub fn write_response_json(path: &str, sha: &str) -> Value {
    let mut content = file_json(path, sha, b"");
    content["content"] = Value::Null;
    json!({
        "content": content,
        "commit": {"sha": "c0ffee", "message": "commit"},
        "verification": null
    })
}

/// `entries` are `(path, git object type)` pairs.
pub fn tree_json(entries: &[(&str, &str)]) -> Value {
    let tree: Vec<Value> = entries
        .iter()
        .map(|(path, kind)| {
            let mode = if *kind == "tree" { "040000" } else { "100644" };
            json!({"path": path, "mode": mode, "type": kind, "sha": format!("sha-{}", path), "size": 10})
        })
        .collect();
    json!({
        "sha": "root",
        "url": "http://localhost/tree",
        "tree": tree,
        "truncated": false,
        "page": 1,
        "total_count": entries.len()
    })
}

pub fn commit_json(sha: &str, date: &str) -> Value {
    json!({
        "sha": sha,
        "url": format!("http://localhost/commits/{}", sha),
        "html_url": format!("http://localhost/commit/{}", sha),
        "commit": {
            "message": "Update README.md",
            "author": {"name": "dev", "email": "dev@example.com", "date": date},
            "committer": {"name": "dev", "email": "dev@example.com", "date": date}
        }
    })
}
