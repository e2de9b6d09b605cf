//! Endpoint URL construction.
//!
//! Every dynamic segment is percent-encoded exactly once here; callers pass
//! plain repository paths and never pre-encode them.

use super::Coordinates;

/// Versioned API prefix appended to the configured host.
pub const API_PREFIX: &str = "/api/v1";

/// Strip leading/trailing separators and collapse empty segments.
///
/// `"/folder//missing/testing.md"` becomes `"folder/missing/testing.md"`.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Percent-encode a repository path segment by segment, keeping `/` intact.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| urlencoding::encode(s).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// `{base}/api/v1/repos/{owner}/{repo}/{endpoint}` where `endpoint` is
/// already encoded.
pub fn repo_url(coords: &Coordinates, endpoint: &str) -> String {
    format!(
        "{}{}/repos/{}/{}/{}",
        coords.base_url.trim_end_matches('/'),
        API_PREFIX,
        urlencoding::encode(&coords.username),
        urlencoding::encode(&coords.repository),
        endpoint
    )
}

/// Append a query string; values are encoded, keys are trusted constants.
pub fn with_query(url: String, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return url;
    }
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", url, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(base: &str) -> Coordinates {
        Coordinates::new(base, "org name", "repo", "main")
    }

    #[test]
    fn normalize_strips_separators() {
        assert_eq!(normalize_path("/README.md"), "README.md");
        assert_eq!(
            normalize_path("/folder//missing/testing.md/"),
            "folder/missing/testing.md"
        );
        assert_eq!(normalize_path("/"), "");
    }

    #[test]
    fn encode_keeps_hierarchy_and_escapes_once() {
        assert_eq!(encode_path("a dir/b#c?.md"), "a%20dir/b%23c%3F.md");
        assert_eq!(encode_path("/x/100%.txt"), "x/100%25.txt");
    }

    #[test]
    fn repo_url_trims_trailing_slashes() {
        let url = repo_url(&coords("https://gitea.example.com///"), "contents/README.md");
        assert_eq!(
            url,
            "https://gitea.example.com/api/v1/repos/org%20name/repo/contents/README.md"
        );
    }

    #[test]
    fn with_query_encodes_values() {
        let url = with_query("http://h/x".into(), &[("ref", "feature/a b"), ("page", "2")]);
        assert_eq!(url, "http://h/x?ref=feature%2Fa%20b&page=2");
        assert_eq!(with_query("http://h/x".into(), &[]), "http://h/x");
    }
}
