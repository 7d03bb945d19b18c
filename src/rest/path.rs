//! Path building for resource URLs.
//!
//! Every path is relative to the configured endpoint and has the shape
//! `{segment}[/{id}[/{command}]]`. Each component is percent-encoded.
//!
//! # Example
//!
//! ```rust
//! use pipedrive_api::rest::build_path;
//!
//! assert_eq!(build_path("persons", None, None), "persons");
//! assert_eq!(build_path("persons", Some(12), None), "persons/12");
//! assert_eq!(build_path("persons", Some(12), Some("deals")), "persons/12/deals");
//! assert_eq!(build_path("persons", None, Some("find")), "persons/find");
//! ```

use urlencoding::encode;

/// Command segment of the search endpoint.
pub const FIND_COMMAND: &str = "find";

/// Command segment of the merge endpoint.
pub const MERGE_COMMAND: &str = "merge";

/// Builds a resource path from a segment, an optional record id and an
/// optional trailing command.
#[must_use]
pub fn build_path(segment: &str, id: Option<u64>, command: Option<&str>) -> String {
    let mut path = encode(segment.trim_matches('/')).into_owned();
    if let Some(id) = id {
        path.push('/');
        path.push_str(&id.to_string());
    }
    if let Some(command) = command {
        path.push('/');
        path.push_str(&encode(command.trim_matches('/')));
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_path_segment_only() {
        assert_eq!(build_path("dealFields", None, None), "dealFields");
    }

    #[test]
    fn test_build_path_with_id_and_command() {
        assert_eq!(build_path("deals", Some(7), Some(MERGE_COMMAND)), "deals/7/merge");
    }

    #[test]
    fn test_build_path_trims_slashes() {
        assert_eq!(build_path("/deals/", Some(7), Some("/files")), "deals/7/files");
    }

    #[test]
    fn test_build_path_encodes_components() {
        assert_eq!(build_path("a b", None, Some("c/d?")), "a%20b/c%2Fd%3F");
    }
}
