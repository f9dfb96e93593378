use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{InboxError, Result};

static STORAGE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Za-z_-]{1,128}$").expect("valid regex"));

/// Checks that an id can be used as a file stem without escaping its directory.
pub fn validate_storage_id(kind: &'static str, id: &str) -> Result<()> {
    if STORAGE_ID_RE.is_match(id) {
        Ok(())
    } else {
        Err(InboxError::InvalidId {
            kind,
            id: id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::validate_storage_id;

    #[test]
    fn accepts_prefixed_ids() {
        validate_storage_id("thread", "th_01HQZ3KX").expect("valid");
        validate_storage_id("notification", "in-42").expect("valid");
    }

    #[test]
    fn rejects_path_like_ids() {
        for id in ["", "../secrets", "a/b", "th 1", "th.json"] {
            let err = validate_storage_id("thread", id).expect_err("must fail");
            assert!(format!("{err}").contains("invalid thread id"));
        }
    }

    #[test]
    fn rejects_overlong_ids() {
        let id = "a".repeat(129);
        assert!(validate_storage_id("room", &id).is_err());
    }
}
