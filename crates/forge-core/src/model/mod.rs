//! Model records, set algebra, and on-disk presence checks.

pub mod disk;
mod types;

pub use types::{dedupe_names, ModelOrigin, ModelRecord, ModelSet};

use regex::Regex;
use std::sync::OnceLock;

/// Whether a user-supplied identifier has the `owner/repo` shape the
/// catalog and the downloader expect.
pub fn is_valid_model_name(name: &str) -> bool {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    let re = NAME_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*/[A-Za-z0-9._-]+$").expect("valid regex")
    });
    re.is_match(name)
}
