//! File names for report output

use regex::Regex;
use std::sync::OnceLock;

/// Characters not allowed in file names on common filesystems
fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).expect("Invalid file name regex"))
}

/// Turn a data type, tag or set name into a usable file name
///
/// Unsafe characters become `_`; an empty result becomes `_`.
pub fn safe_file_name(name: &str) -> String {
    let cleaned = unsafe_chars().replace_all(name.trim(), "_");
    let cleaned = cleaned.trim_end_matches(['.', ' ']);
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned.to_string()
    }
}
