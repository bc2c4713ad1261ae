//! `.gitignore` text maintenance.
//!
//! Only appends; existing lines are never rewritten or reordered.

/// Comment written above every appended entry.
pub const GITIGNORE_COMMENT: &str = "# Added by gitlab-vault";

/// File name of the ignore file at the repository root.
pub const GITIGNORE_FILE: &str = ".gitignore";

/// Whether `entry` appears as its own (non-comment) line in `content`.
pub fn has_entry(content: &str, entry: &str) -> bool {
    let entry = entry.trim();
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .any(|line| line == entry)
}

/// Required entries not yet present in `content`, in request order.
pub fn missing_entries<'a>(content: &str, entries: &'a [String]) -> Vec<&'a str> {
    let mut missing: Vec<&str> = Vec::new();
    for entry in entries {
        let entry = entry.trim();
        if entry.is_empty() || has_entry(content, entry) || missing.contains(&entry) {
            continue;
        }
        missing.push(entry);
    }
    missing
}

/// Append `entries` to `content`.
///
/// Each entry gets one blank line, the marker comment and the entry itself.
/// The blank line is skipped for an empty file.
pub fn append_entries(content: &str, entries: &[&str]) -> String {
    let mut updated = content.to_string();

    for entry in entries {
        if !updated.is_empty() {
            if !updated.ends_with('\n') {
                updated.push('\n');
            }
            updated.push('\n');
        }
        updated.push_str(GITIGNORE_COMMENT);
        updated.push('\n');
        updated.push_str(entry);
        updated.push('\n');
    }

    updated
}

/// Content with every missing entry appended, or `None` when nothing is missing.
pub fn ensure_entries(content: &str, entries: &[String]) -> Option<String> {
    let missing = missing_entries(content, entries);
    if missing.is_empty() {
        None
    } else {
        Some(append_entries(content, &missing))
    }
}
