//! Segment-aware path-pattern matcher used by route resolution.
//!
//! Patterns are split on `/`. `*` matches exactly one non-empty segment;
//! `**` matches any number of trailing segments (including zero). This
//! upgrades the original implementation's `fnmatch`-based matching (which
//! treats `/` as an ordinary character) to something safe for URL paths.

/// Returns true if `path` matches `pattern` under the segment rules above.
pub fn matches(pattern: &str, path: &str) -> bool {
    let pattern_segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    matches_segments(&pattern_segments, &path_segments)
}

fn matches_segments(pattern: &[&str], path: &[&str]) -> bool {
    match pattern.first() {
        None => path.is_empty(),
        Some(&"**") => {
            // `**` may consume zero or more trailing segments; try every split.
            (0..=path.len()).any(|take| matches_segments(&pattern[1..], &path[take..]))
        }
        Some(&"*") => !path.is_empty() && matches_segments(&pattern[1..], &path[1..]),
        Some(&segment) => {
            !path.is_empty() && path[0] == segment && matches_segments(&pattern[1..], &path[1..])
        }
    }
}
