//! Path normalization for remote storage keys
//!
//! Every cache key is a canonical absolute path: `/` for the root, otherwise
//! `/`-joined non-empty segments with no `.` or `..` components. Normalizing
//! at the boundary means lookups, renames, and prefix scans can compare keys
//! directly.

use thiserror::Error;

/// Errors produced while normalizing a path
#[derive(Debug, Error)]
pub enum PathError {
    /// A `..` segment tried to climb above the root
    #[error("path is outside of the defined root: [{path}]")]
    OutsideRoot { path: String },
}

/// Normalize a path to its canonical absolute string form
///
/// Accepts `/` or `\` as separators. Empty and `.` components are dropped;
/// `..` pops the previous segment and fails with [`PathError::OutsideRoot`]
/// when there is nothing left to pop.
///
/// `""`, `"/"`, `"."` all normalize to `"/"`.
pub fn clean(path: &str) -> Result<String, PathError> {
    Ok(join(&segments(path)?))
}

/// Normalize an already-split segment sequence to canonical string form
///
/// Segments are taken as-is (no further splitting); empty, `.`, and literal
/// `/` components are dropped, `..` pops as in [`clean`].
pub fn clean_parts<S: AsRef<str>>(parts: &[S]) -> Result<String, PathError> {
    let original: Vec<&str> = parts.iter().map(|s| s.as_ref()).collect();
    let reduced = reduce(original.iter().copied(), &original.join("/"))?;
    Ok(join(&reduced))
}

/// Normalize a path to its canonical segment list (root = empty list)
pub fn segments(path: &str) -> Result<Vec<String>, PathError> {
    let normalized = path.replace('\\', "/");
    reduce(normalized.split('/'), path)
}

/// Number of segments in the canonical form of `path`
///
/// Used for listing-depth comparisons: a direct child of `/a` has exactly
/// one segment more than `/a`.
pub fn count_segments(path: &str) -> Result<usize, PathError> {
    Ok(segments(path)?.len())
}

/// Render a canonical segment list as an absolute path string
pub fn join<S: AsRef<str>>(segments: &[S]) -> String {
    let mut out = String::from("/");
    for (i, seg) in segments.iter().enumerate() {
        if i > 0 {
            out.push('/');
        }
        out.push_str(seg.as_ref());
    }
    out
}

/// Replace `search` with `replacement` in `subject`, only when `subject`
/// starts with `search`; otherwise `subject` is returned unchanged
///
/// Used to rewrite descendant keys when a subtree is renamed.
pub fn replace(search: &str, replacement: &str, subject: &str) -> String {
    match subject.strip_prefix(search) {
        Some(rest) => format!("{}{}", replacement, rest),
        None => subject.to_string(),
    }
}

/// Apply the segment-stack reduction shared by string and pre-split inputs
fn reduce<'a, I>(parts: I, original: &str) -> Result<Vec<String>, PathError>
where
    I: Iterator<Item = &'a str>,
{
    let mut stack: Vec<String> = Vec::new();
    for part in parts {
        match part {
            "" | "." | "/" => {}
            ".." => {
                if stack.pop().is_none() {
                    return Err(PathError::OutsideRoot {
                        path: original.to_string(),
                    });
                }
            }
            segment => stack.push(segment.to_string()),
        }
    }
    Ok(stack)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_basic() {
        assert_eq!(clean("a/b/c").unwrap(), "/a/b/c");
        assert_eq!(clean("/a/b/c").unwrap(), "/a/b/c");
        assert_eq!(clean("a//b///c").unwrap(), "/a/b/c");
        assert_eq!(clean("a/b/c/").unwrap(), "/a/b/c");
    }

    #[test]
    fn test_clean_root_forms() {
        assert_eq!(clean("").unwrap(), "/");
        assert_eq!(clean("/").unwrap(), "/");
        assert_eq!(clean(".").unwrap(), "/");
        assert_eq!(clean("//").unwrap(), "/");
    }

    #[test]
    fn test_clean_dot_segments() {
        assert_eq!(clean("/a/./b").unwrap(), "/a/b");
        assert_eq!(clean("./a/.").unwrap(), "/a");
    }

    #[test]
    fn test_clean_parent_segments() {
        assert_eq!(clean("/a/../b").unwrap(), "/b");
        assert_eq!(clean("/a/b/../..").unwrap(), "/");
        assert_eq!(clean("/a/b/../c").unwrap(), "/a/c");
    }

    #[test]
    fn test_clean_escaping_root_fails() {
        assert!(matches!(
            clean("/.."),
            Err(PathError::OutsideRoot { .. })
        ));
        assert!(matches!(
            clean("a/../.."),
            Err(PathError::OutsideRoot { .. })
        ));
    }

    #[test]
    fn test_clean_backslash_separators() {
        assert_eq!(clean("a\\b\\c").unwrap(), "/a/b/c");
        assert_eq!(clean("\\a\\.\\b").unwrap(), "/a/b");
    }

    #[test]
    fn test_clean_parts() {
        assert_eq!(clean_parts(&["a", "b"]).unwrap(), "/a/b");
        assert_eq!(clean_parts(&["/"]).unwrap(), "/");
        assert_eq!(clean_parts(&["a", "..", "b"]).unwrap(), "/b");
        assert_eq!(clean_parts::<&str>(&[]).unwrap(), "/");
        assert!(clean_parts(&[".."]).is_err());
    }

    #[test]
    fn test_segments() {
        assert_eq!(segments("/a/b").unwrap(), vec!["a", "b"]);
        assert!(segments("/").unwrap().is_empty());
    }

    #[test]
    fn test_count_segments() {
        assert_eq!(count_segments("/").unwrap(), 0);
        assert_eq!(count_segments("/a").unwrap(), 1);
        assert_eq!(count_segments("/a/b/c").unwrap(), 3);
        assert_eq!(count_segments("/a/../b").unwrap(), 1);
    }

    #[test]
    fn test_replace_prefix_only() {
        assert_eq!(replace("/a", "/b", "/a/x"), "/b/x");
        assert_eq!(replace("/a", "/b", "/c/a/x"), "/c/a/x");
        assert_eq!(replace("/a", "/b", "/a"), "/b");
    }
}
