//! Ant-style path matching for security zones and hook path rules.
//!
//! - `**` matches zero or more path segments
//! - `*` matches one whole segment, or any run of characters inside a segment
//! - `?` matches exactly one character inside a segment
//!
//! Empty segments are ignored on both sides, so `/api/idm/` and `/api//idm`
//! are the same path as `/api/idm`.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("path pattern must not be empty")]
    Empty,
    #[error("path pattern must start with '/': {0}")]
    NotAbsolute(String),
    #[error("'**' must be a whole segment in pattern {pattern} (found {segment})")]
    MixedDoubleWildcard { pattern: String, segment: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    AnyDepth,
    Literal(String),
    Glob(Vec<char>),
}

/// A compiled pattern. Compile once at startup, match per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PatternError::Empty);
        }
        if !trimmed.starts_with('/') {
            return Err(PatternError::NotAbsolute(trimmed.to_string()));
        }

        let mut segments = Vec::new();
        for seg in split_segments(trimmed) {
            if seg == "**" {
                // `/**/**` is the same as `/**`
                if segments.last() != Some(&Segment::AnyDepth) {
                    segments.push(Segment::AnyDepth);
                }
            } else if seg.contains("**") {
                return Err(PatternError::MixedDoubleWildcard {
                    pattern: trimmed.to_string(),
                    segment: seg.to_string(),
                });
            } else if seg.contains(['*', '?']) {
                segments.push(Segment::Glob(seg.chars().collect()));
            } else {
                segments.push(Segment::Literal(seg.to_string()));
            }
        }

        Ok(Self { segments })
    }

    pub fn matches(&self, path: &str) -> bool {
        let path: Vec<&str> = split_segments(path).collect();
        match_segments(&self.segments, &path)
    }
}

/// One-shot convenience form. A malformed pattern never matches; callers that
/// need to surface the error compile with [`PathPattern::parse`] instead.
pub fn matches(path: &str, pattern: &str) -> bool {
    PathPattern::parse(pattern)
        .map(|p| p.matches(path))
        .unwrap_or(false)
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

// Row-by-row over pattern segments: `reachable[j]` holds when the pattern
// segments consumed so far match exactly `path[..j]`. O(pattern x path).
fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    let mut reachable = vec![false; path.len() + 1];
    reachable[0] = true;

    for segment in pattern {
        let mut next = vec![false; path.len() + 1];
        match segment {
            Segment::AnyDepth => {
                let mut seen = false;
                for (j, slot) in next.iter_mut().enumerate() {
                    seen |= reachable[j];
                    *slot = seen;
                }
            }
            _ => {
                for j in 1..=path.len() {
                    next[j] = reachable[j - 1] && segment_matches(segment, path[j - 1]);
                }
            }
        }
        if !next.contains(&true) {
            return false;
        }
        reachable = next;
    }

    reachable[path.len()]
}

fn segment_matches(pattern: &Segment, segment: &str) -> bool {
    match pattern {
        Segment::AnyDepth => true,
        Segment::Literal(lit) => lit == segment,
        Segment::Glob(glob) => {
            let text: Vec<char> = segment.chars().collect();
            glob_matches(glob, &text)
        }
    }
}

// Greedy wildcard match with single-star backtracking.
fn glob_matches(glob: &[char], text: &[char]) -> bool {
    let (mut g, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        if g < glob.len() && (glob[g] == '?' || glob[g] == text[t]) {
            g += 1;
            t += 1;
        } else if g < glob.len() && glob[g] == '*' {
            star = Some((g, t));
            g += 1;
        } else if let Some((sg, st)) = star {
            g = sg + 1;
            t = st + 1;
            star = Some((sg, st + 1));
        } else {
            return false;
        }
    }

    glob[g..].iter().all(|c| *c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_wildcard_matches_any_depth() {
        assert!(matches("/api/idm/users", "/api/idm/**"));
        assert!(matches("/api/idm/users/kermit/privileges", "/api/idm/**"));
        assert!(matches("/api/idm", "/api/idm/**"));
        assert!(matches("/api/idm/", "/api/idm/**"));
        assert!(!matches("/api/idmx/users", "/api/idm/**"));
        assert!(!matches("/api/admin/users", "/api/idm/**"));
    }

    #[test]
    fn double_wildcard_in_the_middle() {
        assert!(matches("/api/a/b/c/users", "/api/**/users"));
        assert!(matches("/api/users", "/api/**/users"));
        assert!(!matches("/api/a/b/groups", "/api/**/users"));
    }

    #[test]
    fn single_wildcard_matches_exactly_one_segment() {
        assert!(matches("/api/idm/users", "/api/*/users"));
        assert!(!matches("/api/users", "/api/*/users"));
        assert!(!matches("/api/a/b/users", "/api/*/users"));
    }

    #[test]
    fn wildcards_inside_a_segment() {
        assert!(matches("/files/report.json", "/files/*.json"));
        assert!(!matches("/files/report.xml", "/files/*.json"));
        assert!(matches("/v1/users", "/v?/users"));
        assert!(!matches("/v10/users", "/v?/users"));
    }

    #[test]
    fn literal_patterns_ignore_empty_segments() {
        assert!(matches("/health", "/health"));
        assert!(matches("//health/", "/health"));
        assert!(!matches("/health/deep", "/health"));
    }

    #[test]
    fn many_double_wildcards_stay_linear_in_path_length() {
        let pattern = PathPattern::parse("/**/a/**/a/**/a/**/b").unwrap();
        let long = "/a".repeat(400);

        let started = std::time::Instant::now();
        assert!(!pattern.matches(&long));
        assert!(pattern.matches(&format!("{long}/b")));
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn malformed_patterns_are_rejected_at_parse_time() {
        assert_eq!(PathPattern::parse("   "), Err(PatternError::Empty));
        assert!(matches!(
            PathPattern::parse("api/idm/**"),
            Err(PatternError::NotAbsolute(_))
        ));
        assert!(matches!(
            PathPattern::parse("/api/idm**"),
            Err(PatternError::MixedDoubleWildcard { .. })
        ));
        assert!(!matches("/api/idm", "/api/idm**"));
    }
}
