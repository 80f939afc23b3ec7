//! Name matching for match queries.
//!
//! Terms containing glob metacharacters are compiled with `globset`; plain
//! terms match as case-insensitive substrings.

use globset::{GlobBuilder, GlobMatcher};

#[derive(Debug, Clone)]
enum Term {
    Glob(GlobMatcher),
    Contains(String),
}

#[derive(Debug, Clone)]
pub struct NameMatcher {
    terms: Vec<Term>,
}

fn has_glob_meta(term: &str) -> bool {
    term.contains(['*', '?', '[', '{'])
}

impl NameMatcher {
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Result<Self, globset::Error> {
        let mut compiled = Vec::with_capacity(terms.len());
        for term in terms {
            let term = term.as_ref();
            if has_glob_meta(term) {
                let glob = GlobBuilder::new(term).case_insensitive(true).build()?;
                compiled.push(Term::Glob(glob.compile_matcher()));
            } else {
                compiled.push(Term::Contains(term.to_lowercase()));
            }
        }
        Ok(Self { terms: compiled })
    }

    /// True when any term matches. An empty matcher matches every name.
    pub fn is_match(&self, name: &str) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        let lowered = name.to_lowercase();
        self.terms.iter().any(|term| match term {
            Term::Glob(glob) => glob.is_match(name),
            Term::Contains(needle) => lowered.contains(needle.as_str()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_is_case_insensitive() {
        let m = NameMatcher::new(&["Report"]).unwrap();
        assert!(m.is_match("q3-report.pdf"));
        assert!(!m.is_match("notes.txt"));
    }

    #[test]
    fn test_glob_terms() {
        let m = NameMatcher::new(&["*.log", "tmp?"]).unwrap();
        assert!(m.is_match("server.LOG"));
        assert!(m.is_match("tmp1"));
        assert!(!m.is_match("tmp12"));
    }

    #[test]
    fn test_empty_matches_all() {
        let m = NameMatcher::new::<&str>(&[]).unwrap();
        assert!(m.is_match("anything"));
    }

    #[test]
    fn test_invalid_glob() {
        assert!(NameMatcher::new(&["[a"]).is_err());
    }
}
