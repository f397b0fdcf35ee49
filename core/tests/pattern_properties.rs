//! Property tests for route pattern matching and URL generation.

#![allow(clippy::unwrap_used)]

use pagecraft_core::pattern::RoutePattern;
use pagecraft_core::request::RouteParams;
use proptest::prelude::*;

/// A segment safe as both a literal and a value, including sub-delim
/// characters that are legal raw in a path segment.
fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9()!',]{0,7}"
}

/// A pattern shape: literals and parameter names, with a count of trailing
/// optionals. Parameter names are made unique by position suffix.
#[derive(Debug, Clone)]
struct PatternShape {
    literals: Vec<(usize, String)>,
    param_positions: Vec<usize>,
    optionals: usize,
}

fn pattern_shape() -> impl Strategy<Value = PatternShape> {
    (1usize..6, prop::collection::vec(any::<bool>(), 6), segment()).prop_map(
        |(len, is_param, base)| {
            let mut literals = Vec::new();
            let mut param_positions = Vec::new();
            for i in 0..len {
                if is_param[i] {
                    param_positions.push(i);
                } else {
                    literals.push((i, format!("{base}{i}")));
                }
            }
            // Trailing params may be optional.
            let trailing = param_positions
                .iter()
                .rev()
                .zip((0..len).rev())
                .take_while(|(p, i)| **p == *i)
                .count();
            PatternShape {
                literals,
                param_positions,
                optionals: trailing,
            }
        },
    )
}

fn render_pattern(shape: &PatternShape) -> String {
    let len = shape.literals.len() + shape.param_positions.len();
    let optional_from = len - shape.optionals;
    let mut out = String::new();
    for i in 0..len {
        out.push('/');
        if shape.param_positions.contains(&i) {
            out.push_str(&format!(":p{i}"));
            if i >= optional_from {
                out.push('?');
            }
        } else {
            let lit = shape
                .literals
                .iter()
                .find(|(pos, _)| *pos == i)
                .map(|(_, l)| l.as_str())
                .unwrap_or("x");
            out.push_str(lit);
        }
    }
    out
}

proptest! {
    /// Exact-count pathnames match, bind exactly the named segments, and
    /// re-substituting the bound values reconstructs the pathname.
    #[test]
    fn match_round_trips(shape in pattern_shape(), values in prop::collection::vec(segment(), 6)) {
        let pattern_str = render_pattern(&shape);
        let pattern = RoutePattern::parse(&pattern_str).unwrap();

        let len = shape.literals.len() + shape.param_positions.len();
        let mut pathname = String::new();
        for i in 0..len {
            pathname.push('/');
            if shape.param_positions.contains(&i) {
                pathname.push_str(&values[i]);
            } else {
                let lit = shape
                    .literals
                    .iter()
                    .find(|(pos, _)| *pos == i)
                    .map(|(_, l)| l.as_str())
                    .unwrap_or("x");
                pathname.push_str(lit);
            }
        }

        let params = pattern.matches(&pathname).unwrap();

        let mut expected: Vec<String> =
            shape.param_positions.iter().map(|i| format!("p{i}")).collect();
        expected.sort();
        let mut actual: Vec<String> = params.iter().map(|(k, _)| k.to_string()).collect();
        actual.sort();
        prop_assert_eq!(expected, actual);

        prop_assert_eq!(pattern.build_url(&params).unwrap(), pathname);
    }

    /// A pathname one segment shorter also matches when the pattern has a
    /// trailing optional, with the optional key absent.
    #[test]
    fn trailing_optional_may_be_omitted(
        prefix in segment(),
        value in segment(),
    ) {
        let pattern = RoutePattern::parse(&format!("/{prefix}/:tail?")).unwrap();

        let full = pattern.matches(&format!("/{prefix}/{value}")).unwrap();
        prop_assert_eq!(full.get("tail"), Some(value.as_str()));

        let short = pattern.matches(&format!("/{prefix}")).unwrap();
        prop_assert!(short.get("tail").is_none());
        prop_assert!(!short.contains("tail"));
    }

    /// Matching never binds a key that is not a named segment.
    #[test]
    fn no_spurious_keys(shape in pattern_shape(), path in "(/[a-z0-9]{1,8}){1,6}") {
        let pattern = RoutePattern::parse(&render_pattern(&shape)).unwrap();
        if let Some(params) = pattern.matches(&path) {
            let names: Vec<String> = pattern.param_names().map(str::to_string).collect();
            for (key, _) in params.iter() {
                prop_assert!(names.iter().any(|n| n == key));
            }
        }
    }
}

#[test]
fn params_collect_from_pairs() {
    let params: RouteParams = [("a", "1"), ("b", "2")].into_iter().collect();
    assert_eq!(params.len(), 2);
}
