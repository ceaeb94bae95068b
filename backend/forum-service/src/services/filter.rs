//! Caller filter -> SQL LIKE pattern.

const ANY_RUN: &str = ".*";
const LIKE_WILDCARD: char = '%';

/// Turn a caller-supplied filter into a LIKE pattern.
///
/// An empty filter yields `None`: the listing gets no text predicate at all.
/// Otherwise every `.*` becomes `%`, and the pattern is wrapped in `%` on
/// whichever side is not already anchored by one, so a bare word means
/// "contains".
pub fn build_like_pattern(filter: &str) -> Option<String> {
    if filter.is_empty() {
        return None;
    }

    let rewritten = filter.replace(ANY_RUN, "%");
    let mut pattern = String::with_capacity(rewritten.len() + 2);
    if !rewritten.starts_with(LIKE_WILDCARD) {
        pattern.push(LIKE_WILDCARD);
    }
    pattern.push_str(&rewritten);
    if !rewritten.ends_with(LIKE_WILDCARD) {
        pattern.push(LIKE_WILDCARD);
    }

    Some(pattern)
}
