//! Column projection of parsed tuples

/// Literal substituted for positions missing from a short tuple.
pub const MISSING_VALUE: &str = "NULL";

/// Select the retained positions of a tuple, in the order given by `retained`.
///
/// Positions past the end of the tuple yield `NULL`, so a row that lost
/// trailing fields still produces one value per output column.
pub fn project<'a, S: AsRef<str>>(tuple: &'a [S], retained: &[usize]) -> Vec<&'a str> {
    retained
        .iter()
        .map(|&idx| tuple.get(idx).map_or(MISSING_VALUE, |v| v.as_ref()))
        .collect()
}

/// Positions `0..original_len` that are not in `removed`, ascending.
pub fn retained_indices(original_len: usize, removed: &std::collections::BTreeSet<usize>) -> Vec<usize> {
    (0..original_len).filter(|i| !removed.contains(i)).collect()
}
