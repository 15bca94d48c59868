//! "Did you mean" suggestions for unknown namespaces and names.

/// Minimum normalized similarity for a candidate to be suggested.
pub const SIMILARITY_CUTOFF: f64 = 0.6;

/// The candidate most similar to `query`, if any clears [`SIMILARITY_CUTOFF`].
///
/// Ties go to the candidate seen first.
pub fn closest_match<'a, I>(query: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&str, f64)> = None;

    for candidate in candidates {
        let score = strsim::normalized_levenshtein(query, candidate);
        if score < SIMILARITY_CUTOFF {
            continue;
        }
        match best {
            Some((_, best_score)) if best_score >= score => {}
            _ => best = Some((candidate, score)),
        }
    }

    best.map(|(candidate, _)| candidate.to_string())
}
