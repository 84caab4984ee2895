//! "Did you mean" hints for misspelled condition fields and operators

/// Maximum Levenshtein distance to consider for suggestions
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Candidates within the distance limit, closest first
pub fn find_closest_matches<'a>(
    input: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    max_results: usize,
) -> Vec<&'a str> {
    let mut matches: Vec<(usize, &str)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let distance = strsim::levenshtein(input, candidate);
            (distance > 0 && distance <= MAX_SUGGESTION_DISTANCE).then_some((distance, candidate))
        })
        .collect();

    matches.sort_by_key(|(distance, _)| *distance);
    matches.truncate(max_results);
    matches.into_iter().map(|(_, candidate)| candidate).collect()
}

/// Hint for an unknown condition field
pub fn suggest_field(field: &str, known: &[&str]) -> String {
    match find_closest_matches(field, known.iter().copied(), 1).first() {
        Some(candidate) => format!("Did you mean `{}`?", candidate),
        None => format!("Available fields: {}", known.join(", ")),
    }
}

/// Hint for an unknown comparison operator
pub fn suggest_operator(operator: &str, known: &[&str]) -> String {
    let closest = find_closest_matches(operator, known.iter().copied(), 2);
    if closest.is_empty() {
        format!("Supported operators: {}", known.join(" "))
    } else {
        let quoted: Vec<String> = closest.iter().map(|c| format!("`{}`", c)).collect();
        format!("Did you mean {}?", quoted.join(" or "))
    }
}
