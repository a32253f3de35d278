//! Fuzzy command suggestions for unresolved command names.
//!
//! A stateless similarity oracle: it knows nothing about the registry or
//! permissions, only the token and the candidate names it is handed.

/// Largest edit distance still considered a typo.
const MAX_DISTANCE: usize = 3;

/// A candidate name that resembles the unresolved token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// The registered command name
    pub name: String,
    /// Edit distance to the token; lower is more similar
    pub score: usize,
}

/// Ranks `candidates` by similarity to `token`, most similar first.
///
/// A candidate qualifies when it starts with the token, or when its edit
/// distance is at most `MAX_DISTANCE` and smaller than the token's length.
/// Prefix matches rank before pure edit-distance matches; ties are broken by
/// name. Returns an empty vector when nothing qualifies.
#[must_use]
pub fn suggest<S: AsRef<str>>(token: &str, candidates: &[S]) -> Vec<Suggestion> {
    let token = token.to_lowercase();
    if token.is_empty() {
        return Vec::new();
    }
    let token_len = token.chars().count();

    let mut ranked: Vec<(bool, Suggestion)> = candidates
        .iter()
        .filter_map(|candidate| {
            let name = candidate.as_ref();
            let lowered = name.to_lowercase();
            let score = levenshtein(&token, &lowered);
            let is_prefix = lowered.starts_with(&token);
            (is_prefix || (score <= MAX_DISTANCE && score < token_len)).then(|| {
                (
                    is_prefix,
                    Suggestion {
                        name: name.to_string(),
                        score,
                    },
                )
            })
        })
        .collect();

    ranked.sort_by(|(a_prefix, a), (b_prefix, b)| {
        b_prefix
            .cmp(a_prefix)
            .then(a.score.cmp(&b.score))
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.dedup_by(|(_, a), (_, b)| a.name == b.name);

    ranked.into_iter().map(|(_, suggestion)| suggestion).collect()
}

/// Levenshtein distance over chars, using a single rolling row pair.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let n = b_chars.len();

    let mut prev_row: Vec<usize> = (0..=n).collect();
    let mut curr_row = vec![0usize; n + 1];

    for (i, a_ch) in a.chars().enumerate() {
        curr_row[0] = i + 1;
        for (j, b_ch) in b_chars.iter().enumerate() {
            let cost = usize::from(a_ch != *b_ch);
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[n]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(suggestions: &[Suggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", "abc"), 0);
        assert_eq!(levenshtein("abc", "ab"), 1);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("pign", "ping"), 2);
        assert_eq!(levenshtein("pign", "pong"), 3);
    }

    #[test]
    fn test_transposed_token_ranks_closest_first() {
        let suggestions = suggest("pign", &["pong", "ping"]);
        assert_eq!(names(&suggestions), vec!["ping", "pong"]);
        assert_eq!(suggestions[0].score, 2);
        assert_eq!(suggestions[1].score, 3);
    }

    #[test]
    fn test_unrelated_token_has_no_suggestions() {
        assert!(suggest("xyzzy", &["ping", "pong"]).is_empty());
    }

    #[test]
    fn test_prefix_matches_rank_first() {
        let suggestions = suggest("rem", &["rpm", "remind", "rem1", "rename"]);
        assert_eq!(names(&suggestions), vec!["rem1", "remind", "rpm"]);
    }

    #[test]
    fn test_short_tokens_need_a_prefix_match() {
        // "a" is one edit away from every one-letter name, which is noise.
        assert!(suggest("a", &["b", "c"]).is_empty());
        assert_eq!(names(&suggest("a", &["ab", "b"])), vec!["ab"]);
    }

    #[test]
    fn test_empty_token_or_candidates() {
        assert!(suggest("", &["ping"]).is_empty());
        assert!(suggest::<&str>("ping", &[]).is_empty());
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(names(&suggest("PIGN", &["ping"])), vec!["ping"]);
    }
}
