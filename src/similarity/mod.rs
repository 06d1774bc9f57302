//! Title normalization and pairwise similarity.
//!
//! Titles are case-folded, punctuation is replaced by spaces and whitespace is
//! collapsed before comparison. Similarity is the Ratcliff/Obershelp ratio
//! `2 * M / T` in `[0.0, 1.0]`, where `M` counts characters in recursively
//! found longest common blocks and `T` is the combined length. No characters
//! are treated as junk. The ratio is not symmetric in general; the record
//! under test is the first argument. An empty normalized title has similarity
//! `0.0` to everything, including another empty title, so records without a
//! usable title are never fuzzy duplicates.

/// Normalizes a title for comparison.
pub fn normalize_title(title: &str) -> String {
    let folded: String = title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Similarity of two already-normalized titles.
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    2.0 * matching_chars(&a, &b) as f64 / (a.len() + b.len()) as f64
}

/// Similarity of two raw titles.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    normalized_similarity(&normalize_title(a), &normalize_title(b))
}

/// Characters covered by the matching blocks of `a` and `b`.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, alo..ahi, blo..bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        pending.push((alo, i, blo, j));
        pending.push((i + size, ahi, j + size, bhi));
    }

    matched
}

/// Longest common block of `a[ra]` and `b[rb]` as `(i, j, size)`. Ties go to
/// the block starting earliest in `a`, then earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    ra: std::ops::Range<usize>,
    rb: std::ops::Range<usize>,
) -> (usize, usize, usize) {
    let mut best = (ra.start, rb.start, 0);
    // run[k + 1]: length of the match ending at a[i - 1], b[rb.start + k]
    let mut run = vec![0usize; rb.len() + 1];
    let mut next = vec![0usize; rb.len() + 1];

    for i in ra {
        for (k, j) in rb.clone().enumerate() {
            next[k + 1] = if a[i] == b[j] { run[k] + 1 } else { 0 };
            let size = next[k + 1];
            if size > best.2 {
                best = (i + 1 - size, j + 1 - size, size);
            }
        }
        std::mem::swap(&mut run, &mut next);
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        assert_eq!(
            normalize_title("  ChatGPT:  A Survey (2nd ed.)! "),
            "chatgpt a survey 2nd ed"
        );
    }

    #[test]
    fn test_normalize_keeps_unicode_letters() {
        assert_eq!(normalize_title("Évaluation—Über"), "évaluation über");
    }

    #[test]
    fn test_identical_after_normalization() {
        let sim = title_similarity("Foo Bar.", "foo   bar");
        assert!((sim - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_title_is_never_similar() {
        assert_eq!(title_similarity("", ""), 0.0);
        assert_eq!(title_similarity("", "Foo"), 0.0);
        assert_eq!(title_similarity("?!", "?!"), 0.0);
    }

    #[test]
    fn test_near_duplicate_above_default_threshold() {
        let sim = title_similarity(
            "Chatbots for Second Language Speaking Practice",
            "Chatbots for second-language speaking practice",
        );
        assert!(sim >= crate::constants::DEFAULT_DUPLICATE_THRESHOLD, "sim = {sim}");
    }

    #[test]
    fn test_distinct_titles_below_threshold() {
        let sim = title_similarity(
            "Chatbots in Higher Education",
            "Deep Learning for Medical Imaging",
        );
        assert!(sim < 0.5, "sim = {sim}");
    }

    #[test]
    fn test_ratio_counts_matching_blocks() {
        assert!((normalized_similarity("abcd", "bcde") - 0.75).abs() < 1e-12);
        // first argument drives block selection
        assert!((normalized_similarity("tide", "diet") - 0.25).abs() < 1e-12);
        assert!((normalized_similarity("diet", "tide") - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_trailing_words_stay_above_threshold() {
        // edit-distance ratio would put this pair at 0.84
        let sim = title_similarity(
            "Voice assistants and oral proficiency",
            "Voice assistants and oral proficiency in EFL",
        );
        assert!((sim - 74.0 / 81.0).abs() < 1e-12, "sim = {sim}");
        assert!(sim >= crate::constants::DEFAULT_DUPLICATE_THRESHOLD);
    }

    #[test]
    fn test_reordered_words_match_common_block() {
        let a = "Speaking practice with AI tutors";
        let b = "AI tutors for speaking practice";
        let sim = title_similarity(a, b);
        assert!((sim - 34.0 / 63.0).abs() < 1e-12, "sim = {sim}");
    }
}
