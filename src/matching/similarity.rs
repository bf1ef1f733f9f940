use super::tokenize;

/// A search result is downloaded only when its similarity is strictly above this.
pub const DOWNLOAD_SIMILARITY_THRESHOLD: f64 = 0.6;

const EPSILON: f64 = 1e-8;

/// Fraction of the catalog title's words found in the candidate title.
///
/// The target is `"{surname}, {music}"`. The first name is left out because
/// video titles spell and order it inconsistently. Extra words in the candidate
/// (performer, catalog numbers) do not lower the score.
pub fn similarity(surname: &str, music: &str, candidate_title: &str) -> f64 {
    let target = tokenize(&format!("{}, {}", surname, music));
    let candidate = tokenize(candidate_title);
    let shared = target.intersection(&candidate).count();
    shared as f64 / (target.len() as f64).max(EPSILON)
}

/// True when the surname appears verbatim (case-sensitive) in the candidate title.
pub fn surname_match(surname: &str, candidate_title: &str) -> bool {
    !surname.is_empty() && candidate_title.contains(surname)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_title_scores_one() {
        let title = "Chopin, Nocturne in E-flat major, Op.9 No.2";
        assert_eq!(
            similarity("Chopin", "Nocturne in E-flat major, Op.9 No.2", title),
            1.0
        );
    }

    #[test]
    fn test_extra_candidate_words_do_not_penalize() {
        let score = similarity(
            "Satie",
            "Gymnopédie No.1",
            "Erik Satie - Gymnopédie No.1 (Reinbert de Leeuw, live 1980)",
        );
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_partial_overlap() {
        // target words: liszt, la, campanella -> 2 of 3 present
        let score = similarity("Liszt", "La Campanella", "Liszt Campanella");
        assert!((score - 2.0 / 3.0).abs() < 1e-12);
        assert!(score > DOWNLOAD_SIMILARITY_THRESHOLD);
    }

    #[test]
    fn test_firstname_is_not_required() {
        let with_first = similarity("Mozart", "Rondo alla Turca", "Wolfgang Amadeus Mozart Rondo alla Turca");
        let without_first = similarity("Mozart", "Rondo alla Turca", "Mozart Rondo alla Turca");
        assert_eq!(with_first, 1.0);
        assert_eq!(without_first, 1.0);
    }

    #[test]
    fn test_empty_candidate_scores_zero() {
        assert_eq!(similarity("Bach", "Prelude in C major", ""), 0.0);
    }

    #[test]
    fn test_empty_target_scores_zero() {
        assert_eq!(similarity("", "", "anything at all"), 0.0);
    }

    #[test]
    fn test_similarity_is_asymmetric() {
        let a = similarity("Bach", "Prelude", "Bach Prelude and Fugue BWV 846");
        let b = similarity("Bach", "Prelude and Fugue BWV 846", "Bach Prelude");
        assert_eq!(a, 1.0);
        assert!(b < 1.0);
    }

    #[test]
    fn test_similarity_bounded() {
        let cases = [
            ("Chopin", "Waltz", "chopin waltz waltz waltz"),
            ("Chopin", "Waltz Waltz", "Chopin"),
            ("A.", "!!", "a"),
            ("", "", ""),
        ];
        for (surname, music, title) in cases {
            let score = similarity(surname, music, title);
            assert!((0.0..=1.0).contains(&score), "{} out of range", score);
        }
    }

    #[test]
    fn test_surname_match_is_case_sensitive() {
        assert!(surname_match("Chopin", "Chopin - Ballade No.1"));
        assert!(!surname_match("Chopin", "CHOPIN - Ballade No.1"));
        assert!(surname_match("Bach", "J.S.Bach: Goldberg"));
        assert!(!surname_match("", "anything"));
        assert!(!surname_match("Bach", ""));
    }
}
