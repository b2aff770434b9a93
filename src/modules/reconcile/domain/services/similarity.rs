use strsim::{jaro_winkler, sorensen_dice};

/// Strategy for scoring how close two unit names are.
///
/// Returns a value in [0.0, 1.0]; the reconciler only ever compares scores
/// against thresholds, so strategies are interchangeable.
pub trait SimilarityStrategy: Send + Sync {
    fn calculate(&self, query: &str, target: &str) -> f64;

    /// Strategy name for logging/debugging
    fn name(&self) -> &'static str;
}

/// Sørensen–Dice bigram coefficient over whitespace-stripped names.
///
/// This is the rating the historical import tooling was tuned against, so the
/// 0.8/0.95/0.99 thresholds carry over unchanged. Whitespace is removed
/// before scoring, exactly like the legacy rating: names differing only in
/// spacing score 1.0 and fall out as near-duplicates.
#[derive(Debug, Clone, Copy)]
pub struct SorensenDiceStrategy;

impl SimilarityStrategy for SorensenDiceStrategy {
    fn calculate(&self, query: &str, target: &str) -> f64 {
        let query: String = query.split_whitespace().collect();
        let target: String = target.split_whitespace().collect();
        sorensen_dice(&query, &target)
    }

    fn name(&self) -> &'static str {
        "SorensenDice"
    }
}

/// Jaro-Winkler similarity. Weighs matching prefixes heavily, which works
/// well for short names where numbering is the distinguishing part.
#[derive(Debug, Clone, Copy)]
pub struct JaroWinklerStrategy;

impl SimilarityStrategy for JaroWinklerStrategy {
    fn calculate(&self, query: &str, target: &str) -> f64 {
        jaro_winkler(query, target)
    }

    fn name(&self) -> &'static str {
        "JaroWinkler"
    }
}

/// The closest existing name to a query, with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct BestMatch {
    pub name: String,
    pub score: f64,
}

/// Scan every existing name and keep the highest-scoring one.
/// Returns None for an empty candidate list.
pub fn best_match(
    strategy: &dyn SimilarityStrategy,
    query: &str,
    candidates: &[String],
) -> Option<BestMatch> {
    candidates
        .iter()
        .map(|candidate| BestMatch {
            name: candidate.clone(),
            score: strategy.calculate(query, candidate),
        })
        .max_by(|a, b| a.score.total_cmp(&b.score))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dice_identical_names_score_one() {
        let strategy = SorensenDiceStrategy;
        assert_eq!(
            strategy.calculate("3rd Dalmatian Brigade", "3rd Dalmatian Brigade"),
            1.0
        );
    }

    #[test]
    fn dice_unrelated_names_score_low() {
        let strategy = SorensenDiceStrategy;
        assert!(strategy.calculate("Mosor Detachment", "8th Corps") < 0.3);
    }

    #[test]
    fn dice_ignores_whitespace_noise() {
        let strategy = SorensenDiceStrategy;
        let trailing = strategy.calculate("3rd Dalmatian Brigade", "3rd Dalmatian Brigade ");
        assert_eq!(trailing, 1.0);
        let doubled = strategy.calculate("3rd Dalmatian Brigade", "3rd  Dalmatian  Brigade");
        assert_eq!(doubled, 1.0);
    }

    #[test]
    fn dice_numbering_difference_lands_in_confirm_band() {
        let strategy = SorensenDiceStrategy;
        let score = strategy.calculate("3rd Dalmatian Brigade", "4th Dalmatian Brigade");
        assert!(score > 0.8, "got {}", score);
        assert!(score < 0.99);
    }

    #[test]
    fn jaro_winkler_identical_names_score_one() {
        let strategy = JaroWinklerStrategy;
        assert_eq!(strategy.calculate("Mosor Detachment", "Mosor Detachment"), 1.0);
    }

    #[test]
    fn scores_are_commutative() {
        for strategy in [
            &SorensenDiceStrategy as &dyn SimilarityStrategy,
            &JaroWinklerStrategy,
        ] {
            let ab = strategy.calculate("1st Proletarian Division", "1st Proletarian Brigade");
            let ba = strategy.calculate("1st Proletarian Brigade", "1st Proletarian Division");
            assert_eq!(ab, ba, "{} not commutative", strategy.name());
        }
    }

    #[test]
    fn scores_are_bounded() {
        let cases = [
            ("", ""),
            ("", "8th Corps"),
            ("Biokovo Detachment", "Biokovo Detachment"),
            ("Biokovo Detachment", "Mosor Detachment"),
        ];
        for strategy in [
            &SorensenDiceStrategy as &dyn SimilarityStrategy,
            &JaroWinklerStrategy,
        ] {
            for (a, b) in cases {
                let score = strategy.calculate(a, b);
                assert!(
                    (0.0..=1.0).contains(&score),
                    "{} out of bounds for '{}'/'{}'",
                    score,
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn best_match_picks_highest_scoring_candidate() {
        let names = vec![
            "8th Corps".to_string(),
            "3rd Dalmatian Brigade".to_string(),
            "Mosor Detachment".to_string(),
        ];
        let result = best_match(&SorensenDiceStrategy, "3rd Dalmatian Brigade ", &names).unwrap();
        assert_eq!(result.name, "3rd Dalmatian Brigade");
        assert!(result.score > 0.9);
    }

    #[test]
    fn best_match_on_empty_store_is_none() {
        assert!(best_match(&SorensenDiceStrategy, "8th Corps", &[]).is_none());
    }
}
