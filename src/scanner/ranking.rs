use crate::scanner::{ConfidenceLabel, SwingCandidate};

/// Filter, order and truncate one side's candidates
///
/// Drops LOW candidates unless `min_confidence` is itself LOW, sorts by descending
/// score with a stable sort (ties keep input order), keeps at most `limit`
/// and assigns 1-based ranks.
pub fn rank(
    candidates: Vec<SwingCandidate>,
    min_confidence: ConfidenceLabel,
    limit: usize,
) -> Vec<SwingCandidate> {
    let mut kept: Vec<SwingCandidate> = candidates
        .into_iter()
        .filter(|c| {
            c.confidence != ConfidenceLabel::Low || min_confidence == ConfidenceLabel::Low
        })
        .collect();

    kept.sort_by(|a, b| b.score.cmp(&a.score));
    kept.truncate(limit);

    for (i, candidate) in kept.iter_mut().enumerate() {
        candidate.rank = i + 1;
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{HorizonRange, PressureDriver, SwingRegime};

    fn candidate(symbol: &str, score: u8, confidence: ConfidenceLabel) -> SwingCandidate {
        SwingCandidate {
            rank: 0,
            symbol: symbol.to_string(),
            score,
            regime: SwingRegime::Accumulation,
            pressure_driver: PressureDriver::ShortCovering,
            time_horizon_days: HorizonRange::new(5, 10),
            confidence,
        }
    }

    fn symbols(ranked: &[SwingCandidate]) -> Vec<&str> {
        ranked.iter().map(|c| c.symbol.as_str()).collect()
    }

    #[test]
    fn test_sorted_descending_with_dense_ranks() {
        let ranked = rank(
            vec![
                candidate("A", 65, ConfidenceLabel::Medium),
                candidate("B", 90, ConfidenceLabel::High),
                candidate("C", 72, ConfidenceLabel::Medium),
            ],
            ConfidenceLabel::Medium,
            5,
        );

        assert_eq!(symbols(&ranked), vec!["B", "C", "A"]);
        assert_eq!(ranked.iter().map(|c| c.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ranked = rank(
            vec![
                candidate("FIRST", 70, ConfidenceLabel::Medium),
                candidate("SECOND", 70, ConfidenceLabel::Medium),
                candidate("THIRD", 70, ConfidenceLabel::Medium),
            ],
            ConfidenceLabel::Low,
            2,
        );

        assert_eq!(symbols(&ranked), vec!["FIRST", "SECOND"]);
    }

    #[test]
    fn test_only_low_candidates_are_filtered() {
        let input = vec![
            candidate("LOW", 50, ConfidenceLabel::Low),
            candidate("MED", 65, ConfidenceLabel::Medium),
            candidate("HIGH", 85, ConfidenceLabel::High),
        ];

        assert_eq!(symbols(&rank(input.clone(), ConfidenceLabel::Low, 5)).len(), 3);
        assert_eq!(
            symbols(&rank(input.clone(), ConfidenceLabel::Medium, 5)),
            vec!["HIGH", "MED"]
        );
        // A HIGH minimum still keeps MEDIUM candidates
        assert_eq!(
            symbols(&rank(input, ConfidenceLabel::High, 5)),
            vec!["HIGH", "MED"]
        );
    }

    #[test]
    fn test_zero_limit_returns_nothing() {
        let ranked = rank(
            vec![candidate("A", 90, ConfidenceLabel::High)],
            ConfidenceLabel::Low,
            0,
        );
        assert!(ranked.is_empty());
    }
}
