/// Options-chain Regime Classifier
///
/// Classifies a symbol's structural control from its put/call open-interest ratio:
/// - Bear Controlled: ratio >= bear threshold (puts dominate positioning)
/// - Bull Controlled: 0 < ratio <= bull threshold (calls dominate positioning)
/// - Mixed: anything in between, and a zero ratio (no chain data)

use crate::config::RegimeThresholds;
use crate::models::Regime;

#[derive(Debug, Clone, Default)]
pub struct RegimeClassifier {
    thresholds: RegimeThresholds,
}

impl RegimeClassifier {
    pub fn new(thresholds: RegimeThresholds) -> Self {
        Self { thresholds }
    }

    pub fn classify(&self, put_call_ratio: f64) -> Regime {
        // A zero ratio means the chain was empty, not that calls dominate
        if put_call_ratio <= 0.0 {
            return Regime::Mixed;
        }

        if put_call_ratio >= self.thresholds.bear_threshold {
            Regime::BearControlled
        } else if put_call_ratio <= self.thresholds.bull_threshold {
            Regime::BullControlled
        } else {
            Regime::Mixed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NEUTRAL_PUT_CALL_RATIO;

    #[test]
    fn test_heavy_put_positioning_is_bear_controlled() {
        let classifier = RegimeClassifier::default();
        assert_eq!(classifier.classify(1.8), Regime::BearControlled);
        assert_eq!(classifier.classify(1.5), Regime::BearControlled);
    }

    #[test]
    fn test_heavy_call_positioning_is_bull_controlled() {
        let classifier = RegimeClassifier::default();
        assert_eq!(classifier.classify(0.6), Regime::BullControlled);
        assert_eq!(classifier.classify(0.7), Regime::BullControlled);
    }

    #[test]
    fn test_neutral_default_and_zero_ratio_are_mixed() {
        let classifier = RegimeClassifier::default();
        assert_eq!(classifier.classify(NEUTRAL_PUT_CALL_RATIO), Regime::Mixed);
        assert_eq!(classifier.classify(0.0), Regime::Mixed);
        assert_eq!(classifier.classify(1.2), Regime::Mixed);
    }

    #[test]
    fn test_custom_thresholds() {
        let classifier = RegimeClassifier::new(RegimeThresholds {
            bear_threshold: 2.0,
            bull_threshold: 0.65,
        });

        assert_eq!(classifier.classify(1.8), Regime::Mixed);
        assert_eq!(classifier.classify(2.0), Regime::BearControlled);
        assert_eq!(classifier.classify(0.7), Regime::Mixed);
    }
}
