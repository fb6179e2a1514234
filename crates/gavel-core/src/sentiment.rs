//! Jury sentiment and judge patience aggregation.
//!
//! Pure scalar arithmetic: impacts broadcast uniformly to every juror,
//! the aggregate is the clamped arithmetic mean, and the judge's patience
//! is a single depleting scalar. No randomness, no hidden state.

use serde::{Deserialize, Serialize};

/// Lower bound for a juror sentiment scalar.
pub const JUROR_SENTIMENT_MIN: i32 = -100;
/// Upper bound for a juror sentiment scalar.
pub const JUROR_SENTIMENT_MAX: i32 = 100;
/// Lower bound for judge patience. Zero is mistrial-eligible.
pub const JUDGE_PATIENCE_MIN: i32 = 0;
/// Upper bound for judge patience.
pub const JUDGE_PATIENCE_MAX: i32 = 100;

/// Deterministic banding of a sentiment scalar for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JurorExpression {
    Hostile,
    Doubtful,
    Neutral,
    Receptive,
    Convinced,
}

/// Band a sentiment value. Pure function of the scalar.
pub fn juror_expression(sentiment: i32) -> JurorExpression {
    match sentiment {
        v if v >= 60 => JurorExpression::Convinced,
        v if v >= 20 => JurorExpression::Receptive,
        v if v > -20 => JurorExpression::Neutral,
        v if v > -60 => JurorExpression::Doubtful,
        _ => JurorExpression::Hostile,
    }
}

/// Per-juror sentiment plus judge patience for one trial.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourtroomSentiment {
    jurors: Vec<i32>,
    judge_patience: i32,
}

impl CourtroomSentiment {
    /// A fresh panel: every juror at 0, patience full.
    pub fn new(juror_count: usize) -> Self {
        Self {
            jurors: vec![0; juror_count],
            judge_patience: JUDGE_PATIENCE_MAX,
        }
    }

    /// Broadcast a delta to every juror, clamping each scalar, and return
    /// the new aggregate. The model does not differentiate individual
    /// juror reactions to a given event.
    pub fn apply_jury_impact(&mut self, delta: i32) -> i32 {
        for juror in &mut self.jurors {
            *juror = juror
                .saturating_add(delta)
                .clamp(JUROR_SENTIMENT_MIN, JUROR_SENTIMENT_MAX);
        }
        self.aggregate()
    }

    /// Add a delta to judge patience, clamped to [0, 100], returning the
    /// new value. Exhaustion does not force a phase transition; the
    /// verdict engine reads the terminal value.
    pub fn apply_patience_impact(&mut self, delta: i32) -> i32 {
        self.judge_patience = self
            .judge_patience
            .saturating_add(delta)
            .clamp(JUDGE_PATIENCE_MIN, JUDGE_PATIENCE_MAX);
        self.judge_patience
    }

    /// Aggregate jury sentiment: clamped arithmetic mean.
    pub fn aggregate(&self) -> i32 {
        if self.jurors.is_empty() {
            return 0;
        }
        let sum: i64 = self.jurors.iter().map(|v| i64::from(*v)).sum();
        let mean = (sum / self.jurors.len() as i64) as i32;
        mean.clamp(JUROR_SENTIMENT_MIN, JUROR_SENTIMENT_MAX)
    }

    pub fn jurors(&self) -> &[i32] {
        &self.jurors
    }

    pub fn judge_patience(&self) -> i32 {
        self.judge_patience
    }

    /// Patience has run out; the trial is mistrial-eligible.
    pub fn is_patience_exhausted(&self) -> bool {
        self.judge_patience == JUDGE_PATIENCE_MIN
    }

    /// Current expression of the aggregate.
    pub fn jury_expression(&self) -> JurorExpression {
        juror_expression(self.aggregate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_broadcast_updates_every_juror() {
        let mut sentiment = CourtroomSentiment::new(6);
        let aggregate = sentiment.apply_jury_impact(8);
        assert_eq!(aggregate, 8);
        assert!(sentiment.jurors().iter().all(|v| *v == 8));
    }

    #[test]
    fn test_jury_sentiment_clamps() {
        let mut sentiment = CourtroomSentiment::new(3);
        for _ in 0..30 {
            sentiment.apply_jury_impact(10);
        }
        assert_eq!(sentiment.aggregate(), JUROR_SENTIMENT_MAX);

        for _ in 0..60 {
            sentiment.apply_jury_impact(-10);
        }
        assert_eq!(sentiment.aggregate(), JUROR_SENTIMENT_MIN);
    }

    #[test]
    fn test_patience_clamps_and_exhausts() {
        let mut sentiment = CourtroomSentiment::new(6);
        assert_eq!(sentiment.apply_patience_impact(50), JUDGE_PATIENCE_MAX);

        for _ in 0..25 {
            sentiment.apply_patience_impact(-5);
        }
        assert_eq!(sentiment.judge_patience(), JUDGE_PATIENCE_MIN);
        assert!(sentiment.is_patience_exhausted());

        // Still clamped from below.
        assert_eq!(sentiment.apply_patience_impact(-5), JUDGE_PATIENCE_MIN);
    }

    #[test]
    fn test_extreme_deltas_saturate_before_clamping() {
        let mut sentiment = CourtroomSentiment::new(3);
        assert_eq!(sentiment.apply_jury_impact(i32::MAX), JUROR_SENTIMENT_MAX);
        // Jurors sit at the cap; another huge delta must not wrap.
        assert_eq!(sentiment.apply_jury_impact(i32::MAX), JUROR_SENTIMENT_MAX);
        assert_eq!(sentiment.apply_jury_impact(i32::MIN), JUROR_SENTIMENT_MIN);

        assert_eq!(sentiment.apply_patience_impact(i32::MIN), JUDGE_PATIENCE_MIN);
        assert_eq!(sentiment.apply_patience_impact(i32::MAX), JUDGE_PATIENCE_MAX);
    }

    #[test]
    fn test_expression_bands() {
        assert_eq!(juror_expression(100), JurorExpression::Convinced);
        assert_eq!(juror_expression(60), JurorExpression::Convinced);
        assert_eq!(juror_expression(59), JurorExpression::Receptive);
        assert_eq!(juror_expression(20), JurorExpression::Receptive);
        assert_eq!(juror_expression(0), JurorExpression::Neutral);
        assert_eq!(juror_expression(-19), JurorExpression::Neutral);
        assert_eq!(juror_expression(-20), JurorExpression::Doubtful);
        assert_eq!(juror_expression(-59), JurorExpression::Doubtful);
        assert_eq!(juror_expression(-60), JurorExpression::Hostile);
        assert_eq!(juror_expression(-100), JurorExpression::Hostile);
    }

    proptest! {
        #[test]
        fn prop_ranges_hold_for_any_impact_sequence(
            deltas in proptest::collection::vec(any::<i32>(), 0..64)
        ) {
            let mut sentiment = CourtroomSentiment::new(6);
            for delta in deltas {
                sentiment.apply_jury_impact(delta);
                sentiment.apply_patience_impact(delta);

                prop_assert!(sentiment.aggregate() >= JUROR_SENTIMENT_MIN);
                prop_assert!(sentiment.aggregate() <= JUROR_SENTIMENT_MAX);
                prop_assert!(sentiment.judge_patience() >= JUDGE_PATIENCE_MIN);
                prop_assert!(sentiment.judge_patience() <= JUDGE_PATIENCE_MAX);
                for juror in sentiment.jurors() {
                    prop_assert!(*juror >= JUROR_SENTIMENT_MIN && *juror <= JUROR_SENTIMENT_MAX);
                }
            }
        }
    }
}
