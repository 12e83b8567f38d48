//! Two-class probabilities and the qualitative label derived from them.

use crate::error::SentimentError;

/// Softmax output for the `[negative, positive]` logit pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probabilities {
    pub negative: f32,
    pub positive: f32,
}

impl Probabilities {
    /// Numerically stable softmax over exactly two logits.
    ///
    /// # Errors
    ///
    /// Returns an error for any other logit count or non-finite values.
    pub fn from_logits(logits: &[f32]) -> Result<Self, SentimentError> {
        let &[neg, pos] = logits else {
            return Err(SentimentError::LogitCount(logits.len()));
        };
        if !neg.is_finite() || !pos.is_finite() {
            return Err(SentimentError::NonFinite);
        }
        let max = neg.max(pos);
        let e_neg = (neg - max).exp();
        let e_pos = (pos - max).exp();
        let sum = e_neg + e_pos;
        Ok(Self {
            negative: e_neg / sum,
            positive: e_pos / sum,
        })
    }
}

/// Qualitative reading of the positive probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentLabel {
    VeryPositive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// `> 0.6` is very positive, `(0.4, 0.6]` neutral, `<= 0.4` negative.
    #[must_use]
    pub fn classify(positive: f32) -> Self {
        if positive > 0.6 {
            Self::VeryPositive
        } else if positive > 0.4 {
            Self::Neutral
        } else {
            Self::Negative
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::VeryPositive => "Very Positive",
            Self::Neutral => "Neutral",
            Self::Negative => "Negative",
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::VeryPositive => "The text carries a strongly positive sentiment!",
            Self::Neutral => "The text carries a balanced sentiment.",
            Self::Negative => "The text carries a negative sentiment.",
        }
    }
}

/// `p * 100` with one decimal place, e.g. `0.8734` -> `"87.3%"`.
#[must_use]
pub fn percent(p: f32) -> String {
    format!("{:.1}%", p * 100.0)
}
