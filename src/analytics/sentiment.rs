// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Keyword-based sentiment scoring of comments.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::aggregator::{days, percentage, within_window, WEEK_DAYS};
use crate::models::Comment;

const POSITIVE: &[&str] = &[
    "good", "great", "excellent", "amazing", "awesome", "helpful", "love", "loved", "best",
    "fantastic", "clear", "useful", "perfect", "wonderful", "brilliant", "thanks", "thank",
    "recommend", "easy", "nice",
];

const NEGATIVE: &[&str] = &[
    "bad", "terrible", "awful", "useless", "confusing", "confused", "poor", "hate", "worst",
    "boring", "wrong", "broken", "unclear", "disappointing", "waste", "hard", "slow", "error",
];

const NEUTRAL: &[&str] = &[
    "okay", "ok", "average", "decent", "normal", "alright", "moderate", "standard", "mixed",
];

/// Used when there is nothing to classify, so the dashboard never renders an empty breakdown
const FALLBACK_SAMPLES: &[&str] = &[
    "Great explanation, really helpful",
    "The examples were clear and useful",
    "Average lesson, nothing special",
    "Audio was confusing in places",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentTrend {
    Improving,
    Stable,
    Declining,
}

/// Outcome of classifying one text
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub label: SentimentLabel,
    pub confidence: f64,
    pub positive_hits: usize,
    pub negative_hits: usize,
    pub neutral_hits: usize,
}

/// Text plus the moment it was written, if known
#[derive(Debug, Clone, PartialEq)]
pub struct TextSample {
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Comment> for TextSample {
    fn from(comment: &Comment) -> Self {
        Self {
            text: comment.text.clone(),
            created_at: Some(comment.created_at),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl Breakdown {
    fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    /// Label with the most votes; ties go to positive, then negative, then neutral
    pub fn overall(&self) -> SentimentLabel {
        if self.positive >= self.negative && self.positive >= self.neutral {
            SentimentLabel::Positive
        } else if self.negative >= self.neutral {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentReport {
    pub breakdown: Breakdown,
    pub overall: SentimentLabel,
    pub positivity_rate: f64,
    /// Positivity over the last week
    pub recent_positivity_rate: f64,
    pub trend: SentimentTrend,
    pub analyzed: usize,
    pub used_fallback: bool,
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Classify one text by counting vocabulary hits
pub fn classify(text: &str) -> Classification {
    let (mut pos, mut neg, mut neu) = (0usize, 0usize, 0usize);
    for token in tokenize(text) {
        let token = token.as_str();
        if POSITIVE.contains(&token) {
            pos += 1;
        } else if NEGATIVE.contains(&token) {
            neg += 1;
        } else if NEUTRAL.contains(&token) {
            neu += 1;
        }
    }

    let (label, confidence) = if pos > neg && pos > neu {
        (SentimentLabel::Positive, (0.6 + 0.1 * pos as f64).min(0.9))
    } else if neg > pos && neg > neu {
        (SentimentLabel::Negative, (0.6 + 0.1 * neg as f64).min(0.9))
    } else if neu > pos && neu > neg {
        (SentimentLabel::Neutral, 0.7)
    } else {
        (SentimentLabel::Neutral, 0.5)
    };

    Classification {
        label,
        confidence,
        positive_hits: pos,
        negative_hits: neg,
        neutral_hits: neu,
    }
}

fn trend_for(rate: f64) -> SentimentTrend {
    if rate > 60.0 {
        SentimentTrend::Improving
    } else if rate < 40.0 {
        SentimentTrend::Declining
    } else {
        SentimentTrend::Stable
    }
}

/// Aggregate sentiment over `samples`. Samples without a timestamp never count as recent.
/// With no samples a fixed set of reference texts stands in, all treated as recent.
pub fn analyze(samples: &[TextSample], now: DateTime<Utc>) -> SentimentReport {
    let fallback: Vec<TextSample>;
    let (samples, used_fallback) = if samples.is_empty() {
        fallback = FALLBACK_SAMPLES
            .iter()
            .map(|text| TextSample {
                text: text.to_string(),
                created_at: Some(now),
            })
            .collect();
        (fallback.as_slice(), true)
    } else {
        (samples, false)
    };

    let week = days(WEEK_DAYS);
    let mut breakdown = Breakdown::default();
    let mut recent = Breakdown::default();

    for sample in samples {
        let label = classify(&sample.text).label;
        breakdown.record(label);
        if sample
            .created_at
            .map_or(false, |ts| within_window(ts, now, week))
        {
            recent.record(label);
        }
    }

    let recent_positivity_rate = percentage(recent.positive, recent.total());
    let trend = if recent.total() == 0 {
        SentimentTrend::Stable
    } else {
        trend_for(recent_positivity_rate)
    };

    SentimentReport {
        breakdown,
        overall: breakdown.overall(),
        positivity_rate: percentage(breakdown.positive, breakdown.total()),
        recent_positivity_rate,
        trend,
        analyzed: samples.len(),
        used_fallback,
    }
}

/// Sentiment over the sampled comments of a snapshot
pub fn analyze_comments(comments: &[Comment], now: DateTime<Utc>) -> SentimentReport {
    let samples: Vec<TextSample> = comments.iter().map(TextSample::from).collect();
    analyze(&samples, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        "2026-06-15T12:00:00Z".parse().unwrap()
    }

    fn sample(text: &str, age_days: i64) -> TextSample {
        TextSample {
            text: text.to_string(),
            created_at: Some(now() - Duration::days(age_days)),
        }
    }

    #[test]
    fn positive_text_scores_above_baseline() {
        let c = classify("This is a great and amazing tutor");
        assert_eq!(c.label, SentimentLabel::Positive);
        assert!(c.confidence > 0.6);
        assert!((c.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn negative_text_is_negative() {
        let c = classify("This is useless and confusing");
        assert_eq!(c.label, SentimentLabel::Negative);
    }

    #[test]
    fn text_without_hits_is_neutral_at_half_confidence() {
        let c = classify("It is fine");
        assert_eq!(c.label, SentimentLabel::Neutral);
        assert_eq!(c.confidence, 0.5);
    }

    #[test]
    fn neutral_vocabulary_majority_has_fixed_confidence() {
        let c = classify("An okay, average video");
        assert_eq!(c.label, SentimentLabel::Neutral);
        assert_eq!(c.confidence, 0.7);
    }

    #[test]
    fn ties_resolve_to_neutral() {
        let c = classify("Great tutor but confusing notes");
        assert_eq!(c.label, SentimentLabel::Neutral);
        assert_eq!(c.confidence, 0.5);
    }

    #[test]
    fn confidence_is_capped() {
        let c = classify("great great great great great great");
        assert_eq!(c.confidence, 0.9);
    }

    #[test]
    fn tokenizer_splits_on_punctuation_and_case() {
        let c = classify("GREAT!!!helpful...");
        assert_eq!(c.positive_hits, 2);
    }

    #[test]
    fn empty_input_falls_back_to_reference_samples() {
        let report = analyze(&[], now());
        assert!(report.used_fallback);
        assert_eq!(report.analyzed, FALLBACK_SAMPLES.len());
        assert_eq!(report.breakdown.total(), FALLBACK_SAMPLES.len());
        assert_eq!(report.overall, SentimentLabel::Positive);
    }

    #[test]
    fn overall_ties_prefer_positive_then_negative() {
        let tie = Breakdown {
            positive: 2,
            negative: 2,
            neutral: 2,
        };
        assert_eq!(tie.overall(), SentimentLabel::Positive);

        let neg_neu = Breakdown {
            positive: 0,
            negative: 3,
            neutral: 3,
        };
        assert_eq!(neg_neu.overall(), SentimentLabel::Negative);
    }

    #[test]
    fn recent_window_drives_trend() {
        let samples = vec![
            sample("great", 1),
            sample("helpful", 2),
            sample("amazing", 3),
            sample("terrible", 30),
            sample("useless", 40),
            sample("awful", 50),
            sample("confusing", 60),
        ];
        let report = analyze(&samples, now());
        assert_eq!(report.overall, SentimentLabel::Negative);
        assert_eq!(report.recent_positivity_rate, 100.0);
        assert_eq!(report.trend, SentimentTrend::Improving);

        let declining = analyze(&[sample("boring", 1), sample("great", 2), sample("bad", 3)], now());
        assert_eq!(declining.trend, SentimentTrend::Declining);

        let stale = analyze(&[sample("great", 30)], now());
        assert_eq!(stale.trend, SentimentTrend::Stable);
    }
}
