// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;

use super::knowledge_base::{
    Category, CATEGORIES, FAILURE_MARKERS, GENERAL_REPLY, SHORT_REPLY, TECHNICAL_REPLY,
    URGENT_REPLY,
};
use crate::models::Question;
use crate::random::RandomSource;

/// Minimum score for a knowledge-base category to answer
pub const MATCH_THRESHOLD: u32 = 2;
pub const FALLBACK_CONFIDENCE: f64 = 0.6;
const SHORT_TEXT_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Fallback {
    Urgent,
    Short,
    Technical,
    General,
}

impl Fallback {
    pub fn reply(&self) -> &'static str {
        match self {
            Fallback::Urgent => URGENT_REPLY,
            Fallback::Short => SHORT_REPLY,
            Fallback::Technical => TECHNICAL_REPLY,
            Fallback::General => GENERAL_REPLY,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Fallback::Urgent => "urgent",
            Fallback::Short => "short",
            Fallback::Technical => "technical",
            Fallback::General => "general",
        }
    }
}

/// A reply the router is prepared to send
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftReply {
    pub reply: String,
    pub confidence: f64,
    /// Knowledge-base category, or the fallback template name
    pub category: String,
    pub score: u32,
    pub requires_human_review: bool,
}

/// True when `pattern` occurs in `text` with no word character on either side
fn whole_word(text: &str, pattern: &str) -> bool {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    text.match_indices(pattern).any(|(start, matched)| {
        let before = text[..start].chars().next_back();
        let after = text[start + matched.len()..].chars().next();
        !before.map_or(false, is_word) && !after.map_or(false, is_word)
    })
}

/// Score one category against a question. `text` must already be lowercase.
pub fn score(category: &Category, question_category: &str, text: &str) -> u32 {
    let mut score = 0;
    if category.name.eq_ignore_ascii_case(question_category.trim()) {
        score += 3;
    }
    for pattern in category.patterns {
        if text.contains(pattern) {
            score += 2;
            if whole_word(text, pattern) {
                score += 1;
            }
        }
    }
    score
}

/// Highest-scoring category at or above the threshold; earlier categories win ties
pub fn best_match(question: &Question) -> Option<(&'static Category, u32)> {
    let text = question.text.to_lowercase();
    let mut best: Option<(&'static Category, u32)> = None;
    for category in CATEGORIES {
        let s = score(category, &question.category, &text);
        if s >= MATCH_THRESHOLD && best.map_or(true, |(_, top)| s > top) {
            best = Some((category, s));
        }
    }
    best
}

pub fn fallback_for(question: &Question) -> Fallback {
    let text = question.text.trim().to_lowercase();
    if question.urgent {
        Fallback::Urgent
    } else if text.chars().count() < SHORT_TEXT_CHARS {
        Fallback::Short
    } else if FAILURE_MARKERS.iter().any(|m| text.contains(m)) {
        Fallback::Technical
    } else {
        Fallback::General
    }
}

pub fn match_confidence(score: u32) -> f64 {
    (0.7 + 0.05 * score as f64).min(0.95)
}

/// Pick a reply for `question`: a canned knowledge-base answer when a category matches,
/// otherwise a fallback template that asks for human review
pub fn draft_reply(question: &Question, random: &dyn RandomSource) -> DraftReply {
    match best_match(question) {
        Some((category, score)) => {
            let reply = category.responses[random.pick(category.responses.len())];
            DraftReply {
                reply: reply.to_string(),
                confidence: match_confidence(score),
                category: category.name.to_string(),
                score,
                requires_human_review: false,
            }
        }
        None => {
            let fallback = fallback_for(question);
            DraftReply {
                reply: fallback.reply().to_string(),
                confidence: FALLBACK_CONFIDENCE,
                category: fallback.as_str().to_string(),
                score: 0,
                requires_human_review: true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionStatus;
    use crate::random::FixedRandom;
    use chrono::Utc;

    fn question(text: &str, category: &str, urgent: bool) -> Question {
        Question {
            id: "q1".to_string(),
            user_id: "u1".to_string(),
            user_name: None,
            text: text.to_string(),
            category: category.to_string(),
            status: QuestionStatus::Pending,
            urgent,
            ai_response: None,
            ai_confidence: None,
            ai_category: None,
            requires_human_review: false,
            admin_response: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn whole_word_and_substring_scores_differ() {
        let technical = &CATEGORIES[0];
        // "app" whole word (3) + "crash" inside "crashing" (2)
        assert_eq!(
            score(technical, "general", "my app keeps crashing when i open it"),
            5
        );
        assert_eq!(score(technical, "technical", "hello"), 3);
    }

    #[test]
    fn keyword_match_selects_category_with_scaled_confidence() {
        let q = question("My app keeps crashing when I open it", "general", false);
        let draft = draft_reply(&q, &FixedRandom(0.0));
        assert_eq!(draft.category, "technical");
        assert_eq!(draft.score, 5);
        assert!((draft.confidence - 0.95).abs() < 1e-9);
        assert!(!draft.requires_human_review);
        assert_eq!(draft.reply, CATEGORIES[0].responses[0]);
    }

    #[test]
    fn category_name_alone_is_enough() {
        let q = question("hello there, quick question about things", "Payment", false);
        let draft = draft_reply(&q, &FixedRandom(0.9));
        assert_eq!(draft.category, "payment");
        assert!((draft.confidence - 0.85).abs() < 1e-9);
        assert_eq!(draft.reply, CATEGORIES[4].responses[1]);
    }

    #[test]
    fn ties_go_to_the_earlier_category() {
        let q = question("tutor video", "general", false);
        let (category, score) = best_match(&q).unwrap();
        assert_eq!(category.name, "tutoring");
        assert_eq!(score, 3);
    }

    #[test]
    fn fallback_order() {
        let urgent = question("I would like to know more about your platform please", "", true);
        assert_eq!(fallback_for(&urgent), Fallback::Urgent);

        assert_eq!(fallback_for(&question("Help!!", "", false)), Fallback::Short);

        let broken = question("Something is not working on my end today", "", false);
        assert_eq!(fallback_for(&broken), Fallback::Technical);

        let general = question("I would like to know more about your platform please", "", false);
        assert_eq!(fallback_for(&general), Fallback::General);
    }

    #[test]
    fn fallback_requires_review() {
        let q = question("I would like to know more about your platform please", "", false);
        let draft = draft_reply(&q, &FixedRandom(0.3));
        assert_eq!(draft.reply, GENERAL_REPLY);
        assert_eq!(draft.confidence, FALLBACK_CONFIDENCE);
        assert!(draft.requires_human_review);
    }
}
