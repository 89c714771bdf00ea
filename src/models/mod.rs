// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

pub mod user;
pub mod content;
pub mod question;
pub mod notification;
pub mod settings;
pub mod insight;

pub use content::{Comment, ContentItem, ContentKind, Report};
pub use insight::{Insight, InsightType, Priority};
pub use notification::Notification;
pub use question::{Question, QuestionAction, QuestionStatus};
pub use settings::AutomationSettings;
pub use user::UserProfile;

use serde::{Deserialize, Deserializer};

/// Deserialize a denormalized counter, tolerating floats and clamping negatives to zero.
///
/// Counters are mutated with atomic increments by several moderators at once, so a stored value
/// can transiently drop below zero.
pub(crate) fn counter<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let count = match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        _ => 0,
    };
    Ok(count.max(0) as u64)
}
