// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Performance,
    Engagement,
    Sentiment,
    Prediction,
    Anomaly,
}

/// Ordered so that `High > Medium > Low`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Derived analytical artifact shown to administrators. Recomputed on every run, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InsightType,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Insight {
    pub fn new(
        kind: InsightType,
        priority: Priority,
        title: impl Into<String>,
        description: impl Into<String>,
        payload: serde_json::Value,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            priority,
            title: title.into(),
            description: description.into(),
            payload,
            created_at,
        }
    }
}
