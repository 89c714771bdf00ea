// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::store::DocPath;

pub const SETTINGS: &str = "settings";
pub const AUTOMATION_DOC: &str = "automation";

/// Administrator toggles for the automated parts of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutomationSettings {
    /// Gates the auto-reply step of question routing
    pub auto_reply: bool,
    pub smart_matching: bool,
    /// Gates anomaly detection in analytics runs
    pub content_moderation: bool,
    /// Gates forecasting in analytics runs
    pub predictive_analytics: bool,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            auto_reply: true,
            smart_matching: true,
            content_moderation: true,
            predictive_analytics: true,
        }
    }
}

impl AutomationSettings {
    pub fn path() -> DocPath {
        DocPath::new(SETTINGS, AUTOMATION_DOC)
    }
}
