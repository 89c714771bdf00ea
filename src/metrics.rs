// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Process-wide admin service counters
pub static METRICS: Lazy<AdminMetrics> =
    Lazy::new(|| AdminMetrics::new().expect("admin metric definitions are valid"));

pub struct AdminMetrics {
    registry: Registry,
    pub analytics_runs: IntCounter,
    pub auto_replies: IntCounter,
    /// Labelled by `kind` (content, user, comment, report) and `outcome` (ok, partial, failed)
    pub deletions: IntCounterVec,
    pub dependent_delete_failures: IntCounter,
}

impl AdminMetrics {
    fn new() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("tutorhub_admin".to_string()), None)?;

        let analytics_runs = IntCounter::new("analytics_runs_total", "Completed analytics runs")?;
        let auto_replies = IntCounter::new(
            "auto_replies_total",
            "Questions answered by the automatic reply router",
        )?;
        let deletions = IntCounterVec::new(
            Opts::new("deletions_total", "Administrative deletions by kind and outcome"),
            &["kind", "outcome"],
        )?;
        let dependent_delete_failures = IntCounter::new(
            "dependent_delete_failures_total",
            "Dependent records that could not be removed during a cascade",
        )?;

        registry.register(Box::new(analytics_runs.clone()))?;
        registry.register(Box::new(auto_replies.clone()))?;
        registry.register(Box::new(deletions.clone()))?;
        registry.register(Box::new(dependent_delete_failures.clone()))?;

        Ok(Self {
            registry,
            analytics_runs,
            auto_replies,
            deletions,
            dependent_delete_failures,
        })
    }

    pub fn record_deletion(&self, kind: &str, outcome: &str) {
        self.deletions.with_label_values(&[kind, outcome]).inc();
    }

    /// Text exposition format for `/metrics`
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_registered_counters() {
        METRICS.record_deletion("comment", "ok");
        let text = METRICS.render().unwrap();
        assert!(text.contains("tutorhub_admin_deletions_total"));
        assert!(text.contains("tutorhub_admin_analytics_runs_total"));
    }
}
