// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Question routing: topic classification, automatic replies and the question lifecycle.

pub mod classifier;
pub mod engine;
pub mod knowledge_base;

pub use classifier::{draft_reply, DraftReply, Fallback};
pub use engine::{AutoReplySummary, QuestionRouter};
