// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

pub mod analytics;
pub mod health;
pub mod moderation;
pub mod questions;
pub mod settings;
