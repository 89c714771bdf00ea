// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

pub mod analytics;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod integrity;
pub mod metrics;
pub mod models;
pub mod random;
pub mod routing;
pub mod schema;
pub mod snapshot;
pub mod store;
pub mod worker;
