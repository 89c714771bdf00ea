// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{extract::State, Json};

use crate::api::response::{ok, ApiResult};
use crate::api::AppState;
use crate::models::AutomationSettings;

pub async fn get_automation(State(state): State<AppState>) -> ApiResult<AutomationSettings> {
    ok(state.router.load_settings().await?)
}

pub async fn put_automation(
    State(state): State<AppState>,
    Json(settings): Json<AutomationSettings>,
) -> ApiResult<AutomationSettings> {
    state.router.save_settings(&settings).await?;
    ok(settings)
}
