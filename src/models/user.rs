// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::DocPath;

pub const USERS: &str = "users";
/// Helpdesk volunteer applications, keyed by their own id and linked through `userId`
pub const HELPDESK_APPLICATIONS: &str = "helpdeskApplications";
/// Approved helpdesk helpers, linked through `userId`
pub const HELPDESK_HELPERS: &str = "helpdeskHelpers";
/// Per-user chat room index, a subcollection of the user document
pub const CHAT_ROOMS: &str = "chatRooms";

/// A platform account as stored in the `users` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_tutor: bool,
    #[serde(default)]
    pub is_admin: bool,
    /// Signup time
    #[serde(rename = "createdAt")]
    pub joined_at: DateTime<Utc>,
    #[serde(default)]
    pub last_active: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn path(&self) -> DocPath {
        DocPath::new(USERS, &self.id)
    }

    pub fn is_student(&self) -> bool {
        !self.is_tutor && !self.is_admin
    }
}
