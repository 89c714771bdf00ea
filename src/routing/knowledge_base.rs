// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Canned support knowledge used by the question classifier.

/// One topic the router can answer on its own
#[derive(Debug)]
pub struct Category {
    pub name: &'static str,
    pub patterns: &'static [&'static str],
    pub responses: &'static [&'static str],
}

/// Earlier entries win ties
pub const CATEGORIES: &[Category] = &[
    Category {
        name: "technical",
        patterns: &[
            "app", "crash", "loading", "video won't play", "upload", "download", "slow", "freeze",
            "login",
        ],
        responses: &[
            "Sorry about the trouble. Please update the app to the latest version, then restart your device. If the problem continues, clear the app cache from your device settings.",
            "Most playback and upload issues are fixed by switching to a stable connection and reopening the app. Let us know if it keeps happening and we will take a closer look.",
        ],
    },
    Category {
        name: "account",
        patterns: &[
            "password", "account", "profile", "email", "sign in", "sign up", "delete my", "username",
        ],
        responses: &[
            "You can change your profile details and email from Settings > Account. To reset your password, use \"Forgot password\" on the sign-in screen.",
            "Account changes are available under Settings > Account. If you cannot sign in at all, reply here with the email you registered with.",
        ],
    },
    Category {
        name: "tutoring",
        patterns: &["tutor", "session", "booking", "book", "schedule", "lesson", "teacher"],
        responses: &[
            "To book a session, open a tutor's profile and pick one of their available slots. You can reschedule from My Sessions up to 24 hours before the start.",
            "Tutors set their own availability. If none of the slots suit you, send the tutor a message from their profile to arrange a time.",
        ],
    },
    Category {
        name: "content",
        patterns: &["resource", "notes", "pdf", "material", "course", "quiz", "video"],
        responses: &[
            "All study resources and videos are listed in the Library, filtered by subject. Use the search bar to find a specific topic.",
            "If a resource is missing or incorrect, use the report button on the item and our moderators will review it.",
        ],
    },
    Category {
        name: "payment",
        patterns: &[
            "payment", "pay", "refund", "charge", "charged", "subscription", "billing", "price",
            "card",
        ],
        responses: &[
            "You can view and manage your subscription under Settings > Billing. Refund requests are reviewed within 3 to 5 business days.",
            "Payment problems are usually resolved by re-adding your card under Settings > Billing. If you were charged twice, reply with the date and we will refund the duplicate.",
        ],
    },
];

pub const URGENT_REPLY: &str = "Thanks for flagging this as urgent. A member of our support team has been notified and will get back to you as soon as possible.";

pub const SHORT_REPLY: &str = "Thanks for reaching out! Could you share a few more details about what you need help with so we can point you in the right direction?";

pub const TECHNICAL_REPLY: &str = "Sorry you ran into a problem. Please try restarting the app and checking your connection. If it still fails, reply with the steps that lead to the error and our team will investigate.";

pub const GENERAL_REPLY: &str = "Thanks for your question! Our support team has received it and will follow up shortly. In the meantime, the Help Centre covers the most common topics.";

/// Substrings that suggest something is broken
pub const FAILURE_MARKERS: &[&str] = &[
    "error",
    "fail",
    "broken",
    "crash",
    "not working",
    "doesn't work",
    "bug",
];

pub fn category(name: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}
