// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use diesel::table;

// Every collection and subcollection of the document store shares this table. `collection` holds
// the full collection path, e.g. `videos/abc/comments`.
table! {
    documents (collection, id) {
        seq -> Int8,
        collection -> Text,
        id -> Text,
        data -> Jsonb,
        updated_at -> Timestamptz,
    }
}
