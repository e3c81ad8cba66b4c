//! Audit and soft-delete trails shared by every entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::actor::Actor;
use super::document::wire_time;

/// Creation audit stub: who created the record.
///
/// Captured once from the session snapshot at `create` time and never
/// altered by subsequent updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedBy {
    /// Provider uid of the creating actor.
    pub uid: String,
    /// Email of the creating actor, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name of the creating actor, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl From<&Actor> for CreatedBy {
    fn from(actor: &Actor) -> Self {
        Self {
            uid: actor.uid().to_owned(),
            email: actor.email().map(str::to_owned),
            display_name: actor.display_name().map(str::to_owned),
        }
    }
}

/// Server-assigned audit fields present on every record.
///
/// All three fields are written by the repository, never by entity
/// constructors: `created_by` comes from the session snapshot and the
/// timestamps from the store clock. Drafts therefore carry `None`
/// everywhere until the first successful write. Reads accept the older
/// `createdAt`/`updatedAt` spellings some collections still carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditTrail {
    /// Creating actor stub, or `None` when no session was active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<CreatedBy>,
    /// Set exactly once, at creation.
    #[serde(
        default,
        alias = "createdAt",
        with = "wire_time::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_created: Option<DateTime<Utc>>,
    /// Bumped on every successful update, including soft-delete and restore.
    #[serde(
        default,
        alias = "updatedAt",
        with = "wire_time::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_updated: Option<DateTime<Utc>>,
}

/// Soft-delete marker carried by clients and users.
///
/// `is_deleted == true` exactly when `date_deleted` is set; restore clears
/// both. `date_deleted` serialises as an explicit `null` when cleared so a
/// restore write erases the old value remotely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoftDeleteTrail {
    /// Whether the record is hidden from active listings.
    #[serde(default)]
    pub is_deleted: bool,
    /// When the record was soft-deleted, if it is.
    #[serde(default, with = "wire_time::option")]
    pub date_deleted: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn created_by_copies_the_actor_snapshot() {
        let actor = Actor::new("uid-1")
            .with_email("agent@example.com")
            .with_display_name("Agent");
        let stub = CreatedBy::from(&actor);
        assert_eq!(stub.uid, "uid-1");
        assert_eq!(stub.email.as_deref(), Some("agent@example.com"));
        assert_eq!(stub.display_name.as_deref(), Some("Agent"));
    }

    #[rstest]
    fn audit_trail_reads_legacy_timestamp_spellings() {
        let trail: AuditTrail = serde_json::from_value(json!({
            "createdAt": { "seconds": 1_700_000_000, "nanos": 0 },
            "updatedAt": "2023-11-14T22:13:20Z",
        }))
        .expect("decodes");
        assert_eq!(trail.date_created.map(|at| at.timestamp()), Some(1_700_000_000));
        assert_eq!(trail.date_updated.map(|at| at.timestamp()), Some(1_700_000_000));
    }

    #[rstest]
    fn cleared_soft_delete_serialises_an_explicit_null() {
        let trail = SoftDeleteTrail::default();
        let value = serde_json::to_value(&trail).expect("serialises");
        assert_eq!(value, json!({ "is_deleted": false, "date_deleted": null }));
    }
}
