//! Domain events for the planning service
//!
//! Events are emitted after every successful write:
//! - Record events: created, updated, soft-deleted
//! - Alignment events: a new weight generation replaced the previous one
//! - Attachment events: a file was stored and registered

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Domain event types for planning records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PlanningEvent {
    /// Record was created
    RecordCreated(RecordEvent),
    /// Record was partially updated
    RecordUpdated(RecordEvent),
    /// Record was soft-deleted
    RecordDeleted(RecordEvent),
    /// Alignment set of a strategic objective was replaced
    AlignmentsReplaced(AlignmentsReplacedEvent),
    /// Attachment content was stored and registered
    AttachmentUploaded(AttachmentUploadedEvent),
}

/// Event data for single-record changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEvent {
    /// Resource name (plan, project, ...)
    pub resource: String,
    pub record_id: i32,
    /// Subject who performed the action
    pub actor: String,
    pub timestamp: DateTime<Utc>,
}

/// Event data for a bulk alignment replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentsReplacedEvent {
    pub strategic_objective_id: i32,
    /// Number of alignments soft-deleted by the replacement
    pub superseded: u64,
    /// Identifiers of the new generation
    pub alignment_ids: Vec<i32>,
    pub actor: String,
    pub timestamp: DateTime<Utc>,
}

/// Event data for an attachment upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentUploadedEvent {
    pub attachment_id: i32,
    pub project_id: i32,
    pub storage_key: String,
    pub size_bytes: i64,
    pub actor: String,
    pub timestamp: DateTime<Utc>,
}

/// Event publisher trait for publishing domain events
///
/// Publishing is best effort: callers log failures and never fail the
/// operation that produced the event.
#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: PlanningEvent) -> anyhow::Result<()>;
}

/// No-op event publisher for testing or when events are disabled
pub struct NoOpEventPublisher;

#[async_trait::async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, _event: PlanningEvent) -> anyhow::Result<()> {
        Ok(())
    }
}

impl PlanningEvent {
    pub fn created(resource: &str, record_id: i32, actor: &str) -> Self {
        Self::RecordCreated(RecordEvent::new(resource, record_id, actor))
    }

    pub fn updated(resource: &str, record_id: i32, actor: &str) -> Self {
        Self::RecordUpdated(RecordEvent::new(resource, record_id, actor))
    }

    pub fn deleted(resource: &str, record_id: i32, actor: &str) -> Self {
        Self::RecordDeleted(RecordEvent::new(resource, record_id, actor))
    }

    pub fn alignments_replaced(
        strategic_objective_id: i32,
        superseded: u64,
        alignment_ids: Vec<i32>,
        actor: &str,
    ) -> Self {
        Self::AlignmentsReplaced(AlignmentsReplacedEvent {
            strategic_objective_id,
            superseded,
            alignment_ids,
            actor: actor.to_string(),
            timestamp: Utc::now(),
        })
    }

    pub fn attachment_uploaded(
        attachment: &crate::contract::Attachment,
        actor: &str,
    ) -> Self {
        Self::AttachmentUploaded(AttachmentUploadedEvent {
            attachment_id: attachment.id,
            project_id: attachment.project_id,
            storage_key: attachment.storage_key.clone(),
            size_bytes: attachment.size_bytes,
            actor: actor.to_string(),
            timestamp: Utc::now(),
        })
    }

    /// Snake-case event type, as serialized in the `event_type` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RecordCreated(_) => "record_created",
            Self::RecordUpdated(_) => "record_updated",
            Self::RecordDeleted(_) => "record_deleted",
            Self::AlignmentsReplaced(_) => "alignments_replaced",
            Self::AttachmentUploaded(_) => "attachment_uploaded",
        }
    }
}

impl RecordEvent {
    fn new(resource: &str, record_id: i32, actor: &str) -> Self {
        Self {
            resource: resource.to_string(),
            record_id,
            actor: actor.to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_event_creation() {
        let event = PlanningEvent::created("project", 12, "planner-1");

        match event {
            PlanningEvent::RecordCreated(e) => {
                assert_eq!(e.resource, "project");
                assert_eq!(e.record_id, 12);
                assert_eq!(e.actor, "planner-1");
            }
            _ => panic!("Expected RecordCreated event"),
        }
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = PlanningEvent::alignments_replaced(5, 3, vec![10, 11], "planner-1");
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event_type"], event.event_type());
        assert_eq!(json["strategic_objective_id"], 5);
        assert_eq!(json["superseded"], 3);
        assert_eq!(json["alignment_ids"], serde_json::json!([10, 11]));
    }

    #[tokio::test]
    async fn test_noop_event_publisher() {
        let publisher = NoOpEventPublisher;
        let event = PlanningEvent::deleted("plan", 1, "admin");

        assert!(publisher.publish(event).await.is_ok());
    }
}
