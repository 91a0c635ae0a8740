//! Event publisher that records domain events in the structured log

use crate::domain::{EventPublisher, PlanningEvent};
use async_trait::async_trait;

/// Emits every domain event as a `tracing` record on the `planning_events`
/// target, with the serialized event as the `event` field
pub struct LoggingEventPublisher;

#[async_trait]
impl EventPublisher for LoggingEventPublisher {
    async fn publish(&self, event: PlanningEvent) -> anyhow::Result<()> {
        let payload = serde_json::to_string(&event)?;
        tracing::info!(
            target: "planning_events",
            event_type = event.event_type(),
            event = %payload,
            "domain event"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publishes_every_event_kind() {
        let publisher = LoggingEventPublisher;
        let events = vec![
            PlanningEvent::created("plan", 1, "admin"),
            PlanningEvent::updated("plan", 1, "admin"),
            PlanningEvent::deleted("plan", 1, "admin"),
            PlanningEvent::alignments_replaced(3, 2, vec![7, 8], "planner"),
        ];

        for event in events {
            assert!(publisher.publish(event).await.is_ok());
        }
    }
}
