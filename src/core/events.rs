//! Affiliate event business logic.

use crate::{
    core::{dates, ensure_deleted, required},
    entities::{AffiliateEvent, EventStatus, EventType, affiliate_event},
    errors::{Error, Result},
    store::RecordStore,
};
use chrono::{Local, NaiveDate};
use sea_orm::{QueryOrder, Select, Set, prelude::*};
use tracing::{info, instrument, warn};

const TOPIC_REQUIRED: &str = "Topik kegiatan tidak boleh kosong.";
const REASON_REQUIRED: &str = "Alasan pembatalan tidak boleh kosong.";

/// Fields of the event form. Status is never edited here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFields {
    /// Discussion topic
    pub topic: String,
    /// Kind of event
    pub event_type: EventType,
    /// Event day
    pub event_date: NaiveDate,
}

impl EventFields {
    fn apply(&self, model: &mut affiliate_event::ActiveModel) -> Result<()> {
        model.topic = Set(required(&self.topic, TOPIC_REQUIRED)?);
        model.event_type = Set(self.event_type);
        model.event_date = Set(dates::to_stored(&Local, self.event_date)?);
        Ok(())
    }
}

/// All events, latest event date first.
#[must_use]
pub fn events_query() -> Select<AffiliateEvent> {
    AffiliateEvent::find().order_by_desc(affiliate_event::Column::EventDate)
}

/// Events still waiting to happen, soonest first (drives the sidebar badge).
#[must_use]
pub fn scheduled_events_query() -> Select<AffiliateEvent> {
    AffiliateEvent::find()
        .filter(affiliate_event::Column::Status.eq(EventStatus::Scheduled))
        .order_by_asc(affiliate_event::Column::EventDate)
}

/// Looks up an event by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_event(store: &RecordStore, id: &str) -> Result<Option<affiliate_event::Model>> {
    AffiliateEvent::find_by_id(id.to_string())
        .one(store.connection())
        .await
        .map_err(Into::into)
}

async fn find_event(store: &RecordStore, id: &str) -> Result<affiliate_event::Model> {
    get_event(store, id)
        .await?
        .ok_or_else(|| Error::not_found("affiliate event", id))
}

/// Only scheduled events can be completed or cancelled.
fn check_transition(event: &affiliate_event::Model, to: EventStatus) -> Result<()> {
    if event.status == EventStatus::Scheduled {
        return Ok(());
    }
    warn!(
        "Rejected status change of event {} from {} to {}",
        event.id, event.status, to
    );
    Err(Error::InvalidTransition {
        from: event.status.to_string(),
        to: to.to_string(),
    })
}

/// Schedules a new event.
///
/// # Errors
/// Returns `Error::Validation` if the topic is blank.
pub async fn create_event(
    store: &RecordStore,
    fields: &EventFields,
) -> Result<affiliate_event::Model> {
    let mut model = affiliate_event::ActiveModel {
        status: Set(EventStatus::Scheduled),
        cancellation_reason: Set(None),
        ..Default::default()
    };
    fields.apply(&mut model)?;
    let event = store.create(model).await?;
    info!(
        "Scheduled {} '{}' for {}",
        event.event_type,
        event.topic,
        dates::stored_to_form(&Local, event.event_date)
    );
    Ok(event)
}

/// Edits topic, type and date. Status and cancellation reason are untouched.
///
/// # Errors
/// Returns `Error::Validation` if the topic is blank and `Error::NotFound` if the event is gone.
pub async fn update_event(
    store: &RecordStore,
    id: &str,
    fields: &EventFields,
) -> Result<affiliate_event::Model> {
    let mut model: affiliate_event::ActiveModel = find_event(store, id).await?.into();
    fields.apply(&mut model)?;
    store.update(model).await
}

/// Marks a scheduled event as held.
///
/// # Errors
/// Returns `Error::InvalidTransition` unless the event is scheduled.
pub async fn complete_event(store: &RecordStore, id: &str) -> Result<affiliate_event::Model> {
    let event = find_event(store, id).await?;
    check_transition(&event, EventStatus::Completed)?;

    let mut model: affiliate_event::ActiveModel = event.into();
    model.status = Set(EventStatus::Completed);
    let event = store.update(model).await?;
    info!("Event {} completed", event.id);
    Ok(event)
}

/// Cancels a scheduled event with a reason. A reschedule date, if given, replaces
/// the event date.
///
/// # Errors
/// Returns `Error::Validation` for a blank reason and `Error::InvalidTransition`
/// unless the event is scheduled.
#[instrument(skip(store, reason))]
pub async fn cancel_event(
    store: &RecordStore,
    id: &str,
    reason: &str,
    reschedule: Option<NaiveDate>,
) -> Result<affiliate_event::Model> {
    let reason = required(reason, REASON_REQUIRED)?;
    let event = find_event(store, id).await?;
    check_transition(&event, EventStatus::Cancelled)?;

    let mut model: affiliate_event::ActiveModel = event.into();
    model.status = Set(EventStatus::Cancelled);
    model.cancellation_reason = Set(Some(reason));
    if let Some(date) = reschedule {
        model.event_date = Set(dates::to_stored(&Local, date)?);
    }
    let event = store.update(model).await?;
    info!("Event {} cancelled", event.id);
    Ok(event)
}

/// Irreversibly deletes an event.
///
/// # Errors
/// Returns `Error::NotFound` if no event has this id.
pub async fn delete_event(store: &RecordStore, id: &str) -> Result<()> {
    let rows = store.delete::<AffiliateEvent>(id).await?;
    ensure_deleted(rows, "affiliate event", id)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn fields(topic: &str, event_date: NaiveDate) -> EventFields {
        EventFields {
            topic: topic.to_string(),
            event_type: EventType::Webinar,
            event_date,
        }
    }

    #[tokio::test]
    async fn test_create_event_requires_topic() -> Result<()> {
        let store = RecordStore::new(MockDatabase::new(DatabaseBackend::Sqlite).into_connection());
        let result = create_event(&store, &fields("   ", day(2024, 7, 1))).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { message } if message == TOPIC_REQUIRED
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_requires_reason() -> Result<()> {
        let store = RecordStore::new(MockDatabase::new(DatabaseBackend::Sqlite).into_connection());
        let result = cancel_event(&store, "e1", " \t ", None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { message } if message == REASON_REQUIRED
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_event_lifecycle() -> Result<()> {
        let store = setup_test_store().await?;

        let event = create_event(&store, &fields("Live jualan serum", day(2024, 7, 1))).await?;
        assert_eq!(event.status, EventStatus::Scheduled);
        assert!(event.cancellation_reason.is_none());

        let edited = update_event(
            &store,
            &event.id,
            &EventFields {
                topic: "Live jualan toner".to_string(),
                event_type: EventType::Kopdar,
                event_date: day(2024, 7, 2),
            },
        )
        .await?;
        assert_eq!(edited.topic, "Live jualan toner");
        assert_eq!(edited.event_type, EventType::Kopdar);
        assert_eq!(edited.status, EventStatus::Scheduled);

        let completed = complete_event(&store, &event.id).await?;
        assert_eq!(completed.status, EventStatus::Completed);

        let result = cancel_event(&store, &event.id, "Hujan", None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidTransition { from, to } if from == "completed" && to == "cancelled"
        ));
        assert!(matches!(
            complete_event(&store, &event.id).await.unwrap_err(),
            Error::InvalidTransition { from: _, to: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_with_reschedule() -> Result<()> {
        let store = setup_test_store().await?;
        let event = create_event(&store, &fields("Seminar kulit", day(2024, 7, 1))).await?;

        let cancelled =
            cancel_event(&store, &event.id, "  Pembicara sakit ", Some(day(2024, 7, 15))).await?;

        assert_eq!(cancelled.status, EventStatus::Cancelled);
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("Pembicara sakit"));
        assert_eq!(dates::calendar_day(&Local, cancelled.event_date), day(2024, 7, 15));

        let other = create_event(&store, &fields("Kopdar", day(2024, 8, 1))).await?;
        let kept = cancel_event(&store, &other.id, "Batal", None).await?;
        assert_eq!(dates::calendar_day(&Local, kept.event_date), day(2024, 8, 1));

        Ok(())
    }

    #[tokio::test]
    async fn test_scheduled_events_query_counts_pending_only() -> Result<()> {
        let store = setup_test_store().await?;
        let first = create_event(&store, &fields("A", day(2024, 7, 3))).await?;
        let second = create_event(&store, &fields("B", day(2024, 7, 1))).await?;
        let third = create_event(&store, &fields("C", day(2024, 7, 2))).await?;
        complete_event(&store, &first.id).await?;

        let pending = scheduled_events_query().all(store.connection()).await?;
        let ids: Vec<&str> = pending.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), third.id.as_str()]);

        let all = events_query().all(store.connection()).await?;
        assert_eq!(all.first().unwrap().id, first.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_event() -> Result<()> {
        let store = setup_test_store().await?;
        let event = create_event(&store, &fields("A", day(2024, 7, 3))).await?;

        delete_event(&store, &event.id).await?;

        assert!(get_event(&store, &event.id).await?.is_none());
        assert!(matches!(
            delete_event(&store, &event.id).await.unwrap_err(),
            Error::NotFound { entity: _, id: _ }
        ));
        Ok(())
    }
}
