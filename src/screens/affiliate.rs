use super::{DeleteConfirmation, FormState, TableState};
use crate::{
    core::{
        dates,
        events::{self, EventFields},
    },
    entities::{AffiliateEventModel, EventType},
    errors::Result,
    store::{RecordStore, Subscription},
};
use chrono::Local;

/// Event form values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    /// Discussion topic
    pub topic: String,
    /// Kind of event
    pub event_type: EventType,
    /// `YYYY-MM-DD`
    pub event_date: String,
}

impl Default for EventDraft {
    fn default() -> Self {
        Self {
            topic: String::new(),
            event_type: EventType::Webinar,
            event_date: dates::format_form_date(dates::today()),
        }
    }
}

impl EventDraft {
    fn to_fields(&self) -> Result<EventFields> {
        Ok(EventFields {
            topic: self.topic.clone(),
            event_type: self.event_type,
            event_date: dates::parse_form_date(&self.event_date)?,
        })
    }
}

/// Values of the cancellation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelDraft {
    /// Event being cancelled
    pub event_id: String,
    /// Required reason
    pub reason: String,
    /// Optional new date, `YYYY-MM-DD`; blank keeps the current date
    pub reschedule: String,
}

/// Affiliate service page.
#[derive(Debug)]
pub struct AffiliateScreen {
    store: RecordStore,
    events: Subscription<AffiliateEventModel>,
    /// Only this event type, `None` for all
    pub type_filter: Option<EventType>,
    /// Create/edit modal
    pub form: FormState<EventDraft>,
    /// Open cancellation dialog
    pub cancel_dialog: Option<CancelDraft>,
    /// Delete prompt
    pub delete: DeleteConfirmation,
}

impl AffiliateScreen {
    /// Mounts the page and subscribes to all events.
    #[must_use]
    pub fn mount(store: &RecordStore) -> Self {
        Self {
            store: store.clone(),
            events: store.subscribe(events::events_query()),
            type_filter: None,
            form: FormState::default(),
            cancel_dialog: None,
            delete: DeleteConfirmation::default(),
        }
    }

    /// Events of the selected type, latest event date first.
    #[must_use]
    pub fn rows(&self) -> Vec<AffiliateEventModel> {
        self.events.with_rows(|rows| {
            rows.iter()
                .filter(|event| self.type_filter.is_none_or(|t| t == event.event_type))
                .cloned()
                .collect()
        })
    }

    /// Table area state.
    #[must_use]
    pub fn table_state(&self) -> TableState {
        if self.events.is_loading() {
            return TableState::Loading;
        }
        TableState::loaded(self.rows().len())
    }

    /// Opens the edit form for `event`.
    pub fn open_edit(&mut self, event: &AffiliateEventModel) {
        self.form.open_edit(
            &event.id,
            EventDraft {
                topic: event.topic.clone(),
                event_type: event.event_type,
                event_date: dates::stored_to_form(&Local, event.event_date),
            },
        );
    }

    /// Saves the open form and closes it.
    pub async fn submit(&mut self) -> Result<()> {
        match &self.form {
            FormState::Closed => return Ok(()),
            FormState::Creating(draft) => {
                events::create_event(&self.store, &draft.to_fields()?).await?;
            }
            FormState::Editing { id, draft } => {
                events::update_event(&self.store, id, &draft.to_fields()?).await?;
            }
        }
        self.form.close();
        Ok(())
    }

    /// Marks a scheduled event as held.
    pub async fn mark_complete(&self, event_id: &str) -> Result<()> {
        events::complete_event(&self.store, event_id).await?;
        Ok(())
    }

    /// Opens the cancellation dialog for an event.
    pub fn open_cancel(&mut self, event_id: &str) {
        self.cancel_dialog = Some(CancelDraft {
            event_id: event_id.to_string(),
            reason: String::new(),
            reschedule: String::new(),
        });
    }

    /// Closes the cancellation dialog without cancelling.
    pub fn close_cancel(&mut self) {
        self.cancel_dialog = None;
    }

    /// Cancels the event in the dialog and closes it. The dialog stays open on error.
    pub async fn confirm_cancel(&mut self) -> Result<()> {
        let Some(dialog) = &self.cancel_dialog else {
            return Ok(());
        };
        let reschedule = match dialog.reschedule.trim() {
            "" => None,
            date => Some(dates::parse_form_date(date)?),
        };
        events::cancel_event(&self.store, &dialog.event_id, &dialog.reason, reschedule).await?;
        self.cancel_dialog = None;
        Ok(())
    }

    /// Deletes the event awaiting confirmation, if any.
    pub async fn confirm_delete(&mut self) -> Result<()> {
        match self.delete.confirm() {
            Some(id) => events::delete_event(&self.store, &id).await,
            None => Ok(()),
        }
    }

    /// Waits for the next push.
    pub async fn next_update(&mut self) -> bool {
        self.events.changed().await
    }
}
