use super::{DeleteConfirmation, FormState, TableState};
use crate::{
    core::{
        creators::{self, BulkCreatorInput, CreatorFields},
        dates,
    },
    entities::{ContactSource, CreatorModel},
    errors::Result,
    store::{RecordStore, Subscription},
};
use chrono::Local;

/// Creator form values.
///
/// When creating, `name` and `phone_number` hold one entry per line; when editing
/// they hold a single value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatorDraft {
    /// Name(s)
    pub name: String,
    /// Phone number(s), used for WA contacts only
    pub phone_number: String,
    /// Contact channel
    pub source: ContactSource,
    /// `YYYY-MM-DD`
    pub date_contacted: String,
}

impl Default for CreatorDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            phone_number: String::new(),
            source: ContactSource::TikTok,
            date_contacted: dates::format_form_date(dates::today()),
        }
    }
}

/// Creator outreach page.
#[derive(Debug)]
pub struct CreatorHubScreen {
    store: RecordStore,
    creators: Subscription<CreatorModel>,
    /// Bulk-create / edit modal
    pub form: FormState<CreatorDraft>,
    /// Delete prompt
    pub delete: DeleteConfirmation,
}

impl CreatorHubScreen {
    /// Mounts the page and subscribes to the creator list.
    #[must_use]
    pub fn mount(store: &RecordStore) -> Self {
        Self {
            store: store.clone(),
            creators: store.subscribe(creators::creators_query()),
            form: FormState::default(),
            delete: DeleteConfirmation::default(),
        }
    }

    /// Creators, newest first.
    #[must_use]
    pub fn rows(&self) -> Vec<CreatorModel> {
        self.creators.rows()
    }

    /// Table area state.
    #[must_use]
    pub fn table_state(&self) -> TableState {
        if self.creators.is_loading() {
            return TableState::Loading;
        }
        self.creators.with_rows(|rows| TableState::loaded(rows.len()))
    }

    /// Opens the edit form for `creator`.
    pub fn open_edit(&mut self, creator: &CreatorModel) {
        self.form.open_edit(
            &creator.id,
            CreatorDraft {
                name: creator.name.clone(),
                phone_number: creator.phone_number.clone().unwrap_or_default(),
                source: creator.source,
                date_contacted: dates::stored_to_form(&Local, creator.date_contacted),
            },
        );
    }

    /// Creates every listed creator (create form) or updates one (edit form), then
    /// closes the form. Returns how many creators were written.
    pub async fn submit(&mut self) -> Result<usize> {
        let written = match &self.form {
            FormState::Closed => return Ok(0),
            FormState::Creating(draft) => {
                let input = BulkCreatorInput {
                    names: draft.name.clone(),
                    phones: draft.phone_number.clone(),
                    source: draft.source,
                    date_contacted: dates::parse_form_date(&draft.date_contacted)?,
                };
                creators::create_creators_bulk(&self.store, &input).await?.len()
            }
            FormState::Editing { id, draft } => {
                let fields = CreatorFields {
                    name: draft.name.clone(),
                    source: draft.source,
                    phone_number: draft.phone_number.clone(),
                    date_contacted: dates::parse_form_date(&draft.date_contacted)?,
                };
                creators::update_creator(&self.store, id, &fields).await?;
                1
            }
        };
        self.form.close();
        Ok(written)
    }

    /// Deletes the creator awaiting confirmation, if any.
    pub async fn confirm_delete(&mut self) -> Result<()> {
        match self.delete.confirm() {
            Some(id) => creators::delete_creator(&self.store, &id).await,
            None => Ok(()),
        }
    }

    /// Waits for the next push.
    pub async fn next_update(&mut self) -> bool {
        self.creators.changed().await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Error;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_bulk_create_from_form() -> Result<()> {
        let store = setup_test_store().await?;
        let mut screen = CreatorHubScreen::mount(&store);

        screen.form.open_create();
        let result = screen.submit().await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { message } if message == "Silakan masukkan setidaknya satu nama kreator."
        ));
        assert!(screen.form.is_open());

        let draft = screen.form.draft_mut().unwrap();
        draft.name = "Alice\nBob\n\nCarol".to_string();
        draft.phone_number = "111\n222".to_string();
        draft.source = ContactSource::WhatsApp;
        assert_eq!(screen.submit().await?, 3);
        assert!(!screen.form.is_open());

        let rows = within(screen.creators.wait_until(|rows| rows.len() == 3))
            .await
            .unwrap();
        let carol = rows.iter().find(|c| c.name == "Carol").unwrap();
        assert_eq!(carol.phone_number, None);

        screen.open_edit(carol);
        assert_eq!(screen.form.draft().unwrap().phone_number, "");
        screen.form.draft_mut().unwrap().phone_number = "333".to_string();
        assert_eq!(screen.submit().await?, 1);
        within(screen.creators.wait_until(|rows| {
            rows.iter()
                .any(|c| c.name == "Carol" && c.phone_number.as_deref() == Some("333"))
        }))
        .await
        .unwrap();

        screen.delete.request(&carol.id);
        screen.confirm_delete().await?;
        within(screen.creators.wait_until(|rows| rows.len() == 2)).await.unwrap();
        Ok(())
    }
}
