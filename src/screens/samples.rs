use super::{DeleteConfirmation, FormState, TableState, known_name};
use crate::{
    core::{
        UNKNOWN_NAME,
        creators::creators_by_name_query,
        dates,
        samples::{self, SampleAutofill, SampleFields},
    },
    entities::{CreatorModel, CreatorSampleModel},
    errors::Result,
    store::{RecordStore, Subscription},
};
use chrono::{Local, NaiveDate};

/// Shipment form values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleDraft {
    /// Selected creator, empty until chosen
    pub creator_id: String,
    /// Name on the parcel
    pub recipient_name: String,
    /// Shipping address
    pub address: String,
    /// Courier phone number
    pub phone_number: String,
    /// Bottles shipped
    pub quantity: i64,
    /// `YYYY-MM-DD`
    pub date_sent: String,
}

impl Default for SampleDraft {
    fn default() -> Self {
        Self {
            creator_id: String::new(),
            recipient_name: String::new(),
            address: String::new(),
            phone_number: String::new(),
            quantity: 1,
            date_sent: dates::format_form_date(dates::today()),
        }
    }
}

impl SampleDraft {
    fn apply_autofill(&mut self, autofill: SampleAutofill) {
        self.recipient_name = autofill.recipient_name;
        self.address = autofill.address;
        self.phone_number = autofill.phone_number;
    }

    fn to_fields(&self) -> Result<SampleFields> {
        Ok(SampleFields {
            creator_id: self.creator_id.clone(),
            recipient_name: self.recipient_name.clone(),
            address: self.address.clone(),
            phone_number: self.phone_number.clone(),
            quantity: self.quantity,
            date_sent: dates::parse_form_date(&self.date_sent)?,
        })
    }
}

/// Table filters of the samples page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleFilter {
    /// Case-insensitive substring of the creator name
    pub search: String,
    /// Only this creator, `None` for all
    pub creator_id: Option<String>,
    /// First ship date, inclusive
    pub start: NaiveDate,
    /// Last ship date, inclusive
    pub end: NaiveDate,
}

impl SampleFilter {
    /// No search or creator filter, over the `days` days ending `today`.
    #[must_use]
    pub fn trailing(today: NaiveDate, days: u32) -> Self {
        let (start, end) = dates::trailing_range(today, days);
        Self {
            search: String::new(),
            creator_id: None,
            start,
            end,
        }
    }
}

/// A shipment with its creator's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRow {
    /// The shipment
    pub sample: CreatorSampleModel,
    /// Creator name, or `"Unknown"`
    pub creator_name: String,
}

/// Creator samples page.
#[derive(Debug)]
pub struct CreatorSamplesScreen {
    store: RecordStore,
    samples: Subscription<CreatorSampleModel>,
    creators: Subscription<CreatorModel>,
    /// Table filters
    pub filter: SampleFilter,
    /// Create/edit modal
    pub form: FormState<SampleDraft>,
    /// Delete prompt
    pub delete: DeleteConfirmation,
}

impl CreatorSamplesScreen {
    /// Mounts the page filtered to the `trailing_days` days ending today.
    #[must_use]
    pub fn mount(store: &RecordStore, trailing_days: u32) -> Self {
        Self {
            store: store.clone(),
            samples: store.subscribe(samples::samples_query()),
            creators: store.subscribe(creators_by_name_query()),
            filter: SampleFilter::trailing(dates::today(), trailing_days),
            form: FormState::default(),
            delete: DeleteConfirmation::default(),
        }
    }

    /// Creator select options, alphabetically.
    #[must_use]
    pub fn creators(&self) -> Vec<CreatorModel> {
        self.creators.rows()
    }

    /// Shipments passing the filters, newest first.
    ///
    /// # Errors
    /// Returns `Error::InvalidDate` if the date range has no local midnight.
    pub fn rows(&self) -> Result<Vec<SampleRow>> {
        let from = dates::start_of_day(&Local, self.filter.start)?;
        let until = dates::end_of_day(&Local, self.filter.end)?;
        let search = self.filter.search.trim().to_lowercase();

        Ok(self.samples.with_rows(|samples| {
            samples
                .iter()
                .filter(|sample| {
                    self.filter
                        .creator_id
                        .as_ref()
                        .is_none_or(|id| *id == sample.creator_id)
                        && sample.date_sent >= from
                        && sample.date_sent <= until
                })
                .filter_map(|sample| {
                    let name = known_name(&self.creators, &sample.creator_id);
                    // A missing creator only matches an empty search.
                    let matches = search.is_empty()
                        || name
                            .as_deref()
                            .is_some_and(|name| name.to_lowercase().contains(&search));
                    matches.then(|| SampleRow {
                        creator_name: name.unwrap_or_else(|| UNKNOWN_NAME.to_string()),
                        sample: sample.clone(),
                    })
                })
                .collect()
        }))
    }

    /// Bottles shipped across the filtered rows.
    ///
    /// # Errors
    /// Same as [`CreatorSamplesScreen::rows`].
    pub fn total_quantity(&self) -> Result<i64> {
        Ok(self.rows()?.iter().map(|row| row.sample.quantity).sum())
    }

    /// Table area state.
    #[must_use]
    pub fn table_state(&self) -> TableState {
        if self.samples.is_loading() {
            return TableState::Loading;
        }
        TableState::loaded(self.rows().map_or(0, |rows| rows.len()))
    }

    /// Picks the creator in the open form. A new shipment is pre-filled with the
    /// creator's last shipping details (cleared if the creator is unknown); an edited
    /// shipment keeps its own values.
    pub fn select_creator(&mut self, creator_id: &str) {
        let autofill = self.creators.with_rows(|creators| {
            creators
                .iter()
                .find(|creator| creator.id == creator_id)
                .map(samples::autofill_for)
                .unwrap_or_default()
        });
        match &mut self.form {
            FormState::Closed => {}
            FormState::Creating(draft) => {
                draft.creator_id = creator_id.to_string();
                draft.apply_autofill(autofill);
            }
            FormState::Editing { draft, .. } => draft.creator_id = creator_id.to_string(),
        }
    }

    /// Opens the edit form for `sample`.
    pub fn open_edit(&mut self, sample: &CreatorSampleModel) {
        self.form.open_edit(
            &sample.id,
            SampleDraft {
                creator_id: sample.creator_id.clone(),
                recipient_name: sample.recipient_name.clone(),
                address: sample.address.clone(),
                phone_number: sample.phone_number.clone().unwrap_or_default(),
                quantity: sample.quantity,
                date_sent: dates::stored_to_form(&Local, sample.date_sent),
            },
        );
    }

    /// Saves the shipment (refreshing the creator's cached details) and closes the form.
    pub async fn submit(&mut self) -> Result<()> {
        let (existing_id, draft) = match &self.form {
            FormState::Closed => return Ok(()),
            FormState::Creating(draft) => (None, draft),
            FormState::Editing { id, draft } => (Some(id.as_str()), draft),
        };
        samples::save_sample(&self.store, existing_id, &draft.to_fields()?).await?;
        self.form.close();
        Ok(())
    }

    /// Deletes the shipment awaiting confirmation, if any.
    pub async fn confirm_delete(&mut self) -> Result<()> {
        match self.delete.confirm() {
            Some(id) => samples::delete_sample(&self.store, &id).await,
            None => Ok(()),
        }
    }

    /// Waits for the next push on either list.
    pub async fn next_update(&mut self) -> bool {
        tokio::select! {
            alive = self.samples.changed() => alive,
            alive = self.creators.changed() => alive,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::ContactSource;
    use crate::errors::Error;
    use crate::test_utils::*;

    async fn ship(
        store: &RecordStore,
        creator_id: &str,
        quantity: i64,
        date_sent: NaiveDate,
    ) -> Result<CreatorSampleModel> {
        samples::save_sample(
            store,
            None,
            &SampleFields {
                creator_id: creator_id.to_string(),
                recipient_name: "Penerima".to_string(),
                address: "Jl. Kenanga 3".to_string(),
                phone_number: String::new(),
                quantity,
                date_sent,
            },
        )
        .await
    }

    async fn loaded(store: &RecordStore, samples: usize, creators: usize) -> CreatorSamplesScreen {
        let mut screen = CreatorSamplesScreen::mount(store, 30);
        within(screen.samples.wait_until(|rows| rows.len() == samples)).await;
        within(screen.creators.wait_until(|rows| rows.len() == creators)).await;
        screen
    }

    #[tokio::test]
    async fn test_filters_and_total_quantity() -> Result<()> {
        let store = setup_test_store().await?;
        let sari = create_test_creator(&store, "Sari Dewi", ContactSource::TikTok, None).await?;
        let budi = create_test_creator(&store, "Budi", ContactSource::TikTok, None).await?;
        ship(&store, &sari.id, 2, day(2024, 5, 1)).await?;
        ship(&store, &sari.id, 3, day(2024, 5, 20)).await?;
        ship(&store, &budi.id, 5, day(2024, 5, 10)).await?;
        assert!(ship(&store, "gone", 7, day(2024, 5, 10)).await.is_err());

        let mut screen = loaded(&store, 3, 2).await;
        screen.filter = SampleFilter {
            search: String::new(),
            creator_id: None,
            start: day(2024, 5, 1),
            end: day(2024, 5, 31),
        };
        assert_eq!(screen.total_quantity()?, 10);

        screen.filter.search = "DEWI".to_string();
        assert_eq!(screen.total_quantity()?, 5);
        assert!(screen.rows()?.iter().all(|row| row.creator_name == "Sari Dewi"));

        screen.filter.search.clear();
        screen.filter.creator_id = Some(budi.id.clone());
        assert_eq!(screen.total_quantity()?, 5);

        screen.filter.creator_id = None;
        screen.filter.end = day(2024, 5, 10);
        assert_eq!(screen.total_quantity()?, 7);

        screen.filter.start = day(2024, 6, 1);
        screen.filter.end = day(2024, 6, 30);
        assert_eq!(screen.table_state(), TableState::Empty);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_creator_shows_unknown() -> Result<()> {
        let store = setup_test_store().await?;
        let sari = create_test_creator(&store, "Sari", ContactSource::TikTok, None).await?;
        ship(&store, &sari.id, 2, dates::today()).await?;
        crate::core::creators::delete_creator(&store, &sari.id).await?;

        let mut screen = loaded(&store, 1, 0).await;
        let rows = screen.rows()?;
        assert_eq!(rows[0].creator_name, UNKNOWN_NAME);

        // The placeholder is for display only; searching never matches it.
        screen.filter.search = "unk".to_string();
        assert!(screen.rows()?.is_empty());
        screen.filter.search = "sari".to_string();
        assert!(screen.rows()?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_selecting_creator_autofills_new_shipment() -> Result<()> {
        let store = setup_test_store().await?;
        let sari = create_test_creator(&store, "Sari", ContactSource::TikTok, None).await?;
        ship(&store, &sari.id, 2, day(2024, 5, 1)).await?;
        let mut screen = loaded(&store, 1, 1).await;
        within(screen.creators.wait_until(|rows| rows[0].address.is_some())).await;

        screen.form.open_create();
        screen.select_creator(&sari.id);
        let draft = screen.form.draft().unwrap();
        assert_eq!(draft.creator_id, sari.id);
        assert_eq!(draft.recipient_name, "Penerima");
        assert_eq!(draft.address, "Jl. Kenanga 3");

        screen.select_creator("nobody");
        assert_eq!(screen.form.draft().unwrap().address, "");
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_requires_creator_and_updates_cache() -> Result<()> {
        let store = setup_test_store().await?;
        let sari = create_test_creator(&store, "Sari", ContactSource::TikTok, None).await?;
        let mut screen = loaded(&store, 0, 1).await;

        screen.form.open_create();
        assert!(matches!(
            screen.submit().await.unwrap_err(),
            Error::Validation { message } if message == "Silakan pilih seorang kreator."
        ));

        screen.select_creator(&sari.id);
        let draft = screen.form.draft_mut().unwrap();
        draft.recipient_name = "Sari".to_string();
        draft.address = "Jl. Baru 9".to_string();
        draft.phone_number = "0857".to_string();
        screen.submit().await?;
        assert!(!screen.form.is_open());

        let creators = within(
            screen
                .creators
                .wait_until(|rows| rows[0].address.as_deref() == Some("Jl. Baru 9")),
        )
        .await
        .unwrap();
        assert_eq!(creators[0].phone_number.as_deref(), Some("0857"));
        Ok(())
    }
}
