use super::{DeleteConfirmation, FormState, TableState};
use crate::{
    core::admins,
    entities::AdminModel,
    errors::Result,
    store::{RecordStore, Subscription},
};

/// Admin form values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminDraft {
    /// Admin name
    pub name: String,
}

/// Admin management page.
#[derive(Debug)]
pub struct AdminScreen {
    store: RecordStore,
    admins: Subscription<AdminModel>,
    /// Create/edit modal
    pub form: FormState<AdminDraft>,
    /// Delete prompt
    pub delete: DeleteConfirmation,
}

impl AdminScreen {
    /// Mounts the page and subscribes to the admin list.
    #[must_use]
    pub fn mount(store: &RecordStore) -> Self {
        Self {
            store: store.clone(),
            admins: store.subscribe(admins::admins_query()),
            form: FormState::default(),
            delete: DeleteConfirmation::default(),
        }
    }

    /// Admins, alphabetically.
    #[must_use]
    pub fn rows(&self) -> Vec<AdminModel> {
        self.admins.rows()
    }

    /// Table area state.
    #[must_use]
    pub fn table_state(&self) -> TableState {
        if self.admins.is_loading() {
            return TableState::Loading;
        }
        self.admins.with_rows(|rows| TableState::loaded(rows.len()))
    }

    /// Opens the edit form for `admin`.
    pub fn open_edit(&mut self, admin: &AdminModel) {
        self.form.open_edit(
            &admin.id,
            AdminDraft {
                name: admin.name.clone(),
            },
        );
    }

    /// Saves the open form and closes it. The form stays open on error.
    pub async fn submit(&mut self) -> Result<()> {
        let saved = match &self.form {
            FormState::Closed => return Ok(()),
            FormState::Creating(draft) => admins::create_admin(&self.store, &draft.name).await?,
            FormState::Editing { id, draft } => {
                admins::update_admin(&self.store, id, &draft.name).await?
            }
        };
        tracing::debug!("Admin form saved {}", saved.id);
        self.form.close();
        Ok(())
    }

    /// Deletes the admin awaiting confirmation, if any.
    pub async fn confirm_delete(&mut self) -> Result<()> {
        match self.delete.confirm() {
            Some(id) => admins::delete_admin(&self.store, &id).await,
            None => Ok(()),
        }
    }

    /// Waits for the next push. Returns `false` once the subscription has stopped.
    pub async fn next_update(&mut self) -> bool {
        self.admins.changed().await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Error;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_admin_screen_crud() -> Result<()> {
        let store = setup_test_store().await?;
        let mut screen = AdminScreen::mount(&store);

        within(screen.admins.wait_for_snapshot()).await;
        assert_eq!(screen.table_state(), TableState::Empty);

        screen.form.open_create();
        screen.form.draft_mut().unwrap().name = "  Rina ".to_string();
        screen.submit().await?;
        assert!(!screen.form.is_open());

        let rows = within(screen.admins.wait_until(|rows| rows.len() == 1))
            .await
            .unwrap();
        assert_eq!(rows[0].name, "Rina");
        assert_eq!(screen.table_state(), TableState::Rows);

        screen.open_edit(&rows[0]);
        screen.form.draft_mut().unwrap().name = " ".to_string();
        let result = screen.submit().await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));
        assert!(screen.form.is_open());

        screen.form.draft_mut().unwrap().name = "Rina S.".to_string();
        screen.submit().await?;
        within(screen.admins.wait_until(|rows| rows.first().is_some_and(|a| a.name == "Rina S.")))
            .await
            .unwrap();

        screen.delete.request(&rows[0].id);
        screen.delete.cancel();
        screen.confirm_delete().await?;
        assert_eq!(screen.rows().len(), 1);

        screen.delete.request(&rows[0].id);
        screen.confirm_delete().await?;
        within(screen.admins.wait_until(<[AdminModel]>::is_empty))
            .await
            .unwrap();
        Ok(())
    }
}
