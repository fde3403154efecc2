//! Form, delete-confirmation and table states shared by the management screens.

/// The create/edit modal of a management screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormState<D> {
    /// No form open
    #[default]
    Closed,
    /// Creating a new record
    Creating(D),
    /// Editing the record with `id`
    Editing {
        /// Record being edited
        id: String,
        /// Current form values
        draft: D,
    },
}

impl<D> FormState<D> {
    /// Opens the form for a new record with default values.
    pub fn open_create(&mut self)
    where
        D: Default,
    {
        *self = Self::Creating(D::default());
    }

    /// Opens the form pre-filled from an existing record.
    pub fn open_edit(&mut self, id: impl Into<String>, draft: D) {
        *self = Self::Editing {
            id: id.into(),
            draft,
        };
    }

    /// Closes the form, discarding its values.
    pub fn close(&mut self) {
        *self = Self::Closed;
    }

    /// Whether a form is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Id of the edited record, `None` when creating or closed.
    #[must_use]
    pub fn editing_id(&self) -> Option<&str> {
        match self {
            Self::Editing { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Current form values.
    #[must_use]
    pub const fn draft(&self) -> Option<&D> {
        match self {
            Self::Closed => None,
            Self::Creating(draft) | Self::Editing { draft, .. } => Some(draft),
        }
    }

    /// Mutable form values, for input handlers.
    pub const fn draft_mut(&mut self) -> Option<&mut D> {
        match self {
            Self::Closed => None,
            Self::Creating(draft) | Self::Editing { draft, .. } => Some(draft),
        }
    }
}

/// Pending "are you sure?" prompt before an irreversible delete.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeleteConfirmation {
    pending: Option<String>,
}

impl DeleteConfirmation {
    /// Asks for confirmation to delete `id`.
    pub fn request(&mut self, id: impl Into<String>) {
        self.pending = Some(id.into());
    }

    /// The id awaiting confirmation.
    #[must_use]
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Confirms and hands back the id to delete.
    pub const fn confirm(&mut self) -> Option<String> {
        self.pending.take()
    }

    /// Dismisses the prompt.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// What a list screen's table area shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    /// Waiting for the first result set
    Loading,
    /// Cascading screen with no admin chosen
    SelectAdmin,
    /// Cascading screen with no shop chosen
    SelectShop,
    /// Loaded, nothing to show
    Empty,
    /// Loaded with rows
    Rows,
}

impl TableState {
    /// Loaded state for a list of `len` rows.
    #[must_use]
    pub const fn loaded(len: usize) -> Self {
        if len == 0 { Self::Empty } else { Self::Rows }
    }
}
