//! Session gate, view router and application shell.
//!
//! [`App`] follows the identity provider's session stream: it shows a loading state
//! until the first session value is read, the login page while signed out, and the
//! [`Shell`] while signed in. The shell mounts exactly one screen at a time;
//! navigating drops the previous screen and with it every subscription it held.

use crate::{
    auth::{IdentityProvider, Session},
    config::settings::DashboardSettings,
    core::{dates, events::scheduled_events_query},
    entities::AffiliateEventModel,
    errors::Result,
    screens::{
        AdminScreen, AffiliateScreen, CreatorHubScreen, CreatorSamplesScreen, DashboardScreen,
        RevenueScreen, SalesScreen, ShopScreen,
    },
    store::{RecordStore, Subscription},
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// A page of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    /// Revenue dashboard
    #[default]
    Dashboard,
    /// Admin management
    AdminManagement,
    /// Shop management
    ShopManagement,
    /// Shop revenue data
    RevenueData,
    /// Product sales data
    SalesData,
    /// Creator outreach
    CreatorHub,
    /// Creator sample shipments
    CreatorSamples,
    /// Affiliate events
    AffiliateService,
}

impl View {
    /// Sidebar order.
    pub const ALL: [Self; 8] = [
        Self::Dashboard,
        Self::AdminManagement,
        Self::ShopManagement,
        Self::RevenueData,
        Self::SalesData,
        Self::CreatorHub,
        Self::CreatorSamples,
        Self::AffiliateService,
    ];

    /// Sidebar label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dasbor",
            Self::AdminManagement => "Manajemen Admin",
            Self::ShopManagement => "Manajemen Toko",
            Self::RevenueData => "Data Omzet Toko",
            Self::SalesData => "Data Penjualan",
            Self::CreatorHub => "Hubungi Kreator",
            Self::CreatorSamples => "Sampel Kreator",
            Self::AffiliateService => "Affiliate Service",
        }
    }
}

/// The mounted screen.
#[derive(Debug)]
pub enum ActiveScreen {
    /// Revenue dashboard
    Dashboard(Box<DashboardScreen>),
    /// Admin management
    Admins(Box<AdminScreen>),
    /// Shop management
    Shops(Box<ShopScreen>),
    /// Shop revenue data
    Revenue(Box<RevenueScreen>),
    /// Product sales data
    Sales(Box<SalesScreen>),
    /// Creator outreach
    Creators(Box<CreatorHubScreen>),
    /// Creator sample shipments
    Samples(Box<CreatorSamplesScreen>),
    /// Affiliate events
    Affiliate(Box<AffiliateScreen>),
}

impl ActiveScreen {
    fn mount(view: View, store: &RecordStore, settings: &DashboardSettings) -> Self {
        match view {
            View::Dashboard => Self::Dashboard(Box::new(DashboardScreen::mount(
                store,
                settings,
                dates::today(),
            ))),
            View::AdminManagement => Self::Admins(Box::new(AdminScreen::mount(store))),
            View::ShopManagement => Self::Shops(Box::new(ShopScreen::mount(store))),
            View::RevenueData => Self::Revenue(Box::new(RevenueScreen::mount(store))),
            View::SalesData => Self::Sales(Box::new(SalesScreen::mount(store))),
            View::CreatorHub => Self::Creators(Box::new(CreatorHubScreen::mount(store))),
            View::CreatorSamples => Self::Samples(Box::new(CreatorSamplesScreen::mount(
                store,
                settings.trailing_days,
            ))),
            View::AffiliateService => Self::Affiliate(Box::new(AffiliateScreen::mount(store))),
        }
    }

    /// Waits for the screen's next push.
    pub async fn next_update(&mut self) -> bool {
        match self {
            Self::Dashboard(screen) => screen.next_update().await,
            Self::Admins(screen) => screen.next_update().await,
            Self::Shops(screen) => screen.next_update().await,
            Self::Revenue(screen) => screen.next_update().await,
            Self::Sales(screen) => screen.next_update().await,
            Self::Creators(screen) => screen.next_update().await,
            Self::Samples(screen) => screen.next_update().await,
            Self::Affiliate(screen) => screen.next_update().await,
        }
    }
}

/// Signed-in layout: sidebar, header and the active screen.
#[derive(Debug)]
pub struct Shell {
    store: RecordStore,
    settings: DashboardSettings,
    view: View,
    screen: ActiveScreen,
    pending_events: Subscription<AffiliateEventModel>,
}

impl Shell {
    /// Mounts the shell on the dashboard.
    #[must_use]
    pub fn mount(store: &RecordStore, settings: &DashboardSettings) -> Self {
        Self {
            store: store.clone(),
            settings: settings.clone(),
            view: View::Dashboard,
            screen: ActiveScreen::mount(View::Dashboard, store, settings),
            pending_events: store.subscribe(scheduled_events_query()),
        }
    }

    /// The active view.
    #[must_use]
    pub const fn view(&self) -> View {
        self.view
    }

    /// The mounted screen.
    #[must_use]
    pub const fn screen(&self) -> &ActiveScreen {
        &self.screen
    }

    /// The mounted screen, for input handlers.
    pub const fn screen_mut(&mut self) -> &mut ActiveScreen {
        &mut self.screen
    }

    /// Switches to `view`, dropping the previous screen and its subscriptions.
    pub fn navigate(&mut self, view: View) {
        if view == self.view {
            return;
        }
        debug!("Navigating from {:?} to {:?}", self.view, view);
        self.view = view;
        self.screen = ActiveScreen::mount(view, &self.store, &self.settings);
    }

    /// Number of scheduled affiliate events.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.pending_events.with_rows(<[AffiliateEventModel]>::len)
    }

    /// Sidebar badge for `view`, shown only for pending affiliate events.
    #[must_use]
    pub fn badge(&self, view: View) -> Option<usize> {
        let pending = self.pending_events();
        (view == View::AffiliateService && pending > 0).then_some(pending)
    }

    /// Waits for a push to the badge or the mounted screen.
    pub async fn next_update(&mut self) -> bool {
        tokio::select! {
            alive = self.pending_events.changed() => alive,
            alive = self.screen.next_update() => alive,
        }
    }
}

/// Top-level UI state.
#[derive(Debug)]
pub enum AppState {
    /// Session not read yet
    Loading,
    /// Login page
    SignedOut,
    /// Signed in
    SignedIn(Box<Shell>),
}

/// The application: identity gate plus shell.
pub struct App {
    store: RecordStore,
    provider: Arc<dyn IdentityProvider>,
    sessions: watch::Receiver<Option<Session>>,
    settings: DashboardSettings,
    session: Option<Session>,
    state: AppState,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("session", &self.session)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Creates the app in the loading state.
    #[must_use]
    pub fn new(
        store: RecordStore,
        provider: Arc<dyn IdentityProvider>,
        settings: DashboardSettings,
    ) -> Self {
        let sessions = provider.sessions();
        Self {
            store,
            provider,
            sessions,
            settings,
            session: None,
            state: AppState::Loading,
        }
    }

    /// Current UI state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// The shell, while signed in.
    pub fn shell_mut(&mut self) -> Option<&mut Shell> {
        match &mut self.state {
            AppState::SignedIn(shell) => Some(shell.as_mut()),
            _ => None,
        }
    }

    /// The signed-in user, shown in the header.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Re-derives the UI state from the latest session value. A new user gets a
    /// fresh shell; the same user keeps theirs.
    pub fn sync_session(&mut self) {
        let latest = self.sessions.borrow_and_update().clone();
        let unchanged = latest == self.session && !matches!(self.state, AppState::Loading);
        if unchanged {
            return;
        }
        self.state = match &latest {
            Some(session) => {
                info!("Session active for {}", session.email);
                AppState::SignedIn(Box::new(Shell::mount(&self.store, &self.settings)))
            }
            None => AppState::SignedOut,
        };
        self.session = latest;
    }

    /// Waits for the provider to publish a session change, then syncs. Returns
    /// `false` if the provider is gone.
    pub async fn session_changed(&mut self) -> bool {
        if self.sessions.changed().await.is_err() {
            return false;
        }
        self.sync_session();
        true
    }

    /// Signs in through the provider.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<()> {
        self.provider.sign_in(email, password).await?;
        self.sync_session();
        Ok(())
    }

    /// Registers and signs in through the provider.
    pub async fn sign_up(&mut self, email: &str, password: &str) -> Result<()> {
        self.provider.sign_up(email, password).await?;
        self.sync_session();
        Ok(())
    }

    /// Signs out; the shell and all its subscriptions are dropped.
    pub async fn sign_out(&mut self) -> Result<()> {
        self.provider.sign_out().await?;
        self.sync_session();
        Ok(())
    }
}
