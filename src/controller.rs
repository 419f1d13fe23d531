use crate::api::HabitApi;
use crate::auth::AuthService;
use crate::calendar::month_bounds;
use crate::errors::ClientError;
use crate::models::{CompletionCounts, Habit, User};
use crate::session::Session;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", content = "user", rename_all = "lowercase")]
pub enum SessionPhase {
    Anonymous,
    Active(User),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadingFlags {
    /// Gates the whole dashboard.
    pub initializing: bool,
    /// Gates the login and register forms.
    pub authenticating: bool,
    /// Gates the add-habit control.
    pub adding: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DateToolStatus {
    pub success: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewState {
    pub session: SessionPhase,
    pub habits: Vec<Habit>,
    pub completion_counts: CompletionCounts,
    pub current_date: Option<NaiveDate>,
    pub loading: LoadingFlags,
    pub notice: Option<String>,
    pub date_tool: DateToolStatus,
    #[serde(skip)]
    epoch: u64,
    #[serde(skip)]
    counts_generation: u64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            session: SessionPhase::Anonymous,
            habits: Vec::new(),
            completion_counts: CompletionCounts::new(),
            current_date: None,
            loading: LoadingFlags::default(),
            notice: None,
            date_tool: DateToolStatus::default(),
            epoch: 0,
            counts_generation: 0,
        }
    }
}

impl ViewState {
    pub fn user(&self) -> Option<&User> {
        match &self.session {
            SessionPhase::Active(user) => Some(user),
            SessionPhase::Anonymous => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum AuthMode {
    Login,
    Register,
}

impl AuthMode {
    fn failure_notice(self) -> &'static str {
        match self {
            AuthMode::Login => "Invalid credentials",
            AuthMode::Register => "Username taken or error",
        }
    }
}

/// Owns the client-side view state and sequences every backend call that
/// feeds it.
///
/// The state lock is never held across a backend call. Each commit checks the
/// session epoch (bumped on sign-in and logout), and completion counts also
/// check a per-refresh generation, so a late response cannot overwrite newer
/// state.
pub struct Controller {
    auth: AuthService,
    api: HabitApi,
    session: Session,
    state: Mutex<ViewState>,
}

impl Controller {
    pub fn new(client: Client, api_url: &str, session: Session) -> Self {
        Self {
            auth: AuthService::new(client.clone(), api_url, session.clone()),
            api: HabitApi::new(client, api_url, session.clone()),
            session,
            state: Mutex::new(ViewState::default()),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn snapshot(&self) -> ViewState {
        self.state.lock().await.clone()
    }

    /// Pending alert text, cleared once read.
    pub async fn take_notice(&self) -> Option<String> {
        self.state.lock().await.notice.take()
    }

    /// Resumes a cached session without asking for credentials.
    pub async fn restore_session(&self) {
        let Some(user) = self.auth.current_user().await else {
            return;
        };
        info!(username = %user.username, "restoring cached session");
        self.activate(user).await;
        self.initialize().await;
    }

    pub async fn login(&self, username: &str, password: &str) {
        self.authenticate(AuthMode::Login, username, password).await;
    }

    pub async fn register(&self, username: &str, password: &str) {
        self.authenticate(AuthMode::Register, username, password).await;
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let cleared = self.auth.logout().await;
        let mut state = self.state.lock().await;
        let epoch = state.epoch + 1;
        *state = ViewState {
            epoch,
            ..ViewState::default()
        };
        info!("logged out");
        cleared
    }

    /// Fetches current date, then habits, then the month's completion counts.
    pub async fn initialize(&self) {
        if !self.auth.is_authenticated().await {
            return;
        }
        let epoch = {
            let mut state = self.state.lock().await;
            state.loading.initializing = true;
            state.epoch
        };

        if let Some(date) = self.fetch_current_date(epoch).await {
            self.fetch_habits(epoch).await;
            self.refresh_counts(epoch, date).await;
        }

        self.state.lock().await.loading.initializing = false;
    }

    pub async fn add_habit(&self, name: &str) {
        let name = name.trim();
        if name.is_empty() || !self.auth.is_authenticated().await {
            return;
        }
        let epoch = {
            let mut state = self.state.lock().await;
            state.loading.adding = true;
            state.epoch
        };

        let result = self.api.create_habit(name).await;

        let date = {
            let mut state = self.state.lock().await;
            state.loading.adding = false;
            match result {
                Ok(habit) => {
                    if state.epoch == epoch {
                        info!(id = habit.id, name = %habit.name, "habit created");
                        state.habits.push(habit);
                    }
                    state.current_date
                }
                Err(err) => {
                    error!("failed to add habit: {err}");
                    state.notice = Some(format!("Failed to add habit: {err}"));
                    return;
                }
            }
        };

        if let Some(date) = date {
            self.refresh_counts(epoch, date).await;
        }
    }

    pub async fn remove_habit(&self, id: i64) {
        let epoch = self.epoch().await;
        let result = self.api.delete_habit(id).await;

        let date = {
            let mut state = self.state.lock().await;
            if let Err(err) = result {
                error!("failed to delete habit: {err}");
                state.notice = Some(format!("Failed to delete habit: {err}"));
                return;
            }
            if state.epoch == epoch {
                state.habits.retain(|habit| habit.id != id);
            }
            state.current_date
        };

        if let Some(date) = date {
            self.refresh_counts(epoch, date).await;
        }
    }

    pub async fn complete_habit(&self, id: i64) {
        let epoch = self.epoch().await;
        match self.api.complete_habit(id).await {
            Ok(updated) => {
                info!(id, streak = updated.streak, xp = updated.xp, level = updated.level, "habit completed");
                {
                    let mut state = self.state.lock().await;
                    if state.epoch == epoch {
                        if let Some(slot) = state.habits.iter_mut().find(|habit| habit.id == updated.id) {
                            *slot = updated;
                        }
                    }
                }
                if let Some(date) = self.fetch_current_date(epoch).await {
                    self.refresh_counts(epoch, date).await;
                }
            }
            Err(err) => {
                error!("failed to complete habit: {err}");
                self.state.lock().await.notice = Some(format!("Failed to complete habit: {err}"));
            }
        }
    }

    /// Moves the backend's logical today, then reloads everything.
    pub async fn set_test_date(&self, input: &str) {
        let input = input.trim();
        if input.is_empty() {
            self.state.lock().await.date_tool = DateToolStatus {
                success: None,
                error: Some("No date selected".to_string()),
            };
            return;
        }
        self.state.lock().await.date_tool = DateToolStatus::default();

        match self.api.set_custom_date(input).await {
            Ok(message) => {
                self.state.lock().await.date_tool.success = Some(message);
                self.initialize().await;
            }
            Err(err) => {
                error!("error setting date: {err}");
                self.state.lock().await.date_tool.error = Some(err.to_string());
            }
        }
    }

    async fn authenticate(&self, mode: AuthMode, username: &str, password: &str) {
        if username.trim().is_empty() || password.is_empty() {
            self.state.lock().await.notice = Some("Username and password are required".to_string());
            return;
        }
        self.state.lock().await.loading.authenticating = true;

        let result = match mode {
            AuthMode::Login => self.auth.login(username, password).await,
            AuthMode::Register => self.auth.register(username, password).await,
        };

        let user = {
            let mut state = self.state.lock().await;
            state.loading.authenticating = false;
            match result {
                Ok(user) => user,
                Err(err) => {
                    error!("{mode:?} failed: {err}");
                    state.notice = Some(mode.failure_notice().to_string());
                    return;
                }
            }
        };

        self.activate(user).await;
        self.initialize().await;
    }

    async fn activate(&self, user: User) {
        let mut state = self.state.lock().await;
        state.epoch += 1;
        state.session = SessionPhase::Active(user);
    }

    async fn epoch(&self) -> u64 {
        self.state.lock().await.epoch
    }

    async fn fetch_current_date(&self, epoch: u64) -> Option<NaiveDate> {
        match self.api.current_date().await {
            Ok(date) => {
                info!(%date, "backend date");
                let mut state = self.state.lock().await;
                if state.epoch != epoch {
                    debug!("dropping current date from a previous session");
                    return None;
                }
                state.current_date = Some(date);
                Some(date)
            }
            Err(err) => {
                error!("failed to fetch current date: {err}");
                None
            }
        }
    }

    async fn fetch_habits(&self, epoch: u64) {
        match self.api.list_habits().await {
            Ok(habits) => {
                info!(
                    streaks = ?habits.iter().map(|h| format!("{}: {}", h.name, h.streak)).collect::<Vec<_>>(),
                    "fetched habits"
                );
                let mut state = self.state.lock().await;
                if state.epoch == epoch {
                    state.habits = habits;
                } else {
                    debug!("dropping habit list from a previous session");
                }
            }
            Err(err) => error!("failed to fetch habits: {err}"),
        }
    }

    /// Re-fetches the whole month containing `date`.
    async fn refresh_counts(&self, epoch: u64, date: NaiveDate) {
        let generation = {
            let mut state = self.state.lock().await;
            if state.epoch != epoch {
                return;
            }
            state.counts_generation += 1;
            state.counts_generation
        };

        let (start, end) = month_bounds(date);
        match self.api.completion_counts(start, end).await {
            Ok(counts) => {
                let mut state = self.state.lock().await;
                if state.epoch != epoch || state.counts_generation != generation {
                    debug!(generation, "dropping stale completion counts");
                    return;
                }
                info!(days = counts.len(), %start, %end, "completion counts fetched");
                state.completion_counts = counts;
            }
            Err(err) => error!("failed to fetch completion counts: {err}"),
        }
    }
}
