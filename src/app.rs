use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use chrono::Utc;
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::{Config, PreferenceStore};
use crate::event::AppEvent;
use crate::session::controller::{FetchTicket, SessionController};
use crate::session::params::{CategoryId, Difficulty, SessionParameters};
use crate::session::question::RawQuestionRecord;
use crate::session::state::{Phase, SessionError};
use crate::source::categories::builtin_categories;
use crate::source::{Category, QuestionSource, SourceError};
use crate::store::json_store::FeedbackStore;
use crate::store::schema::FeedbackEntry;
use crate::ui::components::menu::Menu;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

const MAX_COMMENT_CHARS: usize = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Quiz,
    Feedback,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedbackField {
    Rating,
    Comment,
}

/// State of the feedback screen. The score arrives from the caller at
/// navigation time; the form never reads the session.
pub struct FeedbackForm {
    pub score: usize,
    pub total: usize,
    pub params: Option<SessionParameters>,
    pub rating: Option<u8>,
    pub comment: LineInput,
    pub focus: FeedbackField,
}

impl FeedbackForm {
    pub fn new(score: usize, total: usize, params: Option<SessionParameters>) -> Self {
        Self {
            score,
            total,
            params,
            rating: None,
            comment: LineInput::new("", MAX_COMMENT_CHARS),
            focus: FeedbackField::Rating,
        }
    }

    pub fn set_rating(&mut self, rating: u8) {
        self.rating = Some(rating.clamp(1, 5));
    }

    pub fn adjust_rating(&mut self, up: bool) {
        let current = self.rating.unwrap_or(if up { 0 } else { 6 });
        let next = if up { current.saturating_add(1) } else { current.saturating_sub(1) };
        self.set_rating(next);
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FeedbackField::Rating => FeedbackField::Comment,
            FeedbackField::Comment => FeedbackField::Rating,
        };
    }

    pub fn to_entry(&self) -> FeedbackEntry {
        FeedbackEntry {
            submitted_at: Utc::now(),
            rating: self.rating,
            comment: self.comment.value().trim().to_string(),
            score: self.score,
            total: self.total,
            category: self.params.map(|p| p.category),
            difficulty: self.params.and_then(|p| p.difficulty),
        }
    }
}

pub struct App {
    pub screen: AppScreen,
    pub menu: Menu,
    pub controller: SessionController<SmallRng>,
    pub feedback: Option<FeedbackForm>,
    pub theme: Theme,
    pub config: Config,
    pub status: Option<String>,
    pub should_quit: bool,
    categories_deferred: bool,
    preferences: Box<dyn PreferenceStore>,
    source: Arc<dyn QuestionSource>,
    feedback_store: Option<FeedbackStore>,
    events: Sender<AppEvent>,
}

impl App {
    pub fn new(
        mut config: Config,
        preferences: Box<dyn PreferenceStore>,
        source: Arc<dyn QuestionSource>,
        feedback_store: Option<FeedbackStore>,
        events: Sender<AppEvent>,
    ) -> Self {
        if let Some(theme) = preferences.load_theme() {
            config.theme = theme;
        }
        let theme = Theme::load(&config.theme).unwrap_or_default();

        let nav_tx = events.clone();
        let navigator = move || {
            if nav_tx.send(AppEvent::SessionEnded).is_err() {
                warn!("event loop closed before session end was delivered");
            }
        };
        let controller = SessionController::new(Box::new(navigator), SmallRng::from_entropy());
        let menu = Menu::new(builtin_categories(), config.default_difficulty);

        Self {
            screen: AppScreen::Menu,
            menu,
            controller,
            feedback: None,
            theme,
            config,
            status: None,
            should_quit: false,
            categories_deferred: false,
            preferences,
            source,
            feedback_store,
            events,
        }
    }

    /// First actions after startup. With a category given up front the
    /// category list waits until the first batch arrives, so the provider
    /// never sees two requests inside its rate-limit window.
    pub fn launch(&mut self, category: Option<CategoryId>) {
        match category {
            Some(id) => {
                self.categories_deferred = true;
                self.start_quiz(SessionParameters::new(id, self.menu.difficulty));
            }
            None => self.load_categories(),
        }
    }

    pub fn load_categories(&self) {
        let source = Arc::clone(&self.source);
        let tx = self.events.clone();
        thread::spawn(move || {
            let _ = tx.send(AppEvent::CategoriesFetched(source.fetch_categories()));
        });
    }

    pub fn on_categories(&mut self, result: Result<Vec<Category>, SourceError>) {
        match result {
            Ok(categories) if !categories.is_empty() => {
                info!("loaded {} categories from provider", categories.len());
                self.menu.set_categories(categories, true);
            }
            Ok(_) => warn!("provider returned no categories, keeping built-in list"),
            Err(err) => warn!("could not load categories, keeping built-in list: {err}"),
        }
    }

    pub fn start_selected(&mut self) {
        if let Some(category) = self.menu.chosen() {
            let params = SessionParameters::new(category.id, self.menu.difficulty);
            self.start_quiz(params);
        }
    }

    /// Entering the quiz screen is always a fresh mount, so identical
    /// parameters still fetch a new batch.
    pub fn start_quiz(&mut self, params: SessionParameters) {
        self.status = None;
        self.feedback = None;
        let ticket = self
            .controller
            .request(params)
            .or_else(|| self.controller.reload());
        if let Some(ticket) = ticket {
            self.spawn_fetch(ticket);
        }
        self.screen = AppScreen::Quiz;
    }

    pub fn reload(&mut self) {
        if let Some(ticket) = self.controller.reload() {
            self.spawn_fetch(ticket);
        }
    }

    fn spawn_fetch(&self, ticket: FetchTicket) {
        let source = Arc::clone(&self.source);
        let tx = self.events.clone();
        let amount = self.config.batch_size;
        let params = ticket.params();
        thread::spawn(move || {
            let result = source.fetch_batch(params.category, params.difficulty, amount);
            let _ = tx.send(AppEvent::BatchFetched(ticket, result));
        });
    }

    pub fn on_batch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<RawQuestionRecord>, SourceError>,
    ) {
        if !self.controller.complete(ticket, result) {
            debug!("batch for {} arrived after it was superseded", ticket.params());
        }
        if std::mem::take(&mut self.categories_deferred) {
            self.load_categories();
        }
    }

    /// Only offers indices the current question actually has.
    pub fn pick(&mut self, index: usize) -> Result<(), SessionError> {
        let count = self
            .controller
            .view()
            .current_question
            .map_or(0, |q| q.option_count());
        if index < count {
            self.controller.submit_selection(index)?;
        }
        Ok(())
    }

    pub fn move_pick(&mut self, down: bool) -> Result<(), SessionError> {
        let view = self.controller.view();
        let Some(question) = view.current_question else {
            return Ok(());
        };
        let count = question.option_count();
        let next = match (view.picked, down) {
            (None, true) => 0,
            (None, false) => count.saturating_sub(1),
            (Some(i), true) => (i + 1) % count,
            (Some(i), false) => (i + count - 1) % count,
        };
        self.controller.submit_selection(next)
    }

    /// "Next" is disabled until an option is picked.
    pub fn next_question(&mut self) -> Result<(), SessionError> {
        let view = self.controller.view();
        if view.phase != Phase::Active || view.picked.is_none() {
            return Ok(());
        }
        self.controller.advance()?;
        Ok(())
    }

    pub fn on_session_ended(&mut self) {
        let view = self.controller.view();
        if self.screen != AppScreen::Quiz || view.phase != Phase::Finished {
            debug!("ignoring session end outside the quiz screen or for a replaced session");
            return;
        }
        self.feedback = Some(FeedbackForm::new(view.score, view.total, view.params));
        self.screen = AppScreen::Feedback;
    }

    pub fn retry_same_questions(&mut self) -> Result<(), SessionError> {
        self.controller.restart()?;
        self.feedback = None;
        self.screen = AppScreen::Quiz;
        Ok(())
    }

    pub fn submit_feedback(&mut self) {
        let Some(form) = self.feedback.take() else {
            return;
        };
        let entry = form.to_entry();
        self.status = match &self.feedback_store {
            Some(store) => match store.append_feedback(entry) {
                Ok(()) => Some("Thanks for your feedback!".to_string()),
                Err(err) => {
                    warn!("could not save feedback: {err}");
                    Some("Feedback could not be saved".to_string())
                }
            },
            None => Some("Feedback storage unavailable".to_string()),
        };
        self.screen = AppScreen::Menu;
    }

    pub fn toggle_theme(&mut self) {
        let name = Theme::toggled_name(&self.theme.name);
        match Theme::load(name) {
            Some(theme) => {
                self.theme = theme;
                self.config.theme = name.to_string();
                if let Err(err) = self.preferences.save_theme(name) {
                    warn!("could not persist theme preference: {err}");
                }
            }
            None => warn!("theme '{name}' not found"),
        }
    }

    pub fn cycle_difficulty(&mut self, forward: bool) {
        self.menu.difficulty = Difficulty::cycle(self.menu.difficulty, forward);
    }

    pub fn go_to_menu(&mut self) {
        self.feedback = None;
        self.screen = AppScreen::Menu;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::mpsc::{self, Receiver};
    use std::time::Duration;

    use super::*;
    use crate::config::MemoryPreferences;
    use crate::ui::theme::{DARK, LIGHT};

    /// Serves a fixed batch and records how often it was asked.
    struct FixedSource {
        records: Vec<RawQuestionRecord>,
        calls: Mutex<usize>,
    }

    impl QuestionSource for FixedSource {
        fn fetch_batch(
            &self,
            _category: u32,
            _difficulty: Option<Difficulty>,
            amount: usize,
        ) -> Result<Vec<RawQuestionRecord>, SourceError> {
            *self.calls.lock().unwrap() += 1;
            Ok(self.records.iter().take(amount).cloned().collect())
        }

        fn fetch_categories(&self) -> Result<Vec<Category>, SourceError> {
            *self.calls.lock().unwrap() += 1;
            Err(SourceError::Offline)
        }
    }

    fn records(n: usize) -> Vec<RawQuestionRecord> {
        (0..n)
            .map(|i| RawQuestionRecord {
                text: format!("Q{i}"),
                correct_answer: "yes".to_string(),
                incorrect_answers: vec!["no".to_string(), "maybe".to_string()],
            })
            .collect()
    }

    fn make_app_with_source(
        n: usize,
    ) -> (App, Receiver<AppEvent>, tempfile::TempDir, Arc<FixedSource>) {
        let (tx, rx) = mpsc::channel();
        let dir = tempfile::tempdir().unwrap();
        let store = FeedbackStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let source = Arc::new(FixedSource {
            records: records(n),
            calls: Mutex::new(0),
        });
        let app = App::new(
            Config::default(),
            Box::new(MemoryPreferences::default()),
            Arc::clone(&source) as Arc<dyn QuestionSource>,
            Some(store),
            tx,
        );
        (app, rx, dir, source)
    }

    fn make_app(n: usize) -> (App, Receiver<AppEvent>, tempfile::TempDir) {
        let (app, rx, dir, _source) = make_app_with_source(n);
        (app, rx, dir)
    }

    fn pump_batch(app: &mut App, rx: &Receiver<AppEvent>) {
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            AppEvent::BatchFetched(ticket, result) => app.on_batch(ticket, result),
            _ => panic!("expected a batch"),
        }
    }

    fn answer_all_correctly(app: &mut App) {
        while app.controller.phase() == Phase::Active {
            let idx = app.controller.view().current_question.unwrap().correct_index();
            app.pick(idx).unwrap();
            app.next_question().unwrap();
        }
    }

    #[test]
    fn test_quiz_to_feedback_flow() {
        let (mut app, rx, _dir) = make_app(3);
        app.start_quiz(SessionParameters::new(9, None));
        assert_eq!(app.screen, AppScreen::Quiz);
        pump_batch(&mut app, &rx);
        assert_eq!(app.controller.view().total, 3);

        answer_all_correctly(&mut app);
        assert!(matches!(rx.try_recv(), Ok(AppEvent::SessionEnded)));
        app.on_session_ended();

        assert_eq!(app.screen, AppScreen::Feedback);
        let form = app.feedback.as_ref().unwrap();
        assert_eq!((form.score, form.total), (3, 3));
    }

    #[test]
    fn test_launch_with_category_fetches_batch_before_categories() {
        let (mut app, rx, _dir, source) = make_app_with_source(2);
        app.launch(Some(9));

        let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(*source.calls.lock().unwrap(), 1);
        let AppEvent::BatchFetched(ticket, result) = event else {
            panic!("expected the batch first");
        };
        assert!(rx.try_recv().is_err());
        app.on_batch(ticket, result);
        assert_eq!(app.controller.phase(), Phase::Active);

        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            AppEvent::CategoriesFetched(result) => app.on_categories(result),
            _ => panic!("expected categories after the batch"),
        }
        assert_eq!(*source.calls.lock().unwrap(), 2);
        assert!(!app.menu.live_categories);
    }

    #[test]
    fn test_launch_without_category_only_loads_categories() {
        let (mut app, rx, _dir, source) = make_app_with_source(2);
        app.launch(None);
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            AppEvent::CategoriesFetched(_)
        ));
        assert_eq!(*source.calls.lock().unwrap(), 1);
        assert_eq!(app.screen, AppScreen::Menu);
    }

    #[test]
    fn test_session_end_after_leaving_quiz_stays_on_menu() {
        let (mut app, rx, _dir) = make_app(1);
        app.start_quiz(SessionParameters::new(9, None));
        pump_batch(&mut app, &rx);
        answer_all_correctly(&mut app);
        app.go_to_menu();
        app.on_session_ended();
        assert_eq!(app.screen, AppScreen::Menu);
        assert!(app.feedback.is_none());
    }

    #[test]
    fn test_next_is_inert_without_pick() {
        let (mut app, rx, _dir) = make_app(2);
        app.start_quiz(SessionParameters::new(9, None));
        pump_batch(&mut app, &rx);
        app.next_question().unwrap();
        assert_eq!(app.controller.view().position, 0);
    }

    #[test]
    fn test_pick_ignores_indices_past_options() {
        let (mut app, rx, _dir) = make_app(1);
        app.start_quiz(SessionParameters::new(9, None));
        pump_batch(&mut app, &rx);
        app.pick(7).unwrap();
        assert_eq!(app.controller.view().picked, None);
        app.move_pick(false).unwrap();
        assert_eq!(app.controller.view().picked, Some(2));
        app.move_pick(true).unwrap();
        assert_eq!(app.controller.view().picked, Some(0));
    }

    #[test]
    fn test_retry_same_questions_returns_to_quiz() {
        let (mut app, rx, _dir) = make_app(2);
        app.start_quiz(SessionParameters::new(9, None));
        pump_batch(&mut app, &rx);
        answer_all_correctly(&mut app);
        app.on_session_ended();

        app.retry_same_questions().unwrap();
        assert_eq!(app.screen, AppScreen::Quiz);
        let view = app.controller.view();
        assert_eq!((view.phase, view.position, view.score), (Phase::Active, 0, 0));
    }

    #[test]
    fn test_stale_session_end_is_ignored() {
        let (mut app, rx, _dir) = make_app(1);
        app.start_quiz(SessionParameters::new(9, None));
        pump_batch(&mut app, &rx);
        answer_all_correctly(&mut app);
        app.start_quiz(SessionParameters::new(10, None));
        app.on_session_ended();
        assert_eq!(app.screen, AppScreen::Quiz);
        assert!(app.feedback.is_none());
    }

    #[test]
    fn test_submit_feedback_persists_entry() {
        let (mut app, rx, dir) = make_app(1);
        app.start_quiz(SessionParameters::new(18, Some(Difficulty::Hard)));
        pump_batch(&mut app, &rx);
        answer_all_correctly(&mut app);
        app.on_session_ended();

        let form = app.feedback.as_mut().unwrap();
        form.set_rating(5);
        app.submit_feedback();

        assert_eq!(app.screen, AppScreen::Menu);
        let store = FeedbackStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let log = store.load_feedback();
        assert_eq!(log.entries.len(), 1);
        assert_eq!(log.entries[0].rating, Some(5));
        assert_eq!(log.entries[0].category, Some(18));
        assert_eq!(log.entries[0].difficulty, Some(Difficulty::Hard));
    }

    #[test]
    fn test_toggle_theme_flips_and_persists() {
        let (mut app, _rx, _dir) = make_app(0);
        assert_eq!(app.theme.name, LIGHT);
        app.toggle_theme();
        assert_eq!(app.theme.name, DARK);
        assert_eq!(app.preferences.load_theme().as_deref(), Some(DARK));
        app.toggle_theme();
        assert_eq!(app.config.theme, LIGHT);
    }

    #[test]
    fn test_empty_batch_shows_empty_phase() {
        let (mut app, rx, _dir) = make_app(0);
        app.start_quiz(SessionParameters::new(9, None));
        pump_batch(&mut app, &rx);
        assert_eq!(app.controller.phase(), Phase::Empty);
        assert!(app.retry_same_questions().is_err());
    }

    #[test]
    fn test_rating_adjustment_stays_in_range() {
        let mut form = FeedbackForm::new(1, 5, None);
        form.adjust_rating(false);
        assert_eq!(form.rating, Some(5));
        form.adjust_rating(true);
        assert_eq!(form.rating, Some(5));
        form.set_rating(0);
        assert_eq!(form.rating, Some(1));
        form.adjust_rating(false);
        assert_eq!(form.rating, Some(1));
    }
}
