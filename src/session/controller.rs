use log::{debug, info, warn};
use rand::Rng;

use crate::session::params::SessionParameters;
use crate::session::question::{Question, RawQuestionRecord, normalize_with};
use crate::session::state::{Phase, Session, SessionError};
use crate::source::SourceError;

/// Told once per session that the session has ended. Carries no payload.
pub trait Navigator {
    fn session_ended(&mut self);
}

impl<F: FnMut()> Navigator for F {
    fn session_ended(&mut self) {
        self()
    }
}

/// Identifies one fetch. A completion is applied only if its ticket still
/// matches the controller's current parameters and generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    params: SessionParameters,
    generation: u64,
}

impl FetchTicket {
    pub fn params(&self) -> SessionParameters {
        self.params
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Why a session ended up with nothing to show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EmptyReason {
    NoResults,
    /// The provider answered but refused the request with this response code.
    ProviderRejected(u8),
    SourceUnavailable(String),
}

impl From<&SourceError> for EmptyReason {
    fn from(err: &SourceError) -> Self {
        match err {
            SourceError::Provider(code) => EmptyReason::ProviderRejected(*code),
            other => EmptyReason::SourceUnavailable(other.to_string()),
        }
    }
}

/// Read model for the renderer.
#[derive(Clone, Debug)]
pub struct SessionView<'a> {
    pub phase: Phase,
    pub params: Option<SessionParameters>,
    pub current_question: Option<&'a Question>,
    pub picked: Option<usize>,
    pub score: usize,
    pub position: usize,
    pub total: usize,
    pub progress: Option<f64>,
    pub empty_reason: Option<&'a EmptyReason>,
}

pub struct SessionController<R> {
    params: Option<SessionParameters>,
    generation: u64,
    session: Session,
    empty_reason: Option<EmptyReason>,
    notified: bool,
    navigator: Box<dyn Navigator>,
    rng: R,
}

impl<R: Rng> SessionController<R> {
    pub fn new(navigator: Box<dyn Navigator>, rng: R) -> Self {
        Self {
            params: None,
            generation: 0,
            session: Session::new(),
            empty_reason: None,
            notified: false,
            navigator,
            rng,
        }
    }

    /// Start a new session for `params` unless they are already current.
    /// The returned ticket must be handed back to [`Self::complete`].
    pub fn request(&mut self, params: SessionParameters) -> Option<FetchTicket> {
        if self.params == Some(params) {
            debug!("ignoring repeated request for {params}");
            return None;
        }
        Some(self.begin(params))
    }

    /// Fetch again for the current parameters, replacing the session.
    pub fn reload(&mut self) -> Option<FetchTicket> {
        let params = self.params?;
        Some(self.begin(params))
    }

    fn begin(&mut self, params: SessionParameters) -> FetchTicket {
        self.generation += 1;
        self.params = Some(params);
        self.session = Session::new();
        self.empty_reason = None;
        self.notified = false;
        info!("session {} requested for {params}", self.generation);
        FetchTicket {
            params,
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.params == Some(ticket.params) && self.generation == ticket.generation
    }

    /// Feed a fetch result into the session. Returns `false` when the result
    /// was dropped because a newer request superseded it.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<RawQuestionRecord>, SourceError>,
    ) -> bool {
        if !self.is_current(&ticket) || self.session.phase() != Phase::Loading {
            debug!(
                "dropping stale batch for {} (generation {})",
                ticket.params, ticket.generation
            );
            return false;
        }

        let records = match result {
            Ok(records) => records,
            Err(err) => {
                warn!("question fetch for {} failed: {err}", ticket.params);
                self.empty_reason = Some(EmptyReason::from(&err));
                Vec::new()
            }
        };
        if records.is_empty() && self.empty_reason.is_none() {
            self.empty_reason = Some(EmptyReason::NoResults);
        }

        let questions: Vec<Question> = records
            .iter()
            .map(|r| normalize_with(r, &mut self.rng))
            .collect();
        match self.session.load(questions) {
            Ok(phase) => {
                info!(
                    "session {} loaded {} questions ({phase})",
                    self.generation,
                    self.session.total()
                );
                true
            }
            Err(err) => {
                warn!("could not load batch: {err}");
                false
            }
        }
    }

    pub fn submit_selection(&mut self, index: usize) -> Result<(), SessionError> {
        self.session.submit_selection(index)
    }

    pub fn advance(&mut self) -> Result<Phase, SessionError> {
        let phase = self.session.advance()?;
        if phase == Phase::Finished && !self.notified {
            self.notified = true;
            info!(
                "session {} finished with {}/{}",
                self.generation,
                self.session.score(),
                self.session.total()
            );
            self.navigator.session_ended();
        }
        Ok(phase)
    }

    /// Replay the already fetched batch from the start without a new fetch.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        let phase = self.session.phase();
        if !matches!(phase, Phase::Active | Phase::Finished) {
            return Err(SessionError::IllegalState {
                op: "restart",
                phase,
            });
        }
        let mut session = Session::new();
        session.load(self.session.questions().to_vec())?;
        self.session = session;
        self.notified = false;
        debug!("session {} restarted", self.generation);
        Ok(())
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn params(&self) -> Option<SessionParameters> {
        self.params
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            phase: self.session.phase(),
            params: self.params,
            current_question: self.session.current_question(),
            picked: self.session.picked(),
            score: self.session.score(),
            position: self.session.position(),
            total: self.session.total(),
            progress: self.session.progress_fraction(),
            empty_reason: self.empty_reason.as_ref(),
        }
    }
}
