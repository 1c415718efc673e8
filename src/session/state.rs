use std::fmt;

use thiserror::Error;

use crate::session::question::Question;

/// Derived from the session contents, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Empty,
    Active,
    Finished,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Loading => "loading",
            Phase::Empty => "empty",
            Phase::Active => "active",
            Phase::Finished => "finished",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contract violations by the calling layer. None of these are recoverable
/// runtime conditions.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("illegal state: `{op}` is not allowed while the session is {phase}")]
    IllegalState { op: &'static str, phase: Phase },
    #[error("illegal state: `advance` called before an option was selected")]
    NoSelection,
    #[error("invariant violation: option {index} is out of range for {len} options")]
    InvariantViolation { index: usize, len: usize },
}

impl SessionError {
    pub fn is_illegal_state(&self) -> bool {
        matches!(
            self,
            SessionError::IllegalState { .. } | SessionError::NoSelection
        )
    }
}

/// One attempt at a batch. `questions` is `None` until the fetch resolves.
#[derive(Clone, Debug, Default)]
pub struct Session {
    questions: Option<Vec<Question>>,
    position: usize,
    picked: Option<usize>,
    score: usize,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        match &self.questions {
            None => Phase::Loading,
            Some(qs) if qs.is_empty() => Phase::Empty,
            Some(qs) if self.position < qs.len() => Phase::Active,
            Some(_) => Phase::Finished,
        }
    }

    pub fn load(&mut self, questions: Vec<Question>) -> Result<Phase, SessionError> {
        self.expect_phase("load", Phase::Loading)?;
        self.questions = Some(questions);
        self.position = 0;
        self.score = 0;
        self.picked = None;
        Ok(self.phase())
    }

    pub fn submit_selection(&mut self, index: usize) -> Result<(), SessionError> {
        self.expect_phase("submit_selection", Phase::Active)?;
        let len = self.current_question().map_or(0, Question::option_count);
        if index >= len {
            return Err(SessionError::InvariantViolation { index, len });
        }
        self.picked = Some(index);
        Ok(())
    }

    /// Score the pending selection and move to the next question. Nothing
    /// changes if the call is rejected.
    pub fn advance(&mut self) -> Result<Phase, SessionError> {
        self.expect_phase("advance", Phase::Active)?;
        let picked = self.picked.ok_or(SessionError::NoSelection)?;

        if self
            .current_question()
            .is_some_and(|q| q.is_correct(picked))
        {
            self.score += 1;
        }
        self.picked = None;
        self.position += 1;
        Ok(self.phase())
    }

    /// `position / N`, or `None` when there is nothing to measure against.
    pub fn progress_fraction(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        Some(self.position as f64 / total as f64)
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.as_ref()?.get(self.position)
    }

    pub fn questions(&self) -> &[Question] {
        self.questions.as_deref().unwrap_or(&[])
    }

    pub fn total(&self) -> usize {
        self.questions().len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn picked(&self) -> Option<usize> {
        self.picked
    }

    pub fn score(&self) -> usize {
        self.score
    }

    fn expect_phase(&self, op: &'static str, expected: Phase) -> Result<(), SessionError> {
        let phase = self.phase();
        if phase == expected {
            Ok(())
        } else {
            Err(SessionError::IllegalState { op, phase })
        }
    }
}
