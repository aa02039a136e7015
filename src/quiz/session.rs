use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::quiz::{Exam, Question, QuizError, Review, ValidationError};

/// Where the user is in the quiz. Every transition borrows the current state
/// and hands back a new one, so a failed action never leaves a half-updated
/// session behind.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Selecting,
    InProgress(Session),
    Finished(Session),
}

/// One attempt at one exam.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Session {
    /// Private copy of the exam with its questions shuffled.
    pub exam: Exam,
    pub current_question: usize,
    /// One slot per question, `None` while unanswered.
    pub answers: Vec<Option<i64>>,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Start the exam at this index of the exam list, `None` if nothing is selected.
    Start(Option<usize>),
    Select(i64),
    Advance,
    Restart,
}

/// Keys the question screen reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(u8),
    Enter,
    Space,
}

impl Key {
    pub fn from_char(c: char) -> Option<Key> {
        match c {
            '1'..='9' => c.to_digit(10).map(|d| Key::Digit(d as u8)),
            '\n' | '\r' => Some(Key::Enter),
            ' ' => Some(Key::Space),
            _ => None,
        }
    }
}

impl State {
    pub fn apply<R: Rng + ?Sized>(
        &self,
        action: Action,
        exams: &[Exam],
        rng: &mut R,
    ) -> Result<State, QuizError> {
        debug!("Applying {:?}", action);
        match action {
            Action::Start(selection) => match self {
                State::Selecting => start(exams, selection, rng),
                _ => Err(QuizError::AlreadyStarted),
            },
            Action::Select(option_id) => match self {
                State::InProgress(session) => Ok(State::InProgress(session.select(option_id)?)),
                _ => Err(QuizError::NotInProgress),
            },
            Action::Advance => match self {
                State::InProgress(session) => session.advance(),
                _ => Err(QuizError::NotInProgress),
            },
            Action::Restart => match self {
                State::InProgress(_) => Err(QuizError::NotFinished),
                State::Selecting | State::Finished(_) => Ok(State::Selecting),
            },
        }
    }

    /// Keyboard shortcuts only work on the question screen and map onto the
    /// same actions as clicking.
    pub fn action_for_key(&self, key: Key) -> Option<Action> {
        let session = match self {
            State::InProgress(session) => session,
            _ => return None,
        };
        match key {
            Key::Digit(n) => session
                .question()
                .options
                .get(usize::from(n).checked_sub(1)?)
                .map(|option| Action::Select(option.option_id)),
            Key::Enter | Key::Space => Some(Action::Advance),
        }
    }
}

pub fn start<R: Rng + ?Sized>(
    exams: &[Exam],
    selection: Option<usize>,
    rng: &mut R,
) -> Result<State, QuizError> {
    let idx = selection.ok_or(QuizError::NoExamSelected)?;
    let mut exam = exams.get(idx).cloned().ok_or(QuizError::UnknownExam(idx))?;
    if exam.questions.is_empty() {
        return Err(ValidationError::NoQuestions(exam.title).into());
    }
    exam.questions.shuffle(rng);

    debug!(
        "Starting exam {:?} with {} questions",
        exam.exam_id,
        exam.questions.len()
    );
    let answers = vec![None; exam.questions.len()];
    Ok(State::InProgress(Session {
        exam,
        current_question: 0,
        answers,
        score: 0.0,
    }))
}

impl Session {
    pub fn question(&self) -> &Question {
        &self.exam.questions[self.current_question]
    }

    pub fn is_last_question(&self) -> bool {
        self.current_question + 1 == self.exam.questions.len()
    }

    pub fn selected(&self) -> Option<i64> {
        self.answers[self.current_question]
    }

    pub fn progress(&self) -> String {
        format!(
            "第 {} / {} 題",
            self.current_question + 1,
            self.exam.questions.len()
        )
    }

    pub fn advance_label(&self) -> &'static str {
        if self.is_last_question() {
            "提交測驗"
        } else {
            "下一題"
        }
    }

    /// The latest selection replaces any earlier one.
    pub fn select(&self, option_id: i64) -> Result<Session, QuizError> {
        if self.question().option(option_id).is_none() {
            return Err(QuizError::UnknownOption(option_id));
        }
        let mut next = self.clone();
        next.answers[self.current_question] = Some(option_id);
        Ok(next)
    }

    pub fn advance(&self) -> Result<State, QuizError> {
        if self.selected().is_none() {
            return Err(QuizError::NoAnswerSelected);
        }
        let mut next = self.clone();
        if self.is_last_question() {
            next.score = Review::of(&next).total;
            debug!("Exam {:?} finished with {}", next.exam.exam_id, next.score);
            return Ok(State::Finished(next));
        }
        next.current_question += 1;
        Ok(State::InProgress(next))
    }
}
