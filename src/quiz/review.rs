use crate::quiz::{QuizOption, Session};

pub const UNANSWERED: &str = "未作答";

/// Results of a finished session, always recomputed from the recorded answers.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub entries: Vec<ReviewEntry>,
    pub total: f64,
    pub possible: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewEntry {
    pub heading: String,
    pub chosen: Option<QuizOption>,
    /// Only filled in when the user got it wrong.
    pub correct: Option<QuizOption>,
    pub is_correct: bool,
    pub earned: f64,
    pub points: f64,
}

impl Review {
    pub fn of(session: &Session) -> Review {
        let mut total = 0.0;
        let mut possible = 0.0;
        let mut entries = Vec::with_capacity(session.exam.questions.len());

        for (idx, question) in session.exam.questions.iter().enumerate() {
            possible += question.points;

            let user_answer = session.answers.get(idx).copied().flatten();
            let is_correct = user_answer.is_some() && user_answer == question.answer;
            let earned = if is_correct { question.points } else { 0.0 };
            total += earned;

            let chosen = user_answer.and_then(|id| question.option(id)).cloned();
            let correct = if is_correct {
                None
            } else {
                question.answer.and_then(|id| question.option(id)).cloned()
            };

            entries.push(ReviewEntry {
                heading: question.heading(),
                chosen,
                correct,
                is_correct,
                earned,
                points: question.points,
            });
        }

        Review {
            entries,
            total,
            possible,
        }
    }

    pub fn percentage(&self) -> f64 {
        if self.possible > 0.0 {
            self.total / self.possible * 100.0
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "您的總得分：{:.1} / {:.1} 分 ({:.1}%)",
            self.total,
            self.possible,
            self.percentage()
        )
    }
}

impl ReviewEntry {
    pub fn chosen_label(&self) -> String {
        self.chosen
            .as_ref()
            .map(QuizOption::label)
            .unwrap_or_else(|| UNANSWERED.to_string())
    }

    /// `None` when the answer was right and there is nothing to correct.
    pub fn correct_label(&self) -> Option<String> {
        if self.is_correct {
            return None;
        }
        Some(
            self.correct
                .as_ref()
                .map(QuizOption::label)
                .unwrap_or_else(|| "N/A".to_string()),
        )
    }

    pub fn points_line(&self) -> String {
        format!("本題得分：{:.1} / {:.1} 分", self.earned, self.points)
    }
}
