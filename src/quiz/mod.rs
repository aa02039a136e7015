pub mod dataset;
pub mod review;
pub mod session;
pub mod validate;

pub use dataset::normalize;
pub use review::Review;
pub use session::{Action, Key, Session, State};
pub use validate::{validate, ValidationError};

pub const SCORING_INFO: &str = "第1-40題每題1.5分，第41-60題每題2分";
pub const MISSING_TEXT: &str = "題目文字遺失";

pub const REGULAR_POINTS: f64 = 1.5;
pub const BONUS_POINTS: f64 = 2.0;

/// Questions 41 to 60 are worth more than the rest.
pub fn points_for(question_number: Option<f64>) -> f64 {
    match question_number {
        Some(n) if (41.0..=60.0).contains(&n) => BONUS_POINTS,
        _ => REGULAR_POINTS,
    }
}

pub fn exam_title(exam_number: &str) -> String {
    format!("第 {} 屆金融科技力知識檢定測驗", exam_number)
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Exam {
    pub exam_id: String,
    pub title: String,
    pub scoring_info: String,
    pub questions: Vec<Question>,
}

impl Exam {
    /// Label used in the exam selector.
    pub fn label(&self) -> String {
        format!("{} ({} 題)", self.title, self.questions.len())
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Question {
    /// The raw `question_number`; `None` only when the field is absent.
    pub id: Option<serde_json::Value>,
    /// `None` when the raw text is present but not a string.
    pub text: Option<String>,
    pub options: Vec<QuizOption>,
    /// `None` when the raw answer has no integer reading.
    pub answer: Option<i64>,
    pub points: f64,
}

impl Question {
    pub fn id_label(&self) -> String {
        match &self.id {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) => "null".to_string(),
            Some(other) => other.to_string(),
            None => "undefined".to_string(),
        }
    }

    /// `{id}. {text} ({points}分)`, as shown on the question and in the review.
    pub fn heading(&self) -> String {
        format!(
            "{}. {} ({:.1}分)",
            self.id_label(),
            self.text.as_deref().unwrap_or(MISSING_TEXT),
            self.points
        )
    }

    pub fn option(&self, option_id: i64) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.option_id == option_id)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QuizOption {
    pub option_id: i64,
    pub text: String,
}

impl QuizOption {
    pub fn new(option_id: i64, text: String) -> Self {
        Self { option_id, text }
    }

    pub fn label(&self) -> String {
        format!("({}) {}", self.option_id, self.text)
    }
}

/// Failures of a single user action. The current state is left untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuizError {
    #[error("請先選擇一個測驗！")]
    NoExamSelected,
    /// Carries the 0-based index; the message counts from 1.
    #[error("開始測驗時發生錯誤：找不到第 {} 個測驗", .0 + 1)]
    UnknownExam(usize),
    #[error("開始測驗時發生錯誤：請先返回測驗選擇")]
    AlreadyStarted,
    #[error("請選擇一個答案！")]
    NoAnswerSelected,
    #[error("處理答案時發生錯誤：選項 ({0}) 不存在")]
    UnknownOption(i64),
    #[error("處理答案時發生錯誤：目前沒有進行中的測驗")]
    NotInProgress,
    #[error("重置測驗時發生錯誤：測驗尚未結束")]
    NotFinished,
    #[error("載入測驗資料時發生錯誤：{0}")]
    Invalid(#[from] ValidationError),
}
