use crate::quiz::Exam;

/// Why a normalized dataset cannot be played. Question positions are 1-based.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("所有原始測驗資料轉換後均無效或沒有題目。請檢查 quiz_data.json 的內容與結構。")]
    AllExamsInvalid,
    #[error("沒有可用的測驗")]
    NoExams,
    #[error("測驗索引 {0} 缺少有效的標題")]
    MissingTitle(usize),
    #[error("測驗 \"{0}\" 沒有題目或題目列表無效")]
    NoQuestions(String),
    #[error("測驗 \"{exam}\" 第 {question} 題缺少必要資訊 (ID or text)")]
    MissingIdOrText { exam: String, question: usize },
    #[error("測驗 \"{exam}\" 第 {question} 題缺少選項")]
    NoOptions { exam: String, question: usize },
    #[error("測驗 \"{exam}\" 第 {question} 題分數無效 (得到: {points})")]
    InvalidPoints {
        exam: String,
        question: usize,
        points: f64,
    },
    #[error("測驗 \"{exam}\" 第 {question} 題缺少正確答案(或非數字格式)")]
    MissingAnswer { exam: String, question: usize },
    #[error("測驗 \"{exam}\" 第 {question} 題的正確答案 ({answer}) 不在選項中")]
    AnswerNotInOptions {
        exam: String,
        question: usize,
        answer: i64,
    },
}

/// Checks the normalized exams before anything is offered to the user.
/// The first problem found wins.
pub fn validate(exams: &[Exam], raw_exam_count: usize) -> Result<(), ValidationError> {
    if exams.is_empty() {
        return Err(if raw_exam_count > 0 {
            ValidationError::AllExamsInvalid
        } else {
            ValidationError::NoExams
        });
    }

    for (exam_idx, exam) in exams.iter().enumerate() {
        if exam.title.is_empty() {
            return Err(ValidationError::MissingTitle(exam_idx));
        }
        if exam.questions.is_empty() {
            return Err(ValidationError::NoQuestions(exam.title.clone()));
        }

        for (idx, question) in exam.questions.iter().enumerate() {
            let position = idx + 1;
            if question.id.is_none() || question.text.is_none() {
                return Err(ValidationError::MissingIdOrText {
                    exam: exam.title.clone(),
                    question: position,
                });
            }
            if question.options.is_empty() {
                return Err(ValidationError::NoOptions {
                    exam: exam.title.clone(),
                    question: position,
                });
            }
            if !(question.points > 0.0) {
                return Err(ValidationError::InvalidPoints {
                    exam: exam.title.clone(),
                    question: position,
                    points: question.points,
                });
            }
            let answer = question.answer.ok_or_else(|| ValidationError::MissingAnswer {
                exam: exam.title.clone(),
                question: position,
            })?;
            if question.option(answer).is_none() {
                return Err(ValidationError::AnswerNotInOptions {
                    exam: exam.title.clone(),
                    question: position,
                    answer,
                });
            }
        }
    }

    Ok(())
}
