//! Builds the self-contained quiz page.
//!
//! The dataset goes into the page as-is; the embedded runtime normalizes it
//! when the page loads. Nothing is fetched at runtime.

use serde::Serialize;

pub const PAGE_TITLE: &str = "金融科技力知識檢定測驗 (完整版 - 隨機出題)";

const STYLE: &str = include_str!("style.css");
/// Quiz model of the page, free of any document access.
const QUIZ: &str = include_str!("quiz.js");
/// DOM wiring on top of `QUIZ`.
const RUNTIME: &str = include_str!("runtime.js");

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("測驗資料必須是以測驗編號字串為鍵的物件")]
    NotAMapping,
    #[error("測驗資料是空的")]
    Empty,
    #[error("無法將測驗資料序列化為 JSON：{0}")]
    Serialize(#[from] serde_json::Error),
}

/// Renders the page for a dataset keyed by exam.
pub fn render<T: Serialize + ?Sized>(quiz_data: &T) -> Result<String, PageError> {
    let value = serde_json::to_value(quiz_data)?;
    let exams = value.as_object().ok_or(PageError::NotAMapping)?;
    if exams.is_empty() {
        return Err(PageError::Empty);
    }

    let data = script_safe(&serde_json::to_string(&value)?);
    log::debug!("Embedding {} exams ({} bytes of JSON)", exams.len(), data.len());

    let mut w = Html::new();
    w.push("<!DOCTYPE html>\n<html lang=\"zh-TW\">\n<head>\n");
    w.push("<meta charset=\"UTF-8\">\n");
    w.push("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    w.push("<title>");
    w.push(PAGE_TITLE);
    w.push("</title>\n<style>\n");
    w.push(STYLE);
    w.push("</style>\n</head>\n<body>\n");
    w.push(BODY);
    w.push("<script id=\"quiz-data\" type=\"application/json\">");
    w.push(&data);
    w.push("</script>\n<script>\n(function () {\n'use strict';\n");
    w.push(QUIZ);
    w.push(RUNTIME);
    w.push("})();\n</script>\n</body>\n</html>\n");
    Ok(w.finish())
}

/// Escapes the characters that could end or confuse an inline `<script>`
/// block. They only occur inside JSON strings, where `\uXXXX` is equivalent.
fn script_safe(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}

struct Html {
    buf: String,
}

impl Html {
    fn new() -> Self {
        Self {
            buf: String::with_capacity(STYLE.len() + QUIZ.len() + RUNTIME.len() + 16 * 1024),
        }
    }
    fn push(&mut self, s: &str) {
        self.buf.push_str(s);
    }
    fn finish(self) -> String {
        self.buf
    }
}

const BODY: &str = r#"<div id="quiz-container">
<h1>金融科技力知識檢定測驗 (完整版 - 隨機出題)</h1>

<div id="exam-selection">
<h2>請選擇測驗：</h2>
<select id="exam-selector">
<option value="">-- 選擇一個測驗 --</option>
</select>
<button id="start-quiz-btn" disabled>開始測驗</button>
</div>

<div id="question-area" style="display:none;">
<h2 id="quiz-title"></h2>
<p id="question-text"></p>
<div id="options-container"></div>
<p id="feedback" style="display:none;"></p>
<button id="next-question-btn">下一題</button>
<p id="progress-text"></p>
</div>

<div id="results-area" style="display:none;">
<h2>測驗結果</h2>
<p id="score-text"></p>
<h3>題目回顧：</h3>
<div id="review-area"></div>
<button id="restart-quiz-btn">返回測驗選擇</button>
</div>
</div>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{self, QuizError, Review, ValidationError};
    use serde_json::json;
    use std::collections::HashMap;

    fn embedded(page: &str) -> &str {
        let start = page
            .find("<script id=\"quiz-data\" type=\"application/json\">")
            .unwrap();
        let rest = &page[start..];
        let open = rest.find('>').unwrap() + 1;
        let close = rest.find("</script>").unwrap();
        &rest[open..close]
    }

    #[test]
    fn embeds_the_dataset_verbatim() {
        let data = json!({"1": {"exam_number": 1, "questions": [
            {"question_number": 1, "question_text": "什麼是區塊鏈？", "options": {"1": "A", "2": "B"}, "answer": 1}
        ]}});
        let page = render(&data).unwrap();

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<html lang=\"zh-TW\">"));
        assert!(page.contains("什麼是區塊鏈？"));
        let parsed: serde_json::Value = serde_json::from_str(embedded(&page)).unwrap();
        assert_eq!(parsed, data);
    }

    #[test]
    fn script_tags_in_data_cannot_break_out() {
        let data = json!({"1": {"questions": [
            {"question_number": 1, "question_text": "</script><script>alert(1)</script>", "options": {"1": "a & b"}, "answer": 1}
        ]}});
        let page = render(&data).unwrap();
        let block = embedded(&page);

        assert!(!block.contains('<'));
        assert!(!block.contains('&'));
        assert_eq!(page.matches("</script>").count(), 2);
        let parsed: serde_json::Value = serde_json::from_str(block).unwrap();
        assert_eq!(parsed, data);
    }

    #[test]
    fn line_separators_are_escaped() {
        assert_eq!(script_safe("\"a\u{2028}b\u{2029}\""), "\"a\\u2028b\\u2029\"");
    }

    #[test]
    fn rejects_data_that_is_not_a_mapping() {
        assert!(matches!(render(&json!([1, 2])), Err(PageError::NotAMapping)));
        assert!(matches!(render(&json!("exam")), Err(PageError::NotAMapping)));
        assert!(matches!(render(&json!(null)), Err(PageError::NotAMapping)));
    }

    #[test]
    fn rejects_an_empty_mapping() {
        let err = render(&json!({})).unwrap_err();
        assert!(matches!(err, PageError::Empty));
        assert_eq!(err.to_string(), "測驗資料是空的");
    }

    #[test]
    fn reports_data_that_cannot_become_json() {
        let mut data: HashMap<(u8, u8), &str> = HashMap::new();
        data.insert((1, 2), "exam");
        assert!(matches!(render(&data), Err(PageError::Serialize(_))));
    }

    #[test]
    fn page_is_self_contained() {
        let page = render(&json!({"1": {"questions": []}})).unwrap();
        assert!(!page.contains("src=\"http"));
        assert!(!page.contains("<link"));
        assert!(page.contains("function loadExams(raw)"));
        assert!(page.contains("function dispatch(transition)"));
        assert!(page.contains("#quiz-container"));
    }

    /// Runs `quiz.js` followed by `script` and parses the JSON string that
    /// the script ends with.
    fn eval_quiz(raw: &serde_json::Value, script: &str) -> serde_json::Value {
        let source = format!(
            "var console = {{ warn: function () {{}}, error: function () {{}} }};\n{}\nconst raw = {};\n{}",
            QUIZ, raw, script
        );
        let mut context = boa_engine::Context::default();
        let value = context
            .eval(boa_engine::Source::from_bytes(&source))
            .unwrap();
        let text = value.as_string().unwrap().to_std_string_escaped();
        serde_json::from_str(&text).unwrap()
    }

    fn round_trip() -> serde_json::Value {
        json!({"1": {"exam_number": 1, "questions": [
            {"question_number": 1, "question_text": "Q1", "options": {"1": "A", "2": "B"}, "answer": 1},
            {"question_number": 41, "question_text": "Q41", "options": {"1": "A", "2": "B"}, "answer": 2}
        ]}})
    }

    fn finished(raw: &serde_json::Value, answers: Vec<Option<i64>>) -> Review {
        let exam = quiz::normalize(raw).remove(0);
        Review::of(&quiz::Session {
            exam,
            current_question: 1,
            answers,
            score: 0.0,
        })
    }

    #[test]
    fn page_runtime_normalizes_like_the_rust_model() {
        let raw = json!({
            "b": {"exam_number": 0, "questions": [
                {"question_number": "45", "question_text": "", "options": {"4": "D", "x": "?", "1": "A", "3": 3}, "answer": "4"}
            ]},
            "10": {"exam_number": "第十", "questions": [
                {"question_number": 1, "question_text": "Q", "options": ["甲", "乙"], "answer": 1.9},
                {"question_number": 2, "question_text": "no options", "answer": 1}
            ]},
            "2": {"questions": [
                {"question_number": 60, "question_text": 5, "options": {"1": "A"}, "answer": null}
            ]},
            "3": {"questions": "nope"}
        });
        let js = eval_quiz(&raw, "JSON.stringify(normalize(raw));");
        let rust = quiz::normalize(&raw);

        let js = js.as_array().unwrap();
        assert_eq!(js.len(), rust.len());
        for (js_exam, exam) in js.iter().zip(&rust) {
            assert_eq!(js_exam["exam_id"], exam.exam_id.as_str());
            assert_eq!(js_exam["title"], exam.title.as_str());
            assert_eq!(js_exam["scoring_info"], exam.scoring_info.as_str());
            let js_questions = js_exam["questions"].as_array().unwrap();
            assert_eq!(js_questions.len(), exam.questions.len());
            for (js_q, q) in js_questions.iter().zip(&exam.questions) {
                assert_eq!(js_q.get("id"), q.id.as_ref());
                assert_eq!(js_q["text"].as_str(), q.text.as_deref());
                assert_eq!(js_q["answer"].as_i64(), q.answer);
                assert_eq!(js_q["points"].as_f64(), Some(q.points));
                let options: Vec<(i64, &str)> = js_q["options"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|o| (o["option_id"].as_i64().unwrap(), o["text"].as_str().unwrap()))
                    .collect();
                let expected: Vec<(i64, &str)> = q
                    .options
                    .iter()
                    .map(|o| (o.option_id, o.text.as_str()))
                    .collect();
                assert_eq!(options, expected);
            }
        }
    }

    #[test]
    fn page_runtime_scores_like_the_rust_review() {
        let raw = round_trip();
        let js = eval_quiz(
            &raw,
            r#"
            const exams = loadExams(raw).exams;
            const right = { exam: exams[0], current: 1, answers: [1, 2], score: 0 };
            const wrong = Object.assign({}, right, { answers: [2, 1] });
            JSON.stringify({
                points: exams[0].questions.map(function (q) { return q.points; }),
                headings: review(wrong).entries.map(function (e) { return e.heading; }),
                lines: review(wrong).entries.map(pointsLine),
                right: scoreLine(review(right)),
                wrong: scoreLine(review(wrong))
            });
            "#,
        );

        let points: Vec<f64> = js["points"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p.as_f64().unwrap())
            .collect();
        assert_eq!(points, vec![1.5, 2.0]);

        let right = finished(&raw, vec![Some(1), Some(2)]);
        let wrong = finished(&raw, vec![Some(2), Some(1)]);
        assert_eq!(js["right"], right.summary().as_str());
        assert_eq!(js["right"], "您的總得分：3.5 / 3.5 分 (100.0%)");
        assert_eq!(js["wrong"], wrong.summary().as_str());
        assert_eq!(js["wrong"], "您的總得分：0.0 / 3.5 分 (0.0%)");

        let headings: Vec<&str> = wrong.entries.iter().map(|e| e.heading.as_str()).collect();
        let lines: Vec<String> = wrong.entries.iter().map(|e| e.points_line()).collect();
        assert_eq!(js["headings"], json!(headings));
        assert_eq!(js["lines"], json!(lines));
    }

    #[test]
    fn page_runtime_reports_unplayable_data_like_the_rust_validator() {
        let no_options = json!({"1": {"exam_number": 1, "questions": [
            {"question_number": 1, "question_text": "Q1", "answer": 1}
        ]}});
        let js = eval_quiz(&no_options, "JSON.stringify(loadExams(raw));");
        assert_eq!(js["exams"], json!([]));
        assert_eq!(
            js["banner"],
            QuizError::Invalid(ValidationError::AllExamsInvalid).to_string().as_str()
        );

        let bad_answer = json!({"1": {"exam_number": 1, "questions": [
            {"question_number": 7, "question_text": "Q7", "options": {"1": "A"}, "answer": 3}
        ]}});
        let js = eval_quiz(&bad_answer, "JSON.stringify(loadExams(raw));");
        let exams = quiz::normalize(&bad_answer);
        let err = quiz::validate(&exams, 1).unwrap_err();
        assert_eq!(js["banner"], QuizError::Invalid(err).to_string().as_str());

        let js = eval_quiz(&round_trip(), "JSON.stringify(loadExams(raw));");
        assert_eq!(js["banner"], serde_json::Value::Null);
        assert_eq!(js["exams"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn page_runtime_transitions_match_the_rust_session() {
        let js = eval_quiz(
            &round_trip(),
            r#"
            const exams = loadExams(raw).exams;
            let s = { phase: 'selecting' };
            const noSelection = start(s, exams, '').error.message;
            const unknown = start(s, exams, '5').error.message;
            s = start(s, exams, '0').state;
            const progress = progressLine(s.session);
            const unanswered = advance(s).error;
            const notFinished = restart(s).error.message;
            while (s.phase === 'in-progress') {
                const q = s.session.exam.questions[s.session.current];
                s = select(s, q.answer).state;
                s = advance(s).state;
            }
            JSON.stringify({
                noSelection: noSelection,
                unknown: unknown,
                progress: progress,
                unanswered: unanswered,
                notFinished: notFinished,
                phase: s.phase,
                score: s.session.score,
                summary: scoreLine(review(s.session)),
                back: restart(s).state.phase
            });
            "#,
        );

        assert_eq!(js["noSelection"], QuizError::NoExamSelected.to_string().as_str());
        assert_eq!(js["unknown"], QuizError::UnknownExam(5).to_string().as_str());
        assert_eq!(js["unknown"], "開始測驗時發生錯誤：找不到第 6 個測驗");
        assert_eq!(js["progress"], "第 1 / 2 題");
        assert_eq!(js["unanswered"]["kind"], "feedback");
        assert_eq!(
            js["unanswered"]["message"],
            QuizError::NoAnswerSelected.to_string().as_str()
        );
        assert_eq!(js["notFinished"], QuizError::NotFinished.to_string().as_str());
        assert_eq!(js["phase"], "finished");
        assert_eq!(js["score"].as_f64(), Some(3.5));
        assert_eq!(js["summary"], "您的總得分：3.5 / 3.5 分 (100.0%)");
        assert_eq!(js["back"], "selecting");
    }
}
