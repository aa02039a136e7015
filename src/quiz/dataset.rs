use log::warn;
use serde_json::{Map, Value};

use crate::quiz::{self, Exam, Question, QuizOption};

/// Turns the raw dataset into playable exams.
///
/// Never fails: exams and questions that cannot be played are logged and
/// left out. An exam with no playable question is dropped entirely.
pub fn normalize(raw: &Value) -> Vec<Exam> {
    let exams = match raw.as_object() {
        Some(exams) => exams,
        None => {
            warn!("Quiz data is not an object, no exams can be loaded");
            return Vec::new();
        }
    };

    object_keys(exams)
        .into_iter()
        .filter_map(|(exam_key, exam)| normalize_exam(exam_key, exam))
        .filter(|exam| !exam.questions.is_empty())
        .collect()
}

/// Number of top-level entries, as the page sees them before conversion.
pub fn raw_exam_count(raw: &Value) -> usize {
    raw.as_object().map(|exams| exams.len()).unwrap_or(0)
}

fn normalize_exam(exam_key: &str, exam: &Value) -> Option<Exam> {
    let questions = match exam.get("questions").and_then(Value::as_array) {
        Some(questions) => questions,
        None => {
            warn!(
                "Exam {:?} has no questions or questions are not an array",
                exam_key
            );
            return None;
        }
    };

    let exam_number = exam_number(exam_key, exam.get("exam_number"));
    let questions = questions
        .iter()
        .enumerate()
        .filter_map(|(idx, question)| normalize_question(exam_key, idx, question))
        .collect();

    Some(Exam {
        exam_id: exam_key.to_string(),
        title: quiz::exam_title(&exam_number),
        scoring_info: quiz::SCORING_INFO.to_string(),
        questions,
    })
}

fn normalize_question(exam_key: &str, idx: usize, question: &Value) -> Option<Question> {
    let question = match question.as_object() {
        Some(question) => question,
        None => {
            warn!("Entry {} in exam {:?} is not a question object", idx, exam_key);
            return None;
        }
    };

    let raw_number = question.get("question_number");
    let number = raw_number.and_then(question_number);

    // Arrays count as option mappings keyed by position, same as in the page.
    let options: Vec<(String, &Value)> = match question.get("options") {
        Some(Value::Object(options)) => object_keys(options)
            .into_iter()
            .map(|(key, text)| (key.to_string(), text))
            .collect(),
        Some(Value::Array(options)) => options
            .iter()
            .enumerate()
            .map(|(key, text)| (key.to_string(), text))
            .collect(),
        _ => {
            warn!(
                "Question {} in exam {:?} has invalid options",
                display(raw_number),
                exam_key
            );
            return None;
        }
    };

    let options: Vec<QuizOption> = options
        .into_iter()
        .filter_map(|(key, text)| match parse_leading_int(&key) {
            Some(option_id) => Some(QuizOption::new(option_id, display_text(text))),
            None => {
                warn!(
                    "Option {:?} of question {} in exam {:?} is not numbered, skipping it",
                    key,
                    display(raw_number),
                    exam_key
                );
                None
            }
        })
        .collect();

    if options.is_empty() {
        warn!(
            "Question {} in exam {:?} has no options",
            display(raw_number),
            exam_key
        );
        return None;
    }

    Some(Question {
        id: raw_number.cloned(),
        text: question_text(question.get("question_text")),
        options,
        answer: question.get("answer").and_then(answer),
        points: quiz::points_for(number),
    })
}

/// Keys in the order a browser enumerates them: array-index keys ascending,
/// then every other key in document order.
pub fn object_keys(map: &Map<String, Value>) -> Vec<(&str, &Value)> {
    let mut indexed: Vec<(u32, &str, &Value)> = Vec::new();
    let mut named: Vec<(&str, &Value)> = Vec::new();
    for (key, value) in map {
        match array_index(key) {
            Some(idx) => indexed.push((idx, key, value)),
            None => named.push((key, value)),
        }
    }
    indexed.sort_by_key(|(idx, _, _)| *idx);
    indexed
        .into_iter()
        .map(|(_, key, value)| (key, value))
        .chain(named)
        .collect()
}

fn array_index(key: &str) -> Option<u32> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if key.len() > 1 && key.starts_with('0') {
        return None;
    }
    // 2^32 - 1 itself is not a valid array index
    key.parse::<u32>().ok().filter(|idx| *idx != u32::MAX)
}

/// Reads the integer at the start of `s`, ignoring leading whitespace and
/// trailing garbage: `" 12abc"` is 12, `"abc"` is nothing.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

fn exam_number(exam_key: &str, explicit: Option<&Value>) -> String {
    match explicit {
        Some(Value::Number(n)) if n.as_f64().map_or(false, |n| n != 0.0) => number_text(n),
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => match parse_leading_int(exam_key) {
            Some(n) => n.to_string(),
            None => exam_key.to_string(),
        },
    }
}

fn question_number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn question_text(raw: Option<&Value>) -> Option<String> {
    match raw {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Some(quiz::MISSING_TEXT.to_string()),
        Some(Value::String(s)) if s.is_empty() => Some(quiz::MISSING_TEXT.to_string()),
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Some(quiz::MISSING_TEXT.to_string()),
        Some(_) => None,
    }
}

fn answer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => match n.as_i64() {
            Some(n) => Some(n),
            None => n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64),
        },
        Value::String(s) => parse_leading_int(s),
        _ => None,
    }
}

fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn display(value: Option<&Value>) -> String {
    value.map(display_text).unwrap_or_else(|| "undefined".to_string())
}
