use std::io::{self, BufRead, Write};

use log::{debug, warn};
use rand::Rng;

use crate::quiz::{Action, Exam, Key, QuizError, Review, Session, State};

/// Runs the quiz in a terminal until the user types `q` or input ends.
///
/// A line is read as a sequence of key presses followed by Enter, so `2`
/// selects the second option and moves on, and an empty line only tries to
/// move on.
pub fn run<R: BufRead, W: Write, G: Rng + ?Sized>(
    exams: &[Exam],
    mut preselected: Option<usize>,
    mut input: R,
    mut out: W,
    rng: &mut G,
) -> io::Result<()> {
    let mut state = State::Selecting;

    loop {
        match &state {
            State::Selecting => show_exam_list(&mut out, exams)?,
            State::InProgress(session) => show_question(&mut out, session)?,
            State::Finished(session) => show_review(&mut out, session)?,
        }
        out.flush()?;

        // --exam skips the first prompt
        let line = match (&state, preselected.take()) {
            (State::Selecting, Some(exam)) => exam.to_string(),
            _ => match read_line(&mut input)? {
                Some(line) => line,
                None => return Ok(()),
            },
        };
        if line.eq_ignore_ascii_case("q") {
            return Ok(());
        }

        state = match &state {
            State::Selecting => {
                let selection = line.parse::<usize>().ok().and_then(|n| n.checked_sub(1));
                step(&mut out, &state, Action::Start(selection), exams, rng)?
            }
            State::InProgress(_) => {
                let mut next = state.clone();
                for key in line.chars().chain(Some('\n')).filter_map(Key::from_char) {
                    match next.action_for_key(key) {
                        Some(action) => next = step(&mut out, &next, action, exams, rng)?,
                        None => debug!("Ignoring {:?}", key),
                    }
                    if !matches!(next, State::InProgress(_)) {
                        break;
                    }
                }
                next
            }
            State::Finished(_) => step(&mut out, &state, Action::Restart, exams, rng)?,
        };
    }
}

/// Applies one action; on failure the message is shown and the state kept.
fn step<W: Write, G: Rng + ?Sized>(
    out: &mut W,
    state: &State,
    action: Action,
    exams: &[Exam],
    rng: &mut G,
) -> io::Result<State> {
    match state.apply(action, exams, rng) {
        Ok(next) => Ok(next),
        Err(QuizError::NoAnswerSelected) => {
            writeln!(out, "{}", QuizError::NoAnswerSelected)?;
            Ok(state.clone())
        }
        Err(err) => {
            warn!("{:?} failed: {}", action, err);
            writeln!(out, "⚠ {}", err)?;
            Ok(state.clone())
        }
    }
}

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn show_exam_list<W: Write>(out: &mut W, exams: &[Exam]) -> io::Result<()> {
    writeln!(out, "\n請選擇測驗：")?;
    for (idx, exam) in exams.iter().enumerate() {
        writeln!(out, "  {}. {}", idx + 1, exam.label())?;
    }
    write!(out, "輸入編號開始測驗 (q 離開)：")
}

fn show_question<W: Write>(out: &mut W, session: &Session) -> io::Result<()> {
    if session.current_question == 0 && session.selected().is_none() {
        writeln!(out, "\n{}", session.exam.title)?;
        writeln!(out, "{}", session.exam.scoring_info)?;
    }
    let question = session.question();
    writeln!(out, "\n{}", session.progress())?;
    writeln!(out, "{}", question.heading())?;
    for option in &question.options {
        let marker = if session.selected() == Some(option.option_id) { "*" } else { " " };
        writeln!(out, " {} {}", marker, option.label())?;
    }
    write!(out, "[1-9 選擇，Enter {}，q 離開]：", session.advance_label())
}

fn show_review<W: Write>(out: &mut W, session: &Session) -> io::Result<()> {
    let review = Review::of(session);
    writeln!(out, "\n測驗結果")?;
    writeln!(out, "{}", review.summary())?;
    writeln!(out, "\n題目回顧：")?;
    for entry in &review.entries {
        writeln!(out, "\n{}", entry.heading)?;
        let verdict = if entry.is_correct { "✔" } else { "✘" };
        writeln!(out, "您的答案：{} {}", entry.chosen_label(), verdict)?;
        if let Some(correct) = entry.correct_label() {
            writeln!(out, "正確答案：{}", correct)?;
        }
        writeln!(out, "{}", entry.points_line())?;
    }
    write!(out, "\n按 Enter 返回測驗選擇 (q 離開)：")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::normalize;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn exams() -> Vec<Exam> {
        normalize(&json!({"1": {"exam_number": 1, "questions": [
            {"question_number": 1, "question_text": "Q1", "options": {"1": "A", "2": "B"}, "answer": 1},
            {"question_number": 2, "question_text": "Q2", "options": {"1": "A", "2": "B"}, "answer": 1}
        ]}}))
    }

    fn session_output(input: &str, preselected: Option<usize>) -> String {
        let mut out = Vec::new();
        let mut rng = StdRng::seed_from_u64(9);
        run(&exams(), preselected, input.as_bytes(), &mut out, &mut rng).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn plays_an_exam_to_the_end() {
        let output = session_output("1\n1\n\n1\n\nq\n", None);

        assert!(output.contains("1. 第 1 屆金融科技力知識檢定測驗 (2 題)"));
        assert!(output.contains("第 1 / 2 題"));
        assert!(output.contains("第 2 / 2 題"));
        assert!(output.contains("請選擇一個答案！"));
        assert!(output.contains("您的總得分：3.0 / 3.0 分 (100.0%)"));
        // back on the exam list after the review
        assert_eq!(output.matches("請選擇測驗：").count(), 2);
    }

    #[test]
    fn wrong_answers_show_the_correction() {
        let output = session_output("2\n2\n\n", Some(1));

        assert!(output.contains("您的總得分：0.0 / 3.0 分 (0.0%)"));
        assert!(output.contains("您的答案：(2) B ✘"));
        assert!(output.contains("正確答案：(1) A"));
    }

    #[test]
    fn bad_exam_choice_is_reported_and_retried() {
        let output = session_output("\n7\nq\n", None);
        assert!(output.contains("⚠ 請先選擇一個測驗！"));
        assert!(output.contains("⚠ 開始測驗時發生錯誤：找不到第 7 個測驗"));
        assert!(!output.contains("第 1 / 2 題"));
    }

    #[test]
    fn stops_at_end_of_input() {
        let output = session_output("1\n", None);
        assert!(output.contains("第 1 / 2 題"));
    }
}
