use std::cell::Cell;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::rngs::mock::StepRng;

use quizr::session::controller::{EmptyReason, SessionController};
use quizr::session::params::{Difficulty, SessionParameters};
use quizr::session::question::RawQuestionRecord;
use quizr::session::state::Phase;
use quizr::source::SourceError;
use quizr::source::opentdb::parse_batch;

fn record(text: &str, correct: &str, incorrect: &[&str]) -> RawQuestionRecord {
    RawQuestionRecord {
        text: text.to_string(),
        correct_answer: correct.to_string(),
        incorrect_answers: incorrect.iter().map(|s| s.to_string()).collect(),
    }
}

fn five_questions() -> Vec<RawQuestionRecord> {
    (1..=5)
        .map(|n| record(&format!("Question {n}?"), "right", &["wrong a", "wrong b", "wrong c"]))
        .collect()
}

fn counting_controller<R: rand::Rng>(rng: R) -> (SessionController<R>, Rc<Cell<usize>>) {
    let ended = Rc::new(Cell::new(0));
    let counter = Rc::clone(&ended);
    let controller = SessionController::new(Box::new(move || counter.set(counter.get() + 1)), rng);
    (controller, ended)
}

fn wrong_index(correct: usize, count: usize) -> usize {
    (correct + 1) % count
}

#[test]
fn test_five_question_quiz_scores_odd_answers() {
    let (mut controller, ended) = counting_controller(SmallRng::seed_from_u64(7));
    let ticket = controller
        .request(SessionParameters::new(9, Some(Difficulty::Easy)))
        .unwrap();
    assert_eq!(controller.phase(), Phase::Loading);
    assert!(controller.complete(ticket, Ok(five_questions())));
    assert_eq!(controller.phase(), Phase::Active);

    for n in 1..=5 {
        let question = controller.view().current_question.unwrap();
        let answer = if n % 2 == 1 {
            question.correct_index()
        } else {
            wrong_index(question.correct_index(), question.option_count())
        };
        controller.submit_selection(answer).unwrap();
        controller.advance().unwrap();
    }

    let view = controller.view();
    assert_eq!(view.phase, Phase::Finished);
    assert_eq!(view.score, 3);
    assert_eq!(view.total, 5);
    assert_eq!(view.progress, Some(1.0));
    assert!(view.current_question.is_none());
    assert_eq!(ended.get(), 1);
}

#[test]
fn test_empty_provider_response_is_empty_phase() {
    let (mut controller, ended) = counting_controller(StepRng::new(0, 0));
    let ticket = controller.request(SessionParameters::new(25, None)).unwrap();
    let batch = parse_batch(r#"{"response_code":1,"results":[]}"#);
    assert!(controller.complete(ticket, batch));

    let view = controller.view();
    assert_eq!(view.phase, Phase::Empty);
    assert_eq!(view.progress, None);
    assert_eq!(view.empty_reason, Some(&EmptyReason::NoResults));
    assert!(controller.advance().unwrap_err().is_illegal_state());
    assert_eq!(ended.get(), 0);
}

#[test]
fn test_unreachable_provider_is_reported() {
    let (mut controller, _ended) = counting_controller(StepRng::new(0, 0));
    let ticket = controller.request(SessionParameters::new(25, None)).unwrap();
    assert!(controller.complete(ticket, Err(SourceError::Offline)));
    assert!(matches!(
        controller.view().empty_reason,
        Some(EmptyReason::SourceUnavailable(_))
    ));
}

#[test]
fn test_restart_after_finish_replays_same_questions() {
    let (mut controller, ended) = counting_controller(StepRng::new(0, 0));
    let ticket = controller.request(SessionParameters::new(9, None)).unwrap();
    controller.complete(ticket, Ok(five_questions()));
    let first_texts: Vec<String> = controller
        .session()
        .questions()
        .iter()
        .map(|q| q.text().to_string())
        .collect();

    while controller.phase() == Phase::Active {
        let correct = controller.view().current_question.unwrap().correct_index();
        controller.submit_selection(correct).unwrap();
        controller.advance().unwrap();
    }
    assert_eq!(ended.get(), 1);

    controller.restart().unwrap();
    let view = controller.view();
    assert_eq!((view.phase, view.position, view.score), (Phase::Active, 0, 0));
    let replay_texts: Vec<String> = controller
        .session()
        .questions()
        .iter()
        .map(|q| q.text().to_string())
        .collect();
    assert_eq!(first_texts, replay_texts);

    while controller.phase() == Phase::Active {
        controller.submit_selection(0).unwrap();
        controller.advance().unwrap();
    }
    assert_eq!(ended.get(), 2);
}

#[test]
fn test_slow_first_fetch_cannot_overwrite_second() {
    let (mut controller, _ended) = counting_controller(StepRng::new(0, 0));
    let params_a = SessionParameters::new(9, None);
    let params_b = SessionParameters::new(23, Some(Difficulty::Hard));

    let ticket_a = controller.request(params_a).unwrap();
    let ticket_b = controller.request(params_b).unwrap();

    let batch_b = vec![record("About B?", "b", &["x"])];
    assert!(controller.complete(ticket_b, Ok(batch_b)));

    let batch_a = vec![record("About A?", "a", &["y"]), record("More A?", "a", &["z"])];
    assert!(!controller.complete(ticket_a, Ok(batch_a)));

    let view = controller.view();
    assert_eq!(view.params, Some(params_b));
    assert_eq!(view.total, 1);
    assert_eq!(view.current_question.unwrap().text(), "About B?");
}
