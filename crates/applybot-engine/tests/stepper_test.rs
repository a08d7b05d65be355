mod common;

use applybot_engine::config::schema::RecoveryMode;
use applybot_engine::failure::RecoveryDecision;
use applybot_engine::knowledge::{FieldOption, KnowledgeBase, KnowledgeEntry, Profile, TechLexicon};
use applybot_engine::logs::{AnswerType, FailureLogEntry, JsonLinesFile, QuestionLogger};
use applybot_engine::stepper::{ModalOutcome, StepperError};
use common::{Click, FakePage};
use serde_json::json;
use tempfile::TempDir;

const JOB_URL: &str = "https://www.linkedin.com/jobs/view/3912/";

fn knowledge() -> KnowledgeBase {
    let profile = Profile {
        phone: Some("555-0100".into()),
        email: Some("ada@example.com".into()),
        legally_authorized: Some(true),
        experience_years: json!({ "Python": 5, "Rust": 2 })
            .as_object()
            .cloned()
            .unwrap(),
        ..Profile::default()
    };
    KnowledgeBase {
        curated: vec![
            KnowledgeEntry::new("Will you now or in the future require sponsorship?", json!(false)),
            KnowledgeEntry::new("What is your preferred work shift?", json!("Night")),
        ],
        duration: vec![],
        lexicon: TechLexicon::new([("Python", vec!["python"]), ("Rust", vec!["rust"])]),
        profile,
    }
}

fn page() -> FakePage {
    let mut page = FakePage::new(JOB_URL);
    page.active_job("3912");
    page
}

#[tokio::test]
async fn test_phone_filled_and_submitted_without_logging() {
    let dir = TempDir::new().unwrap();
    let config = common::config(dir.path());
    let stepper = common::stepper(&config, knowledge());

    let mut page = page();
    let phone = page.text_input(0, "phone", "Mobile phone number Mobile phone number");
    page.submit_button(0);
    let done = page.dismiss_button(1, Click::Nothing);

    let outcome = stepper.process_modal(&mut page).await.unwrap();

    assert_eq!(outcome, ModalOutcome::Submitted { steps: 1 });
    assert_eq!(page.filled(phone), Some("555-0100"));
    assert!(page.clicked(done), "confirmation should be dismissed");
    assert!(!config.logs.question_log.exists());
}

#[tokio::test]
async fn test_custom_duration_question_filled_from_profile() {
    let dir = TempDir::new().unwrap();
    let config = common::config(dir.path());
    let stepper = common::stepper(&config, knowledge());

    let mut page = page();
    let years = page.custom_number(
        0,
        "custom-1",
        "How many years of work experience do you have with Python?",
    );
    page.submit_button(0);

    stepper.process_modal(&mut page).await.unwrap();

    assert_eq!(page.filled(years), Some("5"));
}

#[tokio::test]
async fn test_unanswered_question_is_logged_once() {
    let dir = TempDir::new().unwrap();
    let config = common::config(dir.path());
    let stepper = common::stepper(&config, knowledge());

    let mut page = page();
    let relocate = page.text_input(0, "relocate", "Are you willing to relocate?");
    page.next_button(0);
    page.text_input(1, "relocate-again", "Are you willing to relocate?");
    page.submit_button(1);

    stepper.process_modal(&mut page).await.unwrap();

    assert_eq!(page.filled(relocate), None);
    let entries = QuestionLogger::new(&config.logs.question_log)
        .entries()
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].question, "Are you willing to relocate?");
    assert_eq!(entries[0].job_id, "3912");
    assert_eq!(entries[0].answer_type, AnswerType::Text);
    assert_eq!(entries[0].answer, None);
}

#[tokio::test]
async fn test_unlabeled_statement_is_not_logged() {
    let dir = TempDir::new().unwrap();
    let config = common::config(dir.path());
    let stepper = common::stepper(&config, knowledge());

    let mut page = page();
    page.text_input(0, "middle", "Middle initial");
    page.submit_button(0);

    stepper.process_modal(&mut page).await.unwrap();

    assert!(!config.logs.question_log.exists());
}

#[tokio::test]
async fn test_step_budget_stops_endless_modal() {
    let dir = TempDir::new().unwrap();
    let config = common::config(dir.path());
    let stepper = common::stepper(&config, knowledge());

    let mut page = page();
    for step in 0..20 {
        page.next_button(step);
    }

    let outcome = stepper.process_modal(&mut page).await.unwrap();

    assert_eq!(outcome, ModalOutcome::BudgetExhausted { steps: 12 });
    assert_eq!(page.clicks.len(), 12);
    assert_eq!(page.current, 12);
}

#[tokio::test]
async fn test_validation_error_logs_failure_and_saves() {
    let dir = TempDir::new().unwrap();
    let config = common::config(dir.path());
    let stepper = common::stepper(&config, knowledge());

    let mut page = page();
    page.text_input(0, "name", "First name");
    page.validation_error(0, "Please enter a valid answer");
    let next = page.next_button(0);
    page.dismiss_button(0, Click::GoTo(1));
    let save = page.dialog_button(1, "Save", Click::Nothing);
    let discard = page.dialog_button(1, "Discard", Click::Nothing);

    let err = stepper.process_modal(&mut page).await.unwrap_err();

    let StepperError::Validation(failure) = err else {
        panic!("expected a validation failure");
    };
    assert_eq!(failure.step, 1);
    assert_eq!(failure.messages, vec!["Please enter a valid answer".to_string()]);
    assert_eq!(failure.decision, RecoveryDecision::Continue);
    assert_eq!(failure.report.context.job_id, "3912");
    assert!(page.clicked(save));
    assert!(!page.clicked(discard));
    assert!(!page.clicked(next));

    let failures = JsonLinesFile::<FailureLogEntry>::new(&config.logs.failure_log)
        .read_all()
        .await
        .unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].job_id, "3912");
    assert_eq!(failures[0].url, JOB_URL);
    assert_eq!(failures[0].error, "Please enter a valid answer");
}

#[tokio::test]
async fn test_validation_error_with_abort_policy() {
    let dir = TempDir::new().unwrap();
    let mut config = common::config(dir.path());
    let stepper = common::stepper_with_mode(&mut config, knowledge(), RecoveryMode::Abort);

    let mut page = page();
    page.validation_error(0, "");
    page.next_button(0);

    let err = stepper.process_modal(&mut page).await.unwrap_err();

    assert_eq!(err.decision(), Some(RecoveryDecision::Abort));
    assert!(err.to_string().contains("step 1"));
}

#[tokio::test]
async fn test_boolean_answers_select_matching_choices() {
    let dir = TempDir::new().unwrap();
    let config = common::config(dir.path());
    let stepper = common::stepper(&config, knowledge());

    let mut page = page();
    let authorized = page.dropdown(
        0,
        "auth",
        "Are you legally authorized to work in the United States?",
        &[
            ("Select an option", "Select an option"),
            ("Yes", "Yes"),
            ("No", "No"),
        ],
    );
    let (_, radios) = page.radio_group(
        0,
        "sponsorship",
        "Will you now or in the future require sponsorship?",
        &[("Yes", "Yes"), ("No", "No")],
    );
    page.submit_button(0);

    stepper.process_modal(&mut page).await.unwrap();

    assert_eq!(page.selections, vec![(authorized, "Yes".to_string())]);
    assert!(!page.is_checked(radios[0]));
    assert!(page.is_checked(radios[1]));
}

#[tokio::test]
async fn test_unmatched_option_is_logged_with_choices() {
    let dir = TempDir::new().unwrap();
    let config = common::config(dir.path());
    let stepper = common::stepper(&config, knowledge());

    let mut page = page();
    page.dropdown(
        0,
        "shift",
        "What is your preferred work shift?",
        &[
            ("Select an option", "Select an option"),
            ("Day", "day"),
            ("Evening", "evening"),
        ],
    );
    page.submit_button(0);

    stepper.process_modal(&mut page).await.unwrap();

    assert!(page.selections.is_empty());
    let entries = QuestionLogger::new(&config.logs.question_log)
        .entries()
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].answer_type, AnswerType::Dropdown);
    assert_eq!(
        entries[0].options,
        Some(vec![
            FieldOption::new("Day", "day"),
            FieldOption::new("Evening", "evening"),
        ])
    );
}

#[tokio::test]
async fn test_prefilled_fields_are_left_alone() {
    let dir = TempDir::new().unwrap();
    let config = common::config(dir.path());
    let stepper = common::stepper(&config, knowledge());

    let mut page = page();
    let phone = page.text_input(0, "phone", "Mobile phone number");
    page.set_value(phone, "555-9999");
    let authorized = page.dropdown(
        0,
        "auth",
        "Are you legally authorized to work in the United States?",
        &[("Select an option", "Select an option"), ("Yes", "Yes"), ("No", "No")],
    );
    page.set_value(authorized, "No");
    page.submit_button(0);

    stepper.process_modal(&mut page).await.unwrap();

    assert!(page.fills.is_empty());
    assert!(page.selections.is_empty());
    assert_eq!(page.value_of(phone), "555-9999");
}

#[tokio::test]
async fn test_fields_on_later_steps_are_rediscovered() {
    let dir = TempDir::new().unwrap();
    let config = common::config(dir.path());
    let stepper = common::stepper(&config, knowledge());

    let mut page = page();
    let phone = page.text_input(0, "phone", "Mobile phone number");
    page.next_button(0);
    let email = page.text_input(1, "email", "Email address");
    page.review_button(1);
    page.submit_button(2);

    let outcome = stepper.process_modal(&mut page).await.unwrap();

    assert_eq!(outcome, ModalOutcome::Submitted { steps: 3 });
    assert_eq!(page.filled(phone), Some("555-0100"));
    assert_eq!(page.filled(email), Some("ada@example.com"));
}

#[tokio::test]
async fn test_missing_control_ends_modal() {
    let dir = TempDir::new().unwrap();
    let config = common::config(dir.path());
    let stepper = common::stepper(&config, knowledge());

    let mut page = page();
    page.text_input(0, "phone", "Mobile phone number");

    let outcome = stepper.process_modal(&mut page).await.unwrap();

    assert_eq!(outcome, ModalOutcome::NoControl { steps: 1 });
}

#[tokio::test]
async fn test_review_can_be_terminal() {
    let dir = TempDir::new().unwrap();
    let mut config = common::config(dir.path());
    config.stepper.review_as_next = false;
    let stepper = common::stepper(&config, knowledge());

    let mut page = page();
    let review = page.review_button(0);
    page.submit_button(1);

    let outcome = stepper.process_modal(&mut page).await.unwrap();

    assert_eq!(outcome, ModalOutcome::StoppedAtReview { steps: 1 });
    assert!(!page.clicked(review));
}

#[tokio::test]
async fn test_follow_company_unchecked_on_first_step() {
    let dir = TempDir::new().unwrap();
    let config = common::config(dir.path());
    let stepper = common::stepper(&config, knowledge());

    let mut page = page();
    let follow = page.follow_checkbox(0);
    page.submit_button(0);

    stepper.process_modal(&mut page).await.unwrap();

    assert!(!page.is_checked(follow));
}

#[tokio::test]
async fn test_submit_preferred_over_next() {
    let dir = TempDir::new().unwrap();
    let config = common::config(dir.path());
    let stepper = common::stepper(&config, knowledge());

    let mut page = page();
    let next = page.next_button(0);
    let submit = page.submit_button(0);

    let outcome = stepper.process_modal(&mut page).await.unwrap();

    assert_eq!(outcome, ModalOutcome::Submitted { steps: 1 });
    assert!(page.clicked(submit));
    assert!(!page.clicked(next));
}

#[tokio::test]
async fn test_unknown_technology_duration_is_logged() {
    let dir = TempDir::new().unwrap();
    let config = common::config(dir.path());
    let stepper = common::stepper(&config, knowledge());

    let mut page = page();
    let years = page.text_input(0, "kotlin", "Years of experience with Kotlin");
    page.submit_button(0);

    stepper.process_modal(&mut page).await.unwrap();

    assert_eq!(page.filled(years), None);
    let entries = QuestionLogger::new(&config.logs.question_log)
        .entries()
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].question, "Years of experience with Kotlin");
    assert_eq!(entries[0].answer_type, AnswerType::Text);
}

#[tokio::test]
async fn test_failed_dismiss_does_not_block_failure_handling() {
    let dir = TempDir::new().unwrap();
    let config = common::config(dir.path());
    let stepper = common::stepper(&config, knowledge());

    let mut page = page();
    page.validation_error(0, "bad");
    page.next_button(0);
    let dismiss = page.dismiss_button(0, Click::Fail);

    let err = stepper.process_modal(&mut page).await.unwrap_err();

    assert!(!page.clicked(dismiss));
    let StepperError::Validation(failure) = err else {
        panic!("expected a validation failure");
    };
    assert_eq!(failure.messages, vec!["bad".to_string()]);
    assert_eq!(failure.decision, RecoveryDecision::Continue);

    let failures = JsonLinesFile::<FailureLogEntry>::new(&config.logs.failure_log)
        .read_all()
        .await
        .unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].error, "bad");
}

#[tokio::test]
async fn test_radios_without_values_match_by_caption() {
    let dir = TempDir::new().unwrap();
    let config = common::config(dir.path());
    let stepper = common::stepper(&config, knowledge());

    let mut page = page();
    let (_, radios) = page.radio_group(
        0,
        "sponsorship",
        "Will you now or in the future require sponsorship?",
        &[("Yes", "Yes"), ("No", "No")],
    );
    for radio in &radios {
        page.remove_attribute(*radio, "value");
    }
    page.submit_button(0);

    stepper.process_modal(&mut page).await.unwrap();

    assert!(!page.is_checked(radios[0]));
    assert!(page.is_checked(radios[1]));
    assert!(!config.logs.question_log.exists());
}
