use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplyConfig {
    #[serde(default)]
    pub stepper: StepperConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default)]
    pub recovery: RecoveryConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub selectors: Selectors,
}

impl ApplyConfig {
    /// Configuration with every delay set to zero.
    pub fn without_delays() -> Self {
        let mut config = Self::default();
        config.stepper.settle_ms = 0;
        config.stepper.confirmation_timeout_ms = 0;
        config.pacing = PacingConfig {
            min_ms: 0,
            max_ms: 0,
            field_settle_ms: 0,
        };
        config.navigation.scroll_wait_ms = 0;
        config.navigation.card_settle_ms = 0;
        config.recovery.delay_ms = 0;
        config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepperConfig {
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    /// Treat a step that only offers "Review" like a "Next" step.
    #[serde(default = "default_review_as_next")]
    pub review_as_next: bool,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default = "default_confirmation_timeout_ms")]
    pub confirmation_timeout_ms: u64,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            review_as_next: default_review_as_next(),
            settle_ms: default_settle_ms(),
            confirmation_timeout_ms: default_confirmation_timeout_ms(),
        }
    }
}

impl StepperConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

fn default_max_steps() -> usize {
    12
}

fn default_review_as_next() -> bool {
    true
}

fn default_settle_ms() -> u64 {
    2000
}

fn default_confirmation_timeout_ms() -> u64 {
    3000
}

/// Randomized delays between field interactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_min_ms")]
    pub min_ms: u64,
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
    #[serde(default = "default_field_settle_ms")]
    pub field_settle_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_ms: default_min_ms(),
            max_ms: default_max_ms(),
            field_settle_ms: default_field_settle_ms(),
        }
    }
}

fn default_min_ms() -> u64 {
    500
}

fn default_max_ms() -> u64 {
    1500
}

fn default_field_settle_ms() -> u64 {
    500
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    #[serde(default = "default_knowledge_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_questions")]
    pub questions: String,
    #[serde(default = "default_duration_questions")]
    pub duration_questions: String,
    #[serde(default = "default_keywords")]
    pub keywords: String,
    #[serde(default = "default_profile")]
    pub profile: String,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            dir: default_knowledge_dir(),
            questions: default_questions(),
            duration_questions: default_duration_questions(),
            keywords: default_keywords(),
            profile: default_profile(),
        }
    }
}

fn default_knowledge_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_questions() -> String {
    "questions.json".to_string()
}

fn default_duration_questions() -> String {
    "duration_questions.json".to_string()
}

fn default_keywords() -> String {
    "keywords.json".to_string()
}

fn default_profile() -> String {
    "profile.json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_question_log")]
    pub question_log: PathBuf,
    #[serde(default = "default_failure_log")]
    pub failure_log: PathBuf,
    #[serde(default = "default_success_log")]
    pub success_log: PathBuf,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            question_log: default_question_log(),
            failure_log: default_failure_log(),
            success_log: default_success_log(),
        }
    }
}

fn default_question_log() -> PathBuf {
    PathBuf::from("./logs/questions.json")
}

fn default_failure_log() -> PathBuf {
    PathBuf::from("./logs/failures.jsonl")
}

fn default_success_log() -> PathBuf {
    PathBuf::from("./logs/applied.jsonl")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryMode {
    #[default]
    AutoContinue,
    WaitForOperator,
    Abort,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryConfig {
    #[serde(default)]
    pub mode: RecoveryMode,
    /// Pause before continuing in `auto_continue` mode.
    #[serde(default = "default_recovery_delay_ms")]
    pub delay_ms: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            mode: RecoveryMode::default(),
            delay_ms: default_recovery_delay_ms(),
        }
    }
}

fn default_recovery_delay_ms() -> u64 {
    3000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    #[serde(default = "default_max_scrolls")]
    pub max_scrolls: usize,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    #[serde(default = "default_scroll_wait_ms")]
    pub scroll_wait_ms: u64,
    #[serde(default = "default_card_settle_ms")]
    pub card_settle_ms: u64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            max_scrolls: default_max_scrolls(),
            max_pages: default_max_pages(),
            scroll_wait_ms: default_scroll_wait_ms(),
            card_settle_ms: default_card_settle_ms(),
        }
    }
}

fn default_max_scrolls() -> usize {
    20
}

fn default_max_pages() -> usize {
    10
}

fn default_scroll_wait_ms() -> u64 {
    2000
}

fn default_card_settle_ms() -> u64 {
    2000
}

/// CSS selectors for the host site. Any subset may be overridden in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub text_input: String,
    pub dropdown: String,
    pub radio_fieldset: String,
    pub radio_legend: String,
    pub radio_input: String,
    pub custom_number: String,
    pub custom_select: String,
    /// Classes marking controls already covered by `text_input` / `dropdown`.
    pub standard_classes: Vec<String>,
    pub option: String,
    pub validation_error: String,
    pub follow_checkbox: String,
    pub next_button: String,
    pub review_button: String,
    pub submit_button: String,
    pub modal_dismiss: String,
    pub confirmation_dismiss: String,
    /// Buttons scanned by text for "Save" / "Discard" prompts.
    pub dialog_button: String,
    pub save_text: String,
    pub discard_text: String,
    pub active_job_card: String,
    pub job_id_attribute: String,
    pub job_list: String,
    pub job_list_item: String,
    pub job_card: String,
    pub easy_apply_button: String,
    pub easy_apply_text: String,
    pub next_page: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            text_input: "input.artdeco-text-input--input".into(),
            dropdown: "select.fb-dash-form-element__select-dropdown".into(),
            radio_fieldset: "fieldset[data-test-form-builder-radio-button-form-component=\"true\"]"
                .into(),
            radio_legend: "legend".into(),
            radio_input: "input[type=\"radio\"]".into(),
            custom_number: "input[type=\"number\"]".into(),
            custom_select: "select".into(),
            standard_classes: vec![
                "artdeco-text-input--input".into(),
                "fb-dash-form-element__select-dropdown".into(),
            ],
            option: "option".into(),
            validation_error: ".artdeco-inline-feedback--error".into(),
            follow_checkbox: "#follow-company-checkbox".into(),
            next_button: "button[data-easy-apply-next-button]".into(),
            review_button: "button[data-live-test-easy-apply-review-button]".into(),
            submit_button: "button[data-live-test-easy-apply-submit-button]".into(),
            modal_dismiss: "button.artdeco-modal__dismiss".into(),
            confirmation_dismiss: "button.artdeco-modal__dismiss".into(),
            dialog_button: "button".into(),
            save_text: "Save".into(),
            discard_text: "Discard".into(),
            active_job_card: ".jobs-search-results-list__list-item--active".into(),
            job_id_attribute: "data-job-id".into(),
            job_list: "ul:has(li[data-occludable-job-id])".into(),
            job_list_item: "li[data-occludable-job-id]".into(),
            job_card: "div.job-card-container--clickable".into(),
            easy_apply_button: "button.jobs-apply-button".into(),
            easy_apply_text: "Easy Apply".into(),
            next_page: "button[aria-label=\"Next\"]:not([disabled])".into(),
        }
    }
}

impl Selectors {
    /// Selector for the `<label>` pointing at the element with `id`.
    pub fn label_for(id: &str) -> String {
        format!("label[for=\"{}\"]", id.replace('"', "\\\""))
    }
}
