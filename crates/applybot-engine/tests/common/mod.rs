#![allow(dead_code)]

use applybot_engine::PageDriver;
use applybot_engine::config::ApplyConfig;
use applybot_engine::config::schema::{RecoveryMode, Selectors};
use applybot_engine::driver::NavigationResult;
use applybot_engine::failure::{FailureHandler, recovery};
use applybot_engine::knowledge::{KnowledgeBase, KnowledgeResolver};
use applybot_engine::logs::QuestionLogger;
use applybot_engine::protocol::{DriverCommand, DriverData, ElementRef};
use applybot_engine::stepper::FormStepper;
use applybot_engine::DriverError;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::Path;
use std::time::Duration;

/// What clicking an element does to the fake page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Click {
    Nothing,
    /// Render the next step (or stay on the last one).
    NextStep,
    GoTo(usize),
    Check(u32),
    Toggle(u32),
    /// The click is intercepted.
    Fail,
}

#[derive(Debug, Clone)]
struct FakeElement {
    /// `None` renders on every step.
    step: Option<usize>,
    hidden: bool,
    matches: Vec<String>,
    attrs: HashMap<String, String>,
    text: String,
    value: String,
    checked: bool,
    children: Vec<u32>,
    on_click: Click,
}

/// In-memory page: a list of rendered steps whose elements are addressed by the exact selector
/// strings the engine asks for. Handles from steps no longer rendered come back stale.
#[derive(Debug)]
pub struct FakePage {
    pub selectors: Selectors,
    elements: BTreeMap<u32, FakeElement>,
    next_id: u32,
    steps: usize,
    pub current: usize,
    pub url: String,
    reveal_on_scroll: VecDeque<Vec<u32>>,
    pub clicks: Vec<u32>,
    pub fills: Vec<(u32, String)>,
    pub selections: Vec<(u32, String)>,
    pub scrolls: usize,
    pub waited: Duration,
}

impl FakePage {
    pub fn new(url: &str) -> Self {
        Self {
            selectors: Selectors::default(),
            elements: BTreeMap::new(),
            next_id: 1,
            steps: 1,
            current: 0,
            url: url.to_string(),
            reveal_on_scroll: VecDeque::new(),
            clicks: Vec::new(),
            fills: Vec::new(),
            selections: Vec::new(),
            scrolls: 0,
            waited: Duration::ZERO,
        }
    }

    pub fn add(
        &mut self,
        step: Option<usize>,
        matches: &[&str],
        attrs: &[(&str, &str)],
        text: &str,
    ) -> u32 {
        if let Some(step) = step {
            self.steps = self.steps.max(step + 1);
        }
        let id = self.next_id;
        self.next_id += 1;
        self.elements.insert(
            id,
            FakeElement {
                step,
                hidden: false,
                matches: matches.iter().map(|m| m.to_string()).collect(),
                attrs: attrs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                text: text.to_string(),
                value: String::new(),
                checked: false,
                children: Vec::new(),
                on_click: Click::Nothing,
            },
        );
        id
    }

    fn element(&mut self, id: u32) -> &mut FakeElement {
        self.elements.get_mut(&id).expect("unknown fake element")
    }

    pub fn set_value(&mut self, id: u32, value: &str) {
        self.element(id).value = value.to_string();
    }

    pub fn set_checked(&mut self, id: u32, checked: bool) {
        self.element(id).checked = checked;
    }

    pub fn remove_attribute(&mut self, id: u32, name: &str) {
        self.element(id).attrs.remove(name);
    }

    pub fn on_click(&mut self, id: u32, click: Click) {
        self.element(id).on_click = click;
    }

    pub fn child(&mut self, parent: u32, matches: &[&str], attrs: &[(&str, &str)], text: &str) -> u32 {
        let step = self.element(parent).step;
        let id = self.add(step, matches, attrs, text);
        self.element(parent).children.push(id);
        id
    }

    pub fn label(&mut self, step: usize, for_id: &str, text: &str) -> u32 {
        self.add(Some(step), &[Selectors::label_for(for_id).as_str()], &[("for", for_id)], text)
    }

    pub fn text_input(&mut self, step: usize, html_id: &str, label: &str) -> u32 {
        let selector = self.selectors.text_input.clone();
        let id = self.add(
            Some(step),
            &[selector.as_str()],
            &[
                ("id", html_id),
                ("class", "artdeco-text-input--input"),
                ("type", "text"),
            ],
            "",
        );
        self.label(step, html_id, label);
        id
    }

    /// A numeric question outside the standard form-builder classes.
    pub fn custom_number(&mut self, step: usize, html_id: &str, label: &str) -> u32 {
        let selector = self.selectors.custom_number.clone();
        let id = self.add(
            Some(step),
            &[selector.as_str()],
            &[("id", html_id), ("class", "custom-question"), ("type", "number")],
            "",
        );
        self.label(step, html_id, label);
        id
    }

    pub fn dropdown(&mut self, step: usize, html_id: &str, label: &str, options: &[(&str, &str)]) -> u32 {
        let selectors = [
            self.selectors.dropdown.clone(),
            self.selectors.custom_select.clone(),
        ];
        let id = self.add(
            Some(step),
            &[selectors[0].as_str(), selectors[1].as_str()],
            &[("id", html_id), ("class", "fb-dash-form-element__select-dropdown")],
            "",
        );
        self.options(id, options);
        self.label(step, html_id, label);
        id
    }

    pub fn custom_select(&mut self, step: usize, html_id: &str, label: &str, options: &[(&str, &str)]) -> u32 {
        let selector = self.selectors.custom_select.clone();
        let id = self.add(
            Some(step),
            &[selector.as_str()],
            &[("id", html_id), ("class", "custom-question")],
            "",
        );
        self.options(id, options);
        self.label(step, html_id, label);
        id
    }

    fn options(&mut self, select: u32, options: &[(&str, &str)]) {
        let selector = self.selectors.option.clone();
        for (text, value) in options {
            self.child(select, &[selector.as_str()], &[("value", *value)], text);
        }
        if let Some((_, first)) = options.first() {
            self.set_value(select, first);
        }
    }

    /// Returns the fieldset and its radio inputs.
    pub fn radio_group(&mut self, step: usize, name: &str, legend: &str, options: &[(&str, &str)]) -> (u32, Vec<u32>) {
        let fieldset_selector = self.selectors.radio_fieldset.clone();
        let legend_selector = self.selectors.radio_legend.clone();
        let radio_selector = self.selectors.radio_input.clone();
        let fieldset = self.add(Some(step), &[fieldset_selector.as_str()], &[], "");
        self.child(fieldset, &[legend_selector.as_str()], &[], legend);

        let mut radios = Vec::new();
        for (i, (text, value)) in options.iter().enumerate() {
            let html_id = format!("{}-{}", name, i);
            let radio = self.child(
                fieldset,
                &[radio_selector.as_str()],
                &[("id", html_id.as_str()), ("value", *value)],
                "",
            );
            let label = self.label(step, &html_id, text);
            self.on_click(label, Click::Check(radio));
            radios.push(radio);
        }
        (fieldset, radios)
    }

    pub fn button(&mut self, step: usize, selector: &str, text: &str, click: Click) -> u32 {
        let id = self.add(Some(step), &[selector], &[], text);
        self.on_click(id, click);
        id
    }

    pub fn next_button(&mut self, step: usize) -> u32 {
        let selector = self.selectors.next_button.clone();
        self.button(step, &selector, "Next", Click::NextStep)
    }

    pub fn review_button(&mut self, step: usize) -> u32 {
        let selector = self.selectors.review_button.clone();
        self.button(step, &selector, "Review", Click::NextStep)
    }

    pub fn submit_button(&mut self, step: usize) -> u32 {
        let selector = self.selectors.submit_button.clone();
        self.button(step, &selector, "Submit application", Click::NextStep)
    }

    pub fn dismiss_button(&mut self, step: usize, click: Click) -> u32 {
        let selector = self.selectors.modal_dismiss.clone();
        self.button(step, &selector, "Dismiss", click)
    }

    pub fn dialog_button(&mut self, step: usize, text: &str, click: Click) -> u32 {
        let selector = self.selectors.dialog_button.clone();
        self.button(step, &selector, text, click)
    }

    pub fn validation_error(&mut self, step: usize, text: &str) -> u32 {
        let selector = self.selectors.validation_error.clone();
        self.add(Some(step), &[selector.as_str()], &[], text)
    }

    /// Checked follow-company checkbox whose label toggles it.
    pub fn follow_checkbox(&mut self, step: usize) -> u32 {
        let selector = self.selectors.follow_checkbox.clone();
        let checkbox = self.add(
            Some(step),
            &[selector.as_str()],
            &[("id", "follow-company-checkbox"), ("type", "checkbox")],
            "",
        );
        self.set_checked(checkbox, true);
        let label = self.label(step, "follow-company-checkbox", "Follow company");
        self.on_click(label, Click::Toggle(checkbox));
        checkbox
    }

    /// The highlighted job card, present on every step.
    pub fn active_job(&mut self, job_id: &str) -> u32 {
        let selector = self.selectors.active_job_card.clone();
        let attribute = self.selectors.job_id_attribute.clone();
        self.add(None, &[selector.as_str()], &[(attribute.as_str(), job_id)], "")
    }

    /// Hide `ids` until the next scroll.
    pub fn reveal_after_scroll(&mut self, ids: Vec<u32>) {
        for id in &ids {
            self.element(*id).hidden = true;
        }
        self.reveal_on_scroll.push_back(ids);
    }

    /// A job card in the result list, rendered on every step. Returns the list item and the
    /// clickable card.
    pub fn job_card(&mut self, click: Click) -> (u32, u32) {
        let item_selector = self.selectors.job_list_item.clone();
        let card_selector = self.selectors.job_card.clone();
        let item = self.add(None, &[item_selector.as_str()], &[], "");
        let card = self.add(None, &[card_selector.as_str()], &[], "Software Engineer");
        self.on_click(card, click);
        (item, card)
    }

    pub fn job_list(&mut self) -> u32 {
        let selector = self.selectors.job_list.clone();
        self.add(None, &[selector.as_str()], &[], "")
    }

    pub fn easy_apply_button(&mut self, step: usize, click: Click) -> u32 {
        let selector = self.selectors.easy_apply_button.clone();
        self.button(step, &selector, "Easy Apply", click)
    }

    pub fn value_of(&self, id: u32) -> &str {
        &self.elements[&id].value
    }

    pub fn is_checked(&self, id: u32) -> bool {
        self.elements[&id].checked
    }

    pub fn filled(&self, id: u32) -> Option<&str> {
        self.fills
            .iter()
            .rev()
            .find(|(fid, _)| *fid == id)
            .map(|(_, v)| v.as_str())
    }

    pub fn clicked(&self, id: u32) -> bool {
        self.clicks.contains(&id)
    }

    fn rendered(&self, element: &FakeElement) -> bool {
        !element.hidden && element.step.is_none_or(|s| s == self.current)
    }

    fn live(&self, id: ElementRef) -> Result<&FakeElement, DriverError> {
        let element = self
            .elements
            .get(&id.0)
            .ok_or(DriverError::ElementNotFound { id: id.0 })?;
        if self.rendered(element) {
            Ok(element)
        } else {
            Err(DriverError::ElementStale { id: id.0 })
        }
    }

    fn live_mut(&mut self, id: ElementRef) -> Result<&mut FakeElement, DriverError> {
        self.live(id)?;
        Ok(self.element(id.0))
    }

    fn handles<'a>(&self, ids: impl Iterator<Item = &'a u32>, selector: &str) -> DriverData {
        DriverData::Handles {
            handles: ids
                .filter(|id| {
                    let element = &self.elements[id];
                    self.rendered(element) && element.matches.iter().any(|m| m == selector)
                })
                .map(|id| ElementRef(*id))
                .collect(),
        }
    }

    fn click(&mut self, id: ElementRef) -> Result<(), DriverError> {
        let effect = self.live(id)?.on_click;
        if effect == Click::Fail {
            return Err(DriverError::ElementNotInteractable {
                id: id.0,
                reason: "covered by another element".into(),
            });
        }
        self.clicks.push(id.0);
        match effect {
            Click::Nothing | Click::Fail => {}
            Click::NextStep => self.current = (self.current + 1).min(self.steps - 1),
            Click::GoTo(step) => self.current = step,
            Click::Check(target) => self.element(target).checked = true,
            Click::Toggle(target) => {
                let element = self.element(target);
                element.checked = !element.checked;
            }
        }
        Ok(())
    }
}

fn text(value: impl Into<String>) -> DriverData {
    DriverData::Text {
        value: Some(value.into()),
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn launch(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        true
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, DriverError> {
        self.url = url.to_string();
        Ok(NavigationResult {
            url: url.to_string(),
            title: String::new(),
        })
    }

    async fn current_url(&mut self) -> Result<String, DriverError> {
        Ok(self.url.clone())
    }

    async fn execute(&mut self, command: DriverCommand) -> Result<DriverData, DriverError> {
        match command {
            DriverCommand::Find { selector } => Ok(self.handles(self.elements.keys(), &selector)),
            DriverCommand::FindWithin { parent, selector } => {
                let children = self.live(parent)?.children.clone();
                Ok(self.handles(children.iter(), &selector))
            }
            DriverCommand::Attribute { id, name } => Ok(DriverData::Text {
                value: self.live(id)?.attrs.get(&name).cloned(),
            }),
            DriverCommand::Text { id } => Ok(text(self.live(id)?.text.clone())),
            DriverCommand::Value { id } => Ok(text(self.live(id)?.value.clone())),
            DriverCommand::Checked { id } => Ok(DriverData::Flag {
                value: self.live(id)?.checked,
            }),
            DriverCommand::Fill { id, value } => {
                self.live_mut(id)?.value = value.clone();
                self.fills.push((id.0, value));
                Ok(DriverData::Done)
            }
            DriverCommand::Click { id } => {
                self.click(id)?;
                Ok(DriverData::Done)
            }
            DriverCommand::Select { id, value } => {
                let children = self.live(id)?.children.clone();
                let known = children.iter().any(|child| {
                    let option = &self.elements[child];
                    option.attrs.get("value") == Some(&value) || option.text == value
                });
                if !known {
                    return Err(DriverError::OptionNotFound { value });
                }
                self.live_mut(id)?.value = value.clone();
                self.selections.push((id.0, value));
                Ok(DriverData::Done)
            }
            DriverCommand::ScrollToBottom { id } => {
                self.live(id)?;
                self.scrolls += 1;
                if let Some(ids) = self.reveal_on_scroll.pop_front() {
                    for id in ids {
                        self.element(id).hidden = false;
                    }
                }
                Ok(DriverData::Done)
            }
        }
    }

    async fn wait(&mut self, duration: Duration) {
        self.waited += duration;
    }
}

/// Zero-delay configuration whose logs live under `dir`.
pub fn config(dir: &Path) -> ApplyConfig {
    let mut config = ApplyConfig::without_delays();
    config.logs.question_log = dir.join("questions.json");
    config.logs.failure_log = dir.join("failures.jsonl");
    config.logs.success_log = dir.join("applied.jsonl");
    config
}

pub fn stepper(config: &ApplyConfig, kb: KnowledgeBase) -> FormStepper {
    let failures = FailureHandler::new(
        config.logs.failure_log.clone(),
        config.selectors.clone(),
        recovery::from_config(&config.recovery),
        config.stepper.settle(),
    );
    FormStepper::new(
        config,
        KnowledgeResolver::new(kb),
        QuestionLogger::new(config.logs.question_log.clone()),
        failures,
    )
}

pub fn stepper_with_mode(config: &mut ApplyConfig, kb: KnowledgeBase, mode: RecoveryMode) -> FormStepper {
    config.recovery.mode = mode;
    stepper(config, kb)
}
