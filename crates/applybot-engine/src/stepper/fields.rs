//! Discovery of the fillable controls on the current modal step.
//!
//! Every call reads the live DOM; nothing discovered here outlives the step it came from.

use crate::config::schema::Selectors;
use crate::driver::{DriverError, PageDriver, PageExt};
use crate::knowledge::FieldOption;
use crate::knowledge::options::is_unselected;
use crate::logs::AnswerType;
use crate::normalizer::Label;
use applybot_common::protocol::ElementRef;
use tracing::{debug, warn};

/// What the DOM submits for a checked radio with no `value` attribute.
const DEFAULT_RADIO_VALUE: &str = "on";

/// One radio button of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Radio {
    pub handle: ElementRef,
    /// The `<label for=...>` of the radio; clicking it is more reliable than the input.
    pub label_handle: Option<ElementRef>,
    pub option: FieldOption,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Dropdown { options: Vec<FieldOption> },
    RadioGroup { radios: Vec<Radio> },
}

/// Where a control was found. Custom questions sit outside the standard form-builder classes
/// and consult the duration table first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOrigin {
    Standard,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// The input, select or fieldset.
    pub handle: ElementRef,
    pub label: Label,
    pub value: String,
    pub kind: FieldKind,
    pub origin: FieldOrigin,
}

impl Field {
    /// A field that already carries an answer is never overwritten.
    pub fn is_prefilled(&self) -> bool {
        match &self.kind {
            FieldKind::Text | FieldKind::Number => !self.value.trim().is_empty(),
            FieldKind::Dropdown { .. } => !is_unselected(&self.value),
            FieldKind::RadioGroup { radios } => radios.iter().any(|r| r.checked),
        }
    }

    pub fn answer_type(&self) -> AnswerType {
        match self.kind {
            FieldKind::Text => AnswerType::Text,
            FieldKind::Number => AnswerType::Number,
            FieldKind::Dropdown { .. } | FieldKind::RadioGroup { .. } => AnswerType::Dropdown,
        }
    }

    /// Choices offered by dropdowns and radio groups.
    pub fn options(&self) -> Option<Vec<FieldOption>> {
        match &self.kind {
            FieldKind::Dropdown { options } => Some(options.clone()),
            FieldKind::RadioGroup { radios } => {
                Some(radios.iter().map(|r| r.option.clone()).collect())
            }
            FieldKind::Text | FieldKind::Number => None,
        }
    }
}

/// Enumerate every control on the current step: text inputs, dropdowns, radio groups, then
/// custom questions. Controls that cannot be read are skipped with a warning.
pub async fn discover<D: PageDriver + ?Sized>(
    driver: &mut D,
    selectors: &Selectors,
) -> Result<Vec<Field>, DriverError> {
    let mut fields = Vec::new();

    for handle in driver.find_all(&selectors.text_input).await? {
        push_or_warn(&mut fields, read_input(driver, handle, FieldOrigin::Standard).await);
    }

    for handle in driver.find_all(&selectors.dropdown).await? {
        push_or_warn(&mut fields, read_dropdown(driver, selectors, handle, FieldOrigin::Standard).await);
    }

    for handle in driver.find_all(&selectors.radio_fieldset).await? {
        push_or_warn(&mut fields, read_radio_group(driver, selectors, handle).await);
    }

    for handle in driver.find_all(&selectors.custom_number).await? {
        if is_standard(driver, selectors, handle).await? {
            continue;
        }
        push_or_warn(&mut fields, read_input(driver, handle, FieldOrigin::Custom).await);
    }

    for handle in driver.find_all(&selectors.custom_select).await? {
        if is_standard(driver, selectors, handle).await? {
            continue;
        }
        push_or_warn(&mut fields, read_dropdown(driver, selectors, handle, FieldOrigin::Custom).await);
    }

    debug!("Discovered {} fields", fields.len());
    Ok(fields)
}

fn push_or_warn(fields: &mut Vec<Field>, field: Result<Field, DriverError>) {
    match field {
        Ok(field) => fields.push(field),
        Err(e) => warn!("Skipping unreadable control: {}", e),
    }
}

async fn is_standard<D: PageDriver + ?Sized>(
    driver: &mut D,
    selectors: &Selectors,
    handle: ElementRef,
) -> Result<bool, DriverError> {
    let class = driver.attribute(handle, "class").await?.unwrap_or_default();
    Ok(class
        .split_whitespace()
        .any(|c| selectors.standard_classes.iter().any(|s| s == c)))
}

async fn read_input<D: PageDriver + ?Sized>(
    driver: &mut D,
    handle: ElementRef,
    origin: FieldOrigin,
) -> Result<Field, DriverError> {
    let input_type = driver.attribute(handle, "type").await?.unwrap_or_default();
    let kind = if input_type.eq_ignore_ascii_case("number") || origin == FieldOrigin::Custom {
        FieldKind::Number
    } else {
        FieldKind::Text
    };
    Ok(Field {
        handle,
        label: caption(driver, handle).await?,
        value: driver.value(handle).await?,
        kind,
        origin,
    })
}

async fn read_dropdown<D: PageDriver + ?Sized>(
    driver: &mut D,
    selectors: &Selectors,
    handle: ElementRef,
    origin: FieldOrigin,
) -> Result<Field, DriverError> {
    let mut options = Vec::new();
    for option in driver.find_within(handle, &selectors.option).await? {
        let text = driver.text(option).await?.trim().to_string();
        let value = driver
            .attribute(option, "value")
            .await?
            .unwrap_or_else(|| text.clone());
        options.push(FieldOption { text, value });
    }
    Ok(Field {
        handle,
        label: caption(driver, handle).await?,
        value: driver.value(handle).await?,
        kind: FieldKind::Dropdown { options },
        origin,
    })
}

async fn read_radio_group<D: PageDriver + ?Sized>(
    driver: &mut D,
    selectors: &Selectors,
    fieldset: ElementRef,
) -> Result<Field, DriverError> {
    let label = match driver
        .find_within(fieldset, &selectors.radio_legend)
        .await?
        .first()
    {
        Some(legend) => Label::normalize(&driver.text(*legend).await?),
        None => Label::default(),
    };

    let mut radios = Vec::new();
    for handle in driver.find_within(fieldset, &selectors.radio_input).await? {
        let value = driver.attribute(handle, "value").await?;
        let label_handle = match driver.attribute(handle, "id").await? {
            Some(id) if !id.is_empty() => driver.find(&Selectors::label_for(&id)).await?,
            _ => None,
        };
        let text = match label_handle {
            Some(l) => Some(Label::normalize(&driver.text(l).await?).to_string()),
            None => None,
        };
        radios.push(Radio {
            handle,
            label_handle,
            option: radio_option(text, value),
            checked: driver.is_checked(handle).await?,
        });
    }

    let value = radios
        .iter()
        .find(|r| r.checked)
        .map(|r| r.option.value.clone())
        .unwrap_or_default();
    Ok(Field {
        handle: fieldset,
        label,
        value,
        kind: FieldKind::RadioGroup { radios },
        origin: FieldOrigin::Standard,
    })
}

/// Choice offered by one radio. A radio without a `value` attribute submits `on`, so the
/// caption stands in for it when there is one.
fn radio_option(text: Option<String>, value: Option<String>) -> FieldOption {
    let text = text.filter(|t| !t.is_empty());
    let value = value.filter(|v| !v.is_empty());
    match (text, value) {
        (Some(text), Some(value)) => FieldOption { text, value },
        (Some(text), None) => FieldOption {
            value: text.clone(),
            text,
        },
        (None, Some(value)) => FieldOption {
            text: value.clone(),
            value,
        },
        (None, None) => FieldOption::new(DEFAULT_RADIO_VALUE, DEFAULT_RADIO_VALUE),
    }
}

/// Caption of a control: its `<label for=...>`, else its `aria-label`.
async fn caption<D: PageDriver + ?Sized>(
    driver: &mut D,
    handle: ElementRef,
) -> Result<Label, DriverError> {
    if let Some(id) = driver.attribute(handle, "id").await? {
        if !id.is_empty() {
            if let Some(label) = driver.find(&Selectors::label_for(&id)).await? {
                return Ok(Label::normalize(&driver.text(label).await?));
            }
        }
    }
    let aria = driver.attribute(handle, "aria-label").await?.unwrap_or_default();
    Ok(Label::normalize(&aria))
}
