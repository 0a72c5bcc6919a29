//! Step-completion predicates over an observed editor view

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::pattern::{GuideStep, StepTarget};
use crate::utils::contains_ci;

/// A labelled text input or textarea
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputField {
    pub label: String,
    #[serde(default)]
    pub value: String,
}

/// A dropdown and its current choice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectField {
    pub label: String,
    #[serde(default)]
    pub value: String,
    /// Display text of the selected option
    #[serde(default)]
    pub text: String,
    /// Index 0 is the placeholder
    #[serde(default)]
    pub selected_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabState {
    pub text: String,
    #[serde(default)]
    pub selected: bool,
}

/// What the editor currently shows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorView {
    /// A node's settings panel is open
    #[serde(default)]
    pub settings_panel_open: bool,
    /// Code of the open node, if it has a code editor
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub inputs: Vec<InputField>,
    #[serde(default)]
    pub selects: Vec<SelectField>,
    #[serde(default)]
    pub tabs: Vec<TabState>,
    /// Texts of buttons activated since the step started
    #[serde(default)]
    pub activated: Vec<String>,
}

fn label_matches(label: &str, field_name: Option<&str>) -> bool {
    contains_ci(label, field_name.unwrap_or_default())
}

impl EditorView {
    fn input(&self, field_name: Option<&str>) -> Option<&InputField> {
        self.inputs.iter().find(|i| label_matches(&i.label, field_name))
    }

    fn select(&self, field_name: Option<&str>) -> Option<&SelectField> {
        self.selects.iter().find(|s| label_matches(&s.label, field_name))
    }

    fn tab_selected(&self, text: &str) -> bool {
        self.tabs.iter().find(|t| t.text.contains(text)).is_some_and(|t| t.selected)
    }
}

/// Whether `step` is visibly done in `view`.
///
/// User confirmations never complete here. Unknown targets are logged and
/// count as not completed.
pub fn is_step_completed(step: &GuideStep, view: &EditorView) -> bool {
    match &step.target {
        StepTarget::Node => view.settings_panel_open,
        StepTarget::Code => code_done(step, view),
        StepTarget::Input | StepTarget::Expression => input_done(step, view),
        StepTarget::Button => button_done(step, view),
        StepTarget::Tab => step.target_text.as_deref().is_some_and(|text| view.tab_selected(text)),
        StepTarget::Select => select_done(step, view),
        StepTarget::Form => form_done(step, view),
        StepTarget::UserConfirmation => false,
        StepTarget::Other(kind) => {
            warn!("Unknown guide step target '{}'", kind);
            false
        }
    }
}

fn code_done(step: &GuideStep, view: &EditorView) -> bool {
    if !view.settings_panel_open {
        return false;
    }
    let Some(code) = view.code.as_deref().filter(|c| !c.is_empty()) else {
        return false;
    };

    if let Some(search) = &step.search_text {
        return !code.contains(search.as_str());
    }
    match (&step.before, &step.after) {
        (Some(before), Some(after)) if after.is_empty() => !code.contains(before.as_str()),
        (Some(before), Some(after)) => !code.contains(before.as_str()) && code.contains(after.as_str()),
        _ => false,
    }
}

fn input_done(step: &GuideStep, view: &EditorView) -> bool {
    if !view.settings_panel_open {
        return false;
    }
    let Some(input) = view.input(step.field_name.as_deref()) else {
        return false;
    };
    match &step.value {
        Some(value) => input.value.contains(value.as_str()),
        None => !input.value.trim().is_empty(),
    }
}

fn button_done(step: &GuideStep, view: &EditorView) -> bool {
    let Some(text) = step.button_text.as_deref() else {
        return false;
    };
    view.tab_selected(text) || view.activated.iter().any(|a| a.contains(text))
}

fn select_done(step: &GuideStep, view: &EditorView) -> bool {
    if !view.settings_panel_open {
        return false;
    }
    let Some(select) = view.select(step.field_name.as_deref()) else {
        return false;
    };
    match &step.value {
        Some(value) => select.value == *value || select.text == *value,
        None => select.selected_index > 0,
    }
}

fn form_done(step: &GuideStep, view: &EditorView) -> bool {
    if step.fields.is_empty() || !view.settings_panel_open {
        return false;
    }
    step.fields.iter().all(|field| {
        view.input(Some(field.as_str()))
            .is_some_and(|i| !i.value.trim().is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_view() -> EditorView {
        EditorView {
            settings_panel_open: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_code_replace() {
        let mut step = GuideStep::new("replace", StepTarget::Code);
        step.before = Some("return items[0]".to_string());
        step.after = Some("return $input.all()".to_string());

        let mut view = open_view();
        view.code = Some("return items[0];".to_string());
        assert!(!is_step_completed(&step, &view));
        view.code = Some("return $input.all();".to_string());
        assert!(is_step_completed(&step, &view));
        view.settings_panel_open = false;
        assert!(!is_step_completed(&step, &view));
    }

    #[test]
    fn test_code_removal_with_empty_after() {
        let mut step = GuideStep::new("remove", StepTarget::Code);
        step.before = Some(".filter(".to_string());
        step.after = Some(String::new());

        let mut view = open_view();
        view.code = Some("return $input.all().filter(x => x);".to_string());
        assert!(!is_step_completed(&step, &view));
        view.code = Some("return $input.all();".to_string());
        assert!(is_step_completed(&step, &view));
    }

    #[test]
    fn test_select_and_form() {
        let mut select = GuideStep::new("mode", StepTarget::Select);
        select.field_name = Some("mode".to_string());
        select.value = Some("runOnceForEachItem".to_string());

        let mut form = GuideStep::new("form", StepTarget::Form);
        form.fields = vec!["clientId".to_string(), "clientSecret".to_string()];

        let mut view = open_view();
        view.selects.push(SelectField {
            label: "Mode".to_string(),
            value: "runOnceForEachItem".to_string(),
            text: "Run Once for Each Item".to_string(),
            selected_index: 1,
        });
        view.inputs.push(InputField {
            label: "Client ID".to_string(),
            value: "abc".to_string(),
        });
        assert!(is_step_completed(&select, &view));
        assert!(!is_step_completed(&form, &view));

        view.inputs[0].label = "clientId".to_string();
        view.inputs.push(InputField {
            label: "clientSecret".to_string(),
            value: " ".to_string(),
        });
        assert!(!is_step_completed(&form, &view));
        view.inputs[1].value = "s3cr3t".to_string();
        assert!(is_step_completed(&form, &view));
    }

    #[test]
    fn test_tab_button_and_confirmation() {
        let mut tab = GuideStep::new("tab", StepTarget::Tab);
        tab.target_text = Some("Settings".to_string());
        let mut button = GuideStep::new("button", StepTarget::Button);
        button.button_text = Some("Connect".to_string());
        let confirm = GuideStep::new("confirm", StepTarget::UserConfirmation);
        let unknown = GuideStep::new("add node", StepTarget::Other("workflow".to_string()));

        let mut view = open_view();
        view.tabs.push(TabState {
            text: "Settings".to_string(),
            selected: true,
        });
        view.activated.push("Connect my account".to_string());

        assert!(is_step_completed(&tab, &view));
        assert!(is_step_completed(&button, &view));
        assert!(!is_step_completed(&confirm, &view));
        assert!(!is_step_completed(&unknown, &view));
    }

    #[test]
    fn test_tab_without_text_never_completes() {
        let tab = GuideStep::new("tab", StepTarget::Tab);
        let mut view = open_view();
        view.tabs.push(TabState {
            text: "Parameters".to_string(),
            selected: true,
        });
        assert!(!is_step_completed(&tab, &view));
    }
}
