use dioxus::prelude::*;

use services::FieldView;
use survey_core::counter::CharCounter;
use survey_core::model::FieldKind;

use crate::vm::WizardIntent;

#[component]
pub(super) fn QuestionField(field: FieldView, on_intent: EventHandler<WizardIntent>) -> Element {
    if !field.visible {
        return rsx! {};
    }

    let class = if field.flagged {
        "question question--error"
    } else {
        "question"
    };
    let key = field.key.clone();
    let control = match field.kind.clone() {
        FieldKind::SingleChoice { options } => {
            let choices: Vec<(String, bool)> = options
                .into_iter()
                .map(|option| {
                    let checked = field.is_selected(&option);
                    (option, checked)
                })
                .collect();
            rsx! {
                div { class: "choices", role: "radiogroup",
                    for (option, checked) in choices {
                        ChoiceOption {
                            key: "{option}",
                            name: field.key.clone(),
                            option: option.clone(),
                            checked,
                            on_intent,
                        }
                    }
                }
            }
        }
        FieldKind::Select { options } => rsx! {
            select {
                class: "select",
                id: "field-{field.key}",
                onchange: move |evt: FormEvent| {
                    on_intent.call(WizardIntent::Change {
                        key: key.clone(),
                        value: evt.value(),
                    });
                },
                option { value: "", disabled: true, selected: field.value.is_empty(), "選択してください" }
                for option in options {
                    option {
                        value: "{option}",
                        selected: field.value == option,
                        "{option}"
                    }
                }
            }
        },
        FieldKind::FreeText { max_length, .. } => rsx! {
            textarea {
                class: "textarea",
                id: "field-{field.key}",
                rows: "4",
                maxlength: "{max_length}",
                value: "{field.value}",
                oninput: move |evt: FormEvent| {
                    on_intent.call(WizardIntent::Change {
                        key: key.clone(),
                        value: evt.value(),
                    });
                },
            }
            if let Some(counter) = field.counter {
                CounterLine { counter }
            }
        },
    };

    rsx! {
        div { class, id: "question-{field.key}",
            p { class: "question__label",
                "{field.label}"
                if field.required {
                    span { class: "required", " *" }
                }
            }
            {control}
        }
    }
}

#[component]
fn ChoiceOption(
    name: String,
    option: String,
    checked: bool,
    on_intent: EventHandler<WizardIntent>,
) -> Element {
    let value = option.clone();
    let key = name.clone();
    let class = if checked {
        "choice choice--checked"
    } else {
        "choice"
    };
    rsx! {
        label { class,
            input {
                r#type: "radio",
                name: "{name}",
                value: "{option}",
                checked,
                onchange: move |_| {
                    on_intent.call(WizardIntent::Change {
                        key: key.clone(),
                        value: value.clone(),
                    });
                },
            }
            span { "{option}" }
        }
    }
}

#[component]
fn CounterLine(counter: CharCounter) -> Element {
    let class = format!("char-counter {}", counter.status.css_class());
    rsx! {
        p { class: "{class.trim_end()}",
            "{counter.current}/{counter.max_length}文字"
            if counter.min_length > 0 {
                span { class: "char-counter__min", "（{counter.min_length}文字以上）" }
            }
        }
    }
}
