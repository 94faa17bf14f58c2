use std::sync::Arc;
use std::time::Duration;

use dioxus::document::eval;
use dioxus::prelude::*;

use services::wizard::{
    BANNER_DURATION_MS, CONFIRM_SUBMIT_PROMPT, HIGHLIGHT_DURATION_MS, LEAVE_WARNING,
};
use services::{PageView, SubmitControl, WizardLoopService};
use survey_core::progress::{NavButtons, Progress};

use super::fields::QuestionField;
use super::scripts::scroll_to_top_script;
use super::window::{close_window, keep_window_open, use_close_requests};
use crate::context::AppContext;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{StepOutcome, WizardIntent, WizardVm, start_wizard};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

/// Everything the page renders, read out of the vm in one borrow.
#[derive(Clone, Debug, PartialEq)]
struct Screen {
    page: PageView,
    progress: Progress,
    nav: NavButtons,
    submit: SubmitControl,
    banner: Option<&'static str>,
    submit_error: Option<&'static str>,
    confirming: bool,
    leave_pending: bool,
    completion: Option<Option<String>>,
    last_saved: Option<String>,
}

impl Screen {
    fn read(vm: &WizardVm) -> Self {
        Self {
            page: vm.page(),
            progress: vm.progress(),
            nav: vm.nav(),
            submit: vm.submit_control(),
            banner: vm.banner(),
            submit_error: vm.submit_error(),
            confirming: vm.is_confirming(),
            leave_pending: vm.is_leave_pending(),
            completion: vm.completion().map(|id| id.map(str::to_owned)),
            last_saved: vm.last_saved_label(),
        }
    }
}

fn feedback_waits() -> [Duration; 2] {
    [
        Duration::from_millis(HIGHLIGHT_DURATION_MS.unsigned_abs()),
        Duration::from_millis((BANNER_DURATION_MS - HIGHLIGHT_DURATION_MS).unsigned_abs()),
    ]
}

/// Clear highlights, then the banner, once their display time is over.
fn schedule_feedback_expiry(wizard: Arc<WizardLoopService>, vm: Signal<Option<WizardVm>>) {
    let mut vm = vm;
    spawn(async move {
        for wait in feedback_waits() {
            tokio::time::sleep(wait).await;
            if let Some(vm) = vm.write().as_mut() {
                vm.expire_feedback(&wizard);
            }
        }
    });
}

fn follow_up(
    outcome: Option<Result<StepOutcome, ViewError>>,
    wizard: Arc<WizardLoopService>,
    vm: Signal<Option<WizardVm>>,
    error: Signal<Option<ViewError>>,
) {
    let mut error = error;
    match outcome {
        Some(Ok(StepOutcome::Moved(pending))) => {
            error.set(None);
            let _ = eval(scroll_to_top_script());
            spawn(async move {
                wizard.persist(pending).await;
            });
        }
        Some(Ok(StepOutcome::Blocked)) => schedule_feedback_expiry(wizard, vm),
        Some(Ok(StepOutcome::Unchanged)) => {}
        Some(Err(err)) => error.set(Some(err)),
        None => error.set(Some(ViewError::Unknown)),
    }
}

#[component]
pub fn SurveyView() -> Element {
    let ctx = use_context::<AppContext>();
    let wizard = ctx.wizard();

    let error = use_signal(|| None::<ViewError>);
    let vm = use_signal(|| None::<WizardVm>);

    let wizard_for_resource = wizard.clone();
    let resource = use_resource(move || {
        let wizard = wizard_for_resource.clone();
        let mut vm = vm;

        async move {
            let started = start_wizard(&wizard).await;
            vm.set(Some(started));
            Ok::<_, ViewError>(())
        }
    });
    let state = view_state_from_resource(&resource);

    let dispatch_intent = {
        let wizard = wizard.clone();
        use_callback(move |intent: WizardIntent| {
            let wizard = wizard.clone();
            let mut vm = vm;
            let mut error = error;

            match intent {
                WizardIntent::Change { key, value } => {
                    let changed = vm
                        .write()
                        .as_mut()
                        .map(|vm| vm.change(&wizard, &key, value));
                    match changed {
                        Some(Ok(pending)) => {
                            spawn(async move {
                                wizard.persist(pending).await;
                            });
                        }
                        Some(Err(err)) => error.set(Some(err)),
                        None => error.set(Some(ViewError::Unknown)),
                    }
                }
                WizardIntent::Next { from } => {
                    let outcome = vm.write().as_mut().map(|vm| vm.next(&wizard, from));
                    follow_up(outcome, wizard, vm, error);
                }
                WizardIntent::Prev { from } => {
                    let outcome = vm.write().as_mut().map(|vm| Ok(vm.prev(&wizard, from)));
                    follow_up(outcome, wizard, vm, error);
                }
                WizardIntent::RequestSubmit => {
                    let outcome = vm.write().as_mut().map(|vm| vm.request_submit(&wizard));
                    follow_up(outcome, wizard, vm, error);
                }
                WizardIntent::CancelSubmit => {
                    if let Some(vm) = vm.write().as_mut() {
                        vm.cancel_submit();
                    }
                }
                WizardIntent::ConfirmSubmit => {
                    let prepared = vm
                        .write()
                        .as_mut()
                        .map(|vm| vm.prepare_submission(&wizard));
                    match prepared {
                        Some(Ok(payload)) => {
                            spawn(async move {
                                let outcome = wizard.send_submission(&payload).await;
                                if let Some(vm) = vm.write().as_mut() {
                                    vm.settle_submission(&wizard, outcome);
                                }
                            });
                        }
                        Some(Err(err)) => error.set(Some(err)),
                        None => error.set(Some(ViewError::Unknown)),
                    }
                }
                WizardIntent::DismissCompletion => {
                    if let Some(vm) = vm.write().as_mut() {
                        vm.dismiss_completion();
                    }
                    let _ = eval(scroll_to_top_script());
                }
                WizardIntent::DismissError => {
                    error.set(None);
                    if let Some(vm) = vm.write().as_mut() {
                        vm.dismiss_error();
                    }
                }
                WizardIntent::CloseRequested => {
                    let may_close = vm.write().as_mut().is_none_or(WizardVm::request_leave);
                    if may_close {
                        close_window();
                    } else {
                        keep_window_open();
                    }
                }
                WizardIntent::StayInSurvey => {
                    if let Some(vm) = vm.write().as_mut() {
                        vm.cancel_leave();
                    }
                }
                WizardIntent::LeaveSurvey => {
                    if let Some(vm) = vm.write().as_mut() {
                        vm.cancel_leave();
                    }
                    close_window();
                }
            }
        })
    };
    use_close_requests(dispatch_intent);

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<SurveyTestHandles>() {
                handles.register(dispatch_intent, vm);
            }
        }
    }

    let screen = vm.read().as_ref().map(Screen::read);

    rsx! {
        div { class: "page survey-page", id: "survey-root",
            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "読み込み中..." }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| {
                            let mut resource = resource;
                            resource.restart();
                        },
                        "再試行"
                    }
                },
                ViewState::Ready(()) => match screen {
                    Some(screen) => rsx! {
                        SurveyScreen { screen, view_error: *error.read(), on_intent: dispatch_intent }
                    },
                    None => rsx! {
                        p { "{ViewError::Unknown.message()}" }
                    },
                },
            }
        }
    }
}

#[component]
fn SurveyScreen(
    screen: Screen,
    view_error: Option<ViewError>,
    on_intent: EventHandler<WizardIntent>,
) -> Element {
    let number = screen.page.number;
    let percent = screen.progress.percentage();
    let indicator = screen.progress.indicator();
    let percent_text = screen.progress.percent_text();

    rsx! {
        section { class: "survey",
            div { class: "progress",
                div { class: "progress__bar",
                    div { class: "progress__fill", style: "width: {percent}%" }
                }
                span { class: "progress__indicator", id: "page-indicator", "{indicator}" }
                span { class: "progress__percent", "{percent_text}" }
            }

            if let Some(banner) = screen.banner {
                div { class: "alert alert-warning", role: "alert", "{banner}" }
            }
            if let Some(message) = screen.submit_error {
                div { class: "alert alert-error", role: "alert",
                    "{message}"
                    button {
                        class: "alert__close",
                        r#type: "button",
                        onclick: move |_| on_intent.call(WizardIntent::DismissError),
                        "×"
                    }
                }
            }
            if let Some(err) = view_error {
                div { class: "alert alert-error", role: "alert", "{err.message()}" }
            }

            h2 { class: "survey__title", "{screen.page.title}" }
            div { class: "survey__questions",
                for field in screen.page.fields {
                    QuestionField { key: "{field.key}", field: field.clone(), on_intent }
                }
            }

            div { class: "nav-buttons",
                if screen.nav.show_prev {
                    button {
                        class: "btn btn-secondary",
                        id: "survey-prev",
                        r#type: "button",
                        onclick: move |_| on_intent.call(WizardIntent::Prev { from: number }),
                        "前へ"
                    }
                }
                if screen.nav.show_next {
                    button {
                        class: "btn btn-primary",
                        id: "survey-next",
                        r#type: "button",
                        onclick: move |_| on_intent.call(WizardIntent::Next { from: number }),
                        "次へ"
                    }
                }
                if screen.submit.visible {
                    button {
                        class: "btn btn-submit",
                        id: "survey-submit",
                        r#type: "button",
                        disabled: !screen.submit.enabled,
                        onclick: move |_| on_intent.call(WizardIntent::RequestSubmit),
                        "{screen.submit.label}"
                    }
                }
            }

            if let Some(saved) = screen.last_saved {
                p { class: "autosave-note", "{saved}" }
            }

            if screen.confirming {
                div { class: "dialog-overlay",
                    div { class: "dialog", role: "dialog", aria_modal: "true",
                        p { "{CONFIRM_SUBMIT_PROMPT}" }
                        div { class: "dialog__actions",
                            button {
                                class: "btn btn-secondary",
                                id: "confirm-cancel",
                                r#type: "button",
                                onclick: move |_| on_intent.call(WizardIntent::CancelSubmit),
                                "キャンセル"
                            }
                            button {
                                class: "btn btn-submit",
                                id: "confirm-submit",
                                r#type: "button",
                                onclick: move |_| on_intent.call(WizardIntent::ConfirmSubmit),
                                "送信する"
                            }
                        }
                    }
                }
            }

            if screen.leave_pending {
                div { class: "dialog-overlay",
                    div { class: "dialog", role: "alertdialog", aria_modal: "true",
                        p { "{LEAVE_WARNING}" }
                        div { class: "dialog__actions",
                            button {
                                class: "btn btn-secondary",
                                id: "leave-stay",
                                r#type: "button",
                                onclick: move |_| on_intent.call(WizardIntent::StayInSurvey),
                                "このページに留まる"
                            }
                            button {
                                class: "btn btn-primary",
                                id: "leave-confirm",
                                r#type: "button",
                                onclick: move |_| on_intent.call(WizardIntent::LeaveSurvey),
                                "終了する"
                            }
                        }
                    }
                }
            }

            if let Some(response_id) = screen.completion {
                div { class: "dialog-overlay",
                    div { class: "dialog dialog--complete", role: "dialog", aria_modal: "true",
                        h2 { "ご協力ありがとうございました" }
                        p { "回答を受け付けました。" }
                        if let Some(id) = response_id {
                            p { class: "dialog__receipt", "受付番号: {id}" }
                        }
                        button {
                            class: "btn btn-primary",
                            id: "complete-close",
                            r#type: "button",
                            onclick: move |_| on_intent.call(WizardIntent::DismissCompletion),
                            "閉じる"
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct SurveyTestHandles {
    dispatch: Rc<RefCell<Option<Callback<WizardIntent>>>>,
    vm: Rc<RefCell<Option<Signal<Option<WizardVm>>>>>,
}

#[cfg(test)]
impl SurveyTestHandles {
    pub(crate) fn register(&self, dispatch: Callback<WizardIntent>, vm: Signal<Option<WizardVm>>) {
        *self.dispatch.borrow_mut() = Some(dispatch);
        *self.vm.borrow_mut() = Some(vm);
    }

    pub(crate) fn dispatch(&self) -> Callback<WizardIntent> {
        (*self.dispatch.borrow()).expect("survey dispatch registered")
    }

    pub(crate) fn vm(&self) -> Signal<Option<WizardVm>> {
        (*self.vm.borrow()).expect("survey vm registered")
    }
}
