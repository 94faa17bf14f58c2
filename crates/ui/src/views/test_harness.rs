use std::sync::Arc;

use async_trait::async_trait;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use services::{
    Clock, DashboardClient, SubmissionError, SubmissionReceipt, SubmitConfig, SurveySubmitter,
    WizardLoopService,
};
use storage::repository::Storage;
use survey_core::model::SubmissionPayload;
use survey_core::registry::{employee_survey, standard_registry};
use survey_core::time::fixed_now;

use crate::context::{UiApp, build_app_context};
use crate::views::survey::SurveyTestHandles;
use crate::views::{DashboardView, SurveyView};

/// Nothing listens on the discard port, so dashboard requests fail fast.
const UNREACHABLE_API: &str = "http://127.0.0.1:9";

/// Accepts or rejects every submission.
pub struct StubSubmitter {
    pub accept: bool,
}

#[async_trait]
impl SurveySubmitter for StubSubmitter {
    async fn submit(
        &self,
        _payload: &SubmissionPayload,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        if self.accept {
            Ok(SubmissionReceipt {
                response_id: Some("resp-ui".to_string()),
                message: None,
            })
        } else {
            Err(SubmissionError::Rejected("closed".to_string()))
        }
    }
}

#[derive(Clone)]
struct TestApp {
    wizard: Arc<WizardLoopService>,
    dashboard: Arc<DashboardClient>,
}

impl UiApp for TestApp {
    fn wizard(&self) -> Arc<WizardLoopService> {
        Arc::clone(&self.wizard)
    }

    fn dashboard(&self) -> Arc<DashboardClient> {
        Arc::clone(&self.dashboard)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Survey,
    Dashboard,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
    survey_handles: Option<SurveyTestHandles>,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ViewHarnessProps {}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    if let Some(handles) = props.survey_handles.clone() {
        use_context_provider(|| handles);
    }
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Survey => rsx! { SurveyView {} },
        ViewKind::Dashboard => rsx! { DashboardView {} },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub storage: Storage,
    pub survey_handles: Option<SurveyTestHandles>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Drive until `needle` shows up or the attempts run out.
    pub async fn drive_until(&mut self, needle: &str) -> String {
        for _ in 0..40 {
            let html = self.render();
            if html.contains(needle) {
                return html;
            }
            self.drive_async().await;
        }
        self.render()
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }

    pub fn handles(&self) -> SurveyTestHandles {
        self.survey_handles.clone().expect("survey handles")
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn setup_view_harness(view: ViewKind) -> ViewHarness {
    setup_view_harness_with(view, Storage::in_memory(), true)
}

pub fn setup_view_harness_with(view: ViewKind, storage: Storage, accept: bool) -> ViewHarness {
    let config = SubmitConfig::new(UNREACHABLE_API).expect("config");
    let wizard = Arc::new(WizardLoopService::new(
        Clock::fixed(fixed_now()),
        storage.clone(),
        Arc::new(StubSubmitter { accept }),
        config,
        Arc::new(employee_survey().expect("survey definition")),
        Arc::new(standard_registry()),
    ));
    let dashboard = Arc::new(DashboardClient::new(UNREACHABLE_API).expect("dashboard client"));

    let survey_handles = match view {
        ViewKind::Survey => Some(SurveyTestHandles::default()),
        ViewKind::Dashboard => None,
    };
    let app = Arc::new(TestApp {
        wizard,
        dashboard,
    });

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app,
            view,
            survey_handles: survey_handles.clone(),
        },
    );

    ViewHarness {
        dom,
        storage,
        survey_handles,
    }
}
