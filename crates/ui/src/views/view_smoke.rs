use services::wizard::{
    CONFIRM_SUBMIT_PROMPT, LEAVE_WARNING, SUBMIT_FAILED_MESSAGE, SUBMIT_LABEL, SUBMITTING_LABEL,
    VALIDATION_BANNER,
};
use storage::repository::Storage;
use survey_core::model::{AnswerSet, FieldKind, PageNumber, PersistedSessionRecord};
use survey_core::time::fixed_now;

use super::test_harness::{ViewHarness, ViewKind, drive_dom, setup_view_harness, setup_view_harness_with};
use crate::vm::{WizardIntent, WizardVm};

const LONG_TEXT: &str = "とても働きやすい職場だと感じています";

fn dispatch(harness: &mut ViewHarness, intent: WizardIntent) {
    let handles = harness.handles();
    harness.dom.in_runtime(|| handles.dispatch().call(intent));
    drive_dom(&mut harness.dom);
}

fn current_page(harness: &ViewHarness) -> PageNumber {
    let handles = harness.handles();
    harness
        .dom
        .in_runtime(|| handles.vm().read().as_ref().map(WizardVm::current_page))
        .expect("wizard started")
}

/// Pick the first option, or a long enough text, for every visible field.
fn answer_current_page(harness: &mut ViewHarness) {
    let handles = harness.handles();
    let page = harness
        .dom
        .in_runtime(|| handles.vm().read().as_ref().map(WizardVm::page))
        .expect("wizard started");
    for field in page.fields.into_iter().filter(|field| field.visible) {
        let value = match &field.kind {
            FieldKind::FreeText { .. } => LONG_TEXT.to_string(),
            kind => kind.options()[0].clone(),
        };
        dispatch(
            harness,
            WizardIntent::Change {
                key: field.key,
                value,
            },
        );
    }
}

async fn walk_to_last_page(harness: &mut ViewHarness) {
    for _ in 1..12 {
        answer_current_page(harness);
        let from = current_page(harness);
        dispatch(harness, WizardIntent::Next { from });
        harness.drive_async().await;
    }
    assert_eq!(current_page(harness), PageNumber::new(12));
}

#[tokio::test(flavor = "current_thread")]
async fn survey_view_renders_the_first_page() {
    let mut harness = setup_view_harness(ViewKind::Survey);
    harness.rebuild();
    let html = harness.drive_until("1/12").await;

    assert!(html.contains("1/12"), "missing page indicator: {html}");
    assert!(html.contains("所属部署"));
    assert!(html.contains("次へ"));
    assert!(!html.contains("前へ"));
    assert!(!html.contains("所属部署（その他）"));
    assert!(!html.contains(SUBMIT_LABEL));
}

#[tokio::test(flavor = "current_thread")]
async fn restored_answers_show_the_autosave_note() {
    let storage = Storage::in_memory();
    let mut answers = AnswerSet::new();
    answers.set("position", "シニア");
    storage
        .save_record(&PersistedSessionRecord::new(answers, Some(fixed_now())))
        .await
        .expect("seed record");

    let mut harness = setup_view_harness_with(ViewKind::Survey, storage, true);
    harness.rebuild();
    let html = harness.drive_until("自動保存済み").await;

    assert!(html.contains("自動保存済み"), "missing autosave note: {html}");
    assert!(html.contains("choice choice--checked"));
}

#[tokio::test(flavor = "current_thread")]
async fn advancing_with_missing_answers_shows_the_banner() {
    let mut harness = setup_view_harness(ViewKind::Survey);
    harness.rebuild();
    harness.drive_until("1/12").await;

    dispatch(&mut harness, WizardIntent::Next { from: PageNumber::FIRST });
    let html = harness.render();

    assert!(html.contains(VALIDATION_BANNER), "missing banner: {html}");
    assert!(html.contains("question question--error"));
    assert!(html.contains("1/12"));
}

#[tokio::test(flavor = "current_thread")]
async fn answered_page_advances_and_autosaves() {
    let mut harness = setup_view_harness(ViewKind::Survey);
    harness.rebuild();
    harness.drive_until("1/12").await;

    answer_current_page(&mut harness);
    dispatch(&mut harness, WizardIntent::Next { from: PageNumber::FIRST });
    let html = harness.drive_until("2/12").await;
    harness.drive_async().await;

    assert!(html.contains("2/12"), "did not advance: {html}");
    assert!(html.contains("前へ"));
    assert!(html.contains("勤続年数"));

    let record = harness
        .storage
        .load_record()
        .await
        .expect("load record")
        .expect("autosaved record");
    assert!(record.answers.get("department").is_some());
    assert!(record.answers.get("position").is_some());
}

#[tokio::test(flavor = "current_thread")]
async fn closing_mid_survey_asks_before_leaving() {
    let mut harness = setup_view_harness(ViewKind::Survey);
    harness.rebuild();
    harness.drive_until("1/12").await;

    dispatch(&mut harness, WizardIntent::CloseRequested);
    assert!(!harness.render().contains(LEAVE_WARNING));

    answer_current_page(&mut harness);
    dispatch(&mut harness, WizardIntent::Next { from: PageNumber::FIRST });
    harness.drive_until("2/12").await;

    dispatch(&mut harness, WizardIntent::CloseRequested);
    let html = harness.render();
    assert!(html.contains(LEAVE_WARNING), "no leave warning: {html}");
    assert!(html.contains("このページに留まる"));
    let handles = harness.handles();
    let pending = harness
        .dom
        .in_runtime(|| handles.vm().read().as_ref().map(WizardVm::is_leave_pending));
    assert_eq!(pending, Some(true));

    dispatch(&mut harness, WizardIntent::StayInSurvey);
    let html = harness.render();
    assert!(!html.contains(LEAVE_WARNING));
    assert!(html.contains("2/12"));
}

#[tokio::test(flavor = "current_thread")]
async fn confirmed_submission_shows_the_completion_dialog() {
    let mut harness = setup_view_harness(ViewKind::Survey);
    harness.rebuild();
    harness.drive_until("1/12").await;
    walk_to_last_page(&mut harness).await;
    answer_current_page(&mut harness);

    dispatch(&mut harness, WizardIntent::RequestSubmit);
    let html = harness.render();
    assert!(html.contains(CONFIRM_SUBMIT_PROMPT), "no confirmation: {html}");

    dispatch(&mut harness, WizardIntent::ConfirmSubmit);
    let html = harness.drive_until("受付番号: resp-ui").await;
    assert!(html.contains("ご協力ありがとうございました"), "no completion: {html}");
    assert!(html.contains("受付番号: resp-ui"));

    let record = harness.storage.load_record().await.expect("load record");
    assert!(record.is_none());

    dispatch(&mut harness, WizardIntent::DismissCompletion);
    let html = harness.render();
    assert!(!html.contains("ご協力ありがとうございました"));
}

#[tokio::test(flavor = "current_thread")]
async fn rejected_submission_reenables_submit() {
    let mut harness = setup_view_harness_with(ViewKind::Survey, Storage::in_memory(), false);
    harness.rebuild();
    harness.drive_until("1/12").await;
    walk_to_last_page(&mut harness).await;
    answer_current_page(&mut harness);

    dispatch(&mut harness, WizardIntent::RequestSubmit);
    dispatch(&mut harness, WizardIntent::ConfirmSubmit);
    let html = harness.drive_until(SUBMIT_FAILED_MESSAGE).await;

    assert!(html.contains(SUBMIT_FAILED_MESSAGE), "no failure message: {html}");
    assert!(html.contains(SUBMIT_LABEL));
    assert!(!html.contains(SUBMITTING_LABEL));
    assert!(html.contains("12/12"));

    dispatch(&mut harness, WizardIntent::DismissError);
    assert!(!harness.render().contains(SUBMIT_FAILED_MESSAGE));
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_view_reports_an_unreachable_api() {
    let mut harness = setup_view_harness(ViewKind::Dashboard);
    harness.rebuild();
    let html = harness.drive_until("サーバーからデータを取得できませんでした").await;

    assert!(html.contains("回答状況ダッシュボード"));
    assert!(
        html.contains("サーバーからデータを取得できませんでした"),
        "missing error: {html}"
    );
    assert!(html.contains("再試行"));
}
