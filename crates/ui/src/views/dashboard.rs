use dioxus::prelude::*;
use tracing::warn;

use services::{DashboardError, NewSurveyToken};

use crate::context::AppContext;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{DashboardVm, SummaryCardVm, TokenRowVm, map_dashboard};

fn unavailable(err: &DashboardError) -> ViewError {
    warn!(error = %err, "dashboard request failed");
    ViewError::Unavailable
}

fn parse_count(raw: &str, fallback: u32) -> u32 {
    raw.trim().parse::<u32>().ok().filter(|n| *n > 0).unwrap_or(fallback)
}

#[component]
pub fn DashboardView() -> Element {
    let ctx = use_context::<AppContext>();
    let dashboard = ctx.dashboard();

    let dashboard_for_resource = dashboard.clone();
    let resource = use_resource(move || {
        let dashboard = dashboard_for_resource.clone();
        async move {
            let stats = dashboard.statistics().await.map_err(|err| unavailable(&err))?;
            // Token management is admin-only; other roles still see statistics.
            let tokens = match dashboard.list_tokens().await {
                Ok(tokens) => tokens,
                Err(err) => {
                    warn!(error = %err, "could not list survey tokens");
                    Vec::new()
                }
            };
            Ok::<_, ViewError>(map_dashboard(&stats, &tokens))
        }
    });
    let state = view_state_from_resource(&resource);

    let notice = use_signal(|| None::<String>);
    let export_text = use_signal(|| None::<String>);

    let on_export = {
        let dashboard = dashboard.clone();
        use_callback(move |()| {
            let dashboard = dashboard.clone();
            let mut notice = notice;
            let mut export_text = export_text;
            spawn(async move {
                match dashboard.export().await {
                    Ok(bundle) => {
                        notice.set(Some(format!("{}件の回答をエクスポートしました。", bundle.count)));
                        export_text.set(Some(bundle.data));
                    }
                    Err(err) => notice.set(Some(unavailable(&err).message().to_string())),
                }
            });
        })
    };

    let on_create = {
        let dashboard = dashboard.clone();
        use_callback(move |request: NewSurveyToken| {
            let dashboard = dashboard.clone();
            let mut notice = notice;
            let mut resource = resource;
            spawn(async move {
                match dashboard.create_token(&request).await {
                    Ok(created) => {
                        notice.set(Some(format!("調査URLを発行しました: {}", created.survey_url)));
                        resource.restart();
                    }
                    Err(err) => notice.set(Some(unavailable(&err).message().to_string())),
                }
            });
        })
    };

    let on_disable = {
        let dashboard = dashboard.clone();
        use_callback(move |token: String| {
            let dashboard = dashboard.clone();
            let mut notice = notice;
            let mut resource = resource;
            spawn(async move {
                match dashboard.disable_token(&token).await {
                    Ok(()) => {
                        notice.set(Some("トークンを無効化しました。".to_string()));
                        resource.restart();
                    }
                    Err(DashboardError::TokenNotFound) => {
                        notice.set(Some("トークンが見つかりません。".to_string()));
                        resource.restart();
                    }
                    Err(err) => notice.set(Some(unavailable(&err).message().to_string())),
                }
            });
        })
    };

    rsx! {
        div { class: "page dashboard-page",
            h2 { "回答状況ダッシュボード" }

            if let Some(message) = notice() {
                div { class: "alert alert-info", role: "status", "{message}" }
            }

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
                ViewState::Ready(data) => rsx! {
                    DashboardBody { data, on_disable }
                    div { class: "dashboard-actions",
                        button {
                            class: "btn btn-secondary",
                            id: "dashboard-export",
                            r#type: "button",
                            onclick: move |_| on_export.call(()),
                            "CSVエクスポート"
                        }
                    }
                    TokenForm { on_create }
                },
            }

            if let Some(csv) = export_text() {
                textarea { class: "export-data", readonly: true, rows: "8", value: "{csv}" }
            }
        }
    }
}

#[component]
fn DashboardBody(data: DashboardVm, on_disable: EventHandler<String>) -> Element {
    if data.is_empty() {
        return rsx! {
            SummaryCards { cards: data.cards }
            p { class: "dashboard-empty", "まだ回答がありません。" }
            TokenTable { tokens: data.tokens, on_disable }
        };
    }

    rsx! {
        SummaryCards { cards: data.cards }

        h3 { "満足度分布" }
        div { class: "chart chart--distribution",
            for bar in data.distribution {
                div { class: "chart__row",
                    span { class: "chart__label", "{bar.score}" }
                    div { class: "chart__track",
                        div { class: "chart__bar", style: "width: {bar.percent}%" }
                    }
                    span { class: "chart__value", "{bar.count}件 ({bar.percent}%)" }
                }
            }
        }

        if !data.trend.is_empty() {
            h3 { "回答数の推移" }
            div { class: "chart chart--trend",
                for bar in data.trend {
                    div { class: "chart__column", title: "{bar.count}",
                        div { class: "chart__bar", style: "height: {bar.height_percent}%" }
                    }
                }
            }
        }

        if !data.departments.is_empty() {
            h3 { "部署別" }
            table { class: "table",
                thead {
                    tr {
                        th { "部署" }
                        th { "平均満足度" }
                        th { "回答数" }
                    }
                }
                tbody {
                    for row in data.departments {
                        tr {
                            td { "{row.department}" }
                            td { "{row.satisfaction}" }
                            td { "{row.responses}" }
                        }
                    }
                }
            }
        }

        if !data.categories.is_empty() {
            h3 { "カテゴリ別 満足度と期待度" }
            table { class: "table",
                thead {
                    tr {
                        th { "カテゴリ" }
                        th { "満足度" }
                        th { "期待度" }
                        th { "差" }
                    }
                }
                tbody {
                    for row in data.categories {
                        tr {
                            td { "{row.category}" }
                            td { "{row.satisfaction}" }
                            td { "{row.expectation}" }
                            td { "{row.gap}" }
                        }
                    }
                }
            }
        }

        TokenTable { tokens: data.tokens, on_disable }
    }
}

#[component]
fn SummaryCards(cards: Vec<SummaryCardVm>) -> Element {
    rsx! {
        div { class: "summary-cards",
            for card in cards {
                div { class: "summary-card",
                    span { class: "summary-card__label", "{card.label}" }
                    span { class: "summary-card__value", "{card.value}" }
                }
            }
        }
    }
}

#[component]
fn TokenTable(tokens: Vec<TokenRowVm>, on_disable: EventHandler<String>) -> Element {
    if tokens.is_empty() {
        return rsx! {};
    }

    rsx! {
        h3 { "調査URLトークン" }
        table { class: "table table--tokens",
            thead {
                tr {
                    th { "トークン" }
                    th { "説明" }
                    th { "回答数" }
                    th { "有効期限" }
                    th { "状態" }
                    th {}
                }
            }
            tbody {
                for row in tokens {
                    tr { key: "{row.token}",
                        td { class: "mono", "{row.token}" }
                        td { "{row.description}" }
                        td { "{row.usage}" }
                        td { "{row.expires_at}" }
                        td { "{row.status}" }
                        td {
                            if row.can_disable {
                                button {
                                    class: "btn btn-danger btn-small",
                                    r#type: "button",
                                    onclick: {
                                        let token = row.token.clone();
                                        move |_| on_disable.call(token.clone())
                                    },
                                    "無効化"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn TokenForm(on_create: EventHandler<NewSurveyToken>) -> Element {
    let defaults = NewSurveyToken::default();
    let mut max_responses = use_signal(|| defaults.max_responses.to_string());
    let mut expires_hours = use_signal(|| defaults.expires_hours.to_string());
    let mut description = use_signal(String::new);

    rsx! {
        div { class: "token-form",
            h3 { "調査URLを発行" }
            label {
                "回答数上限"
                input {
                    r#type: "number",
                    min: "1",
                    value: "{max_responses}",
                    oninput: move |evt: FormEvent| max_responses.set(evt.value()),
                }
            }
            label {
                "有効期間（時間）"
                input {
                    r#type: "number",
                    min: "1",
                    value: "{expires_hours}",
                    oninput: move |evt: FormEvent| expires_hours.set(evt.value()),
                }
            }
            label {
                "説明"
                input {
                    r#type: "text",
                    value: "{description}",
                    oninput: move |evt: FormEvent| description.set(evt.value()),
                }
            }
            button {
                class: "btn btn-primary",
                id: "token-create",
                r#type: "button",
                onclick: move |_| {
                    let defaults = NewSurveyToken::default();
                    on_create.call(NewSurveyToken {
                        max_responses: parse_count(&max_responses(), defaults.max_responses),
                        description: description().trim().to_string(),
                        expires_hours: parse_count(&expires_hours(), defaults.expires_hours),
                    });
                },
                "発行する"
            }
        }
    }
}
