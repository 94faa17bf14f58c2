use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::views::{DashboardView, SurveyView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", SurveyView)] Survey {},
        #[route("/dashboard", DashboardView)] Dashboard {},
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Header {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Header() -> Element {
    rsx! {
        header { class: "app-header",
            h1 { "従業員満足度調査" }
            nav {
                ul {
                    li { Link { to: Route::Survey {}, "アンケート" } }
                    li { Link { to: Route::Dashboard {}, "ダッシュボード" } }
                }
            }
        }
    }
}
