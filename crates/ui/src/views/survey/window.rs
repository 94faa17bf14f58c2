use std::rc::Rc;

use dioxus::desktop::tao::event::{Event, WindowEvent};
use dioxus::desktop::{DesktopContext, WindowCloseBehaviour, WryEventHandler};
use dioxus::prelude::*;
use tokio::sync::mpsc;
use tracing::debug;

use crate::vm::WizardIntent;

/// Turn the window's close button into `WizardIntent::CloseRequested`.
///
/// The app hides instead of closing on that button, so the survey decides
/// whether to ask first. Outside a desktop window this does nothing.
pub(super) fn use_close_requests(dispatch: Callback<WizardIntent>) {
    use_hook_with_cleanup(
        move || {
            let desktop = try_consume_context::<DesktopContext>()?;
            let window_id = desktop.window.id();
            let (tx, mut rx) = mpsc::unbounded_channel::<()>();

            // wry handlers run outside the dioxus runtime; hop back in.
            spawn(async move {
                while rx.recv().await.is_some() {
                    dispatch.call(WizardIntent::CloseRequested);
                }
            });

            let handler = desktop.create_wry_event_handler(move |event, _| {
                if let Event::WindowEvent {
                    event: WindowEvent::CloseRequested,
                    window_id: id,
                    ..
                } = event
                {
                    if *id == window_id {
                        let _ = tx.send(());
                    }
                }
            });
            Some(Rc::new(handler))
        },
        |handler: Option<Rc<WryEventHandler>>| {
            if let Some(handler) = handler {
                handler.remove();
            }
        },
    );
}

/// Show the window again so the leave warning can be answered.
pub(super) fn keep_window_open() {
    if let Some(desktop) = try_consume_context::<DesktopContext>() {
        desktop.window.set_visible(true);
        desktop.window.set_focus();
    }
}

pub(super) fn close_window() {
    match try_consume_context::<DesktopContext>() {
        Some(desktop) => {
            desktop.set_close_behavior(WindowCloseBehaviour::WindowCloses);
            desktop.close();
        }
        None => debug!("no desktop window to close"),
    }
}
