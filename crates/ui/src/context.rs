use std::sync::Arc;

use services::{DashboardClient, WizardLoopService};

pub trait UiApp: Send + Sync {
    fn wizard(&self) -> Arc<WizardLoopService>;
    fn dashboard(&self) -> Arc<DashboardClient>;
}

#[derive(Clone)]
pub struct AppContext {
    wizard: Arc<WizardLoopService>,
    dashboard: Arc<DashboardClient>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            wizard: app.wizard(),
            dashboard: app.dashboard(),
        }
    }

    #[must_use]
    pub fn wizard(&self) -> Arc<WizardLoopService> {
        Arc::clone(&self.wizard)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardClient> {
        Arc::clone(&self.dashboard)
    }
}

// This context is provided by the application composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
