#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use services::{Clock, SubmissionError, SubmissionReceipt, SubmitConfig, SurveySubmitter};
use services::{FieldView, Navigation, WizardController, WizardError, WizardLoopService};
use storage::repository::{InMemoryStore, LocalStore, Storage, StorageError};
use survey_core::model::{FieldKind, PageNumber, SubmissionPayload};
use survey_core::registry::{employee_survey, standard_registry};
use survey_core::time::fixed_now;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Duration, sleep};

pub const LONG_TEXT: &str = "とても働きやすい職場だと感じています";

/// `LocalStore` that counts writes and delegates to memory.
#[derive(Default)]
pub struct CountingStore {
    inner: InMemoryStore,
    writes: AtomicUsize,
}

impl CountingStore {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocalStore for CountingStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set_item(key, value).await
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove_item(key).await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.inner.clear().await
    }
}

/// `LocalStore` whose first write stalls, so a later write can overtake it.
pub struct SlowFirstStore {
    inner: InMemoryStore,
    delay: Duration,
    writes: AtomicUsize,
}

impl SlowFirstStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: InMemoryStore::new(),
            delay,
            writes: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LocalStore for SlowFirstStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.writes.fetch_add(1, Ordering::SeqCst) == 0 {
            sleep(self.delay).await;
        }
        self.inner.set_item(key, value).await
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove_item(key).await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.inner.clear().await
    }
}

/// What a fake submitter does with the next payload.
pub enum Outcome {
    Accept(&'static str),
    Status(u16),
}

pub struct FakeSubmitter {
    outcome: Mutex<Outcome>,
    pub received: Mutex<Vec<SubmissionPayload>>,
}

impl FakeSubmitter {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            received: Mutex::new(Vec::new()),
        }
    }

    pub async fn set_outcome(&self, outcome: Outcome) {
        *self.outcome.lock().await = outcome;
    }
}

#[async_trait]
impl SurveySubmitter for FakeSubmitter {
    async fn submit(
        &self,
        payload: &SubmissionPayload,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        self.received.lock().await.push(payload.clone());
        match &*self.outcome.lock().await {
            Outcome::Accept(id) => Ok(SubmissionReceipt {
                response_id: Some((*id).to_string()),
                message: None,
            }),
            Outcome::Status(code) => Err(SubmissionError::HttpStatus(
                reqwest::StatusCode::from_u16(*code).unwrap(),
            )),
        }
    }
}

pub fn config() -> SubmitConfig {
    SubmitConfig::new("http://localhost:5000")
        .unwrap()
        .with_user_agent("survey-tests/1.0")
}

pub fn loop_service(
    storage: Storage,
    submitter: Arc<dyn SurveySubmitter>,
    config: SubmitConfig,
) -> WizardLoopService {
    WizardLoopService::new(
        Clock::fixed(fixed_now()),
        storage,
        submitter,
        config,
        Arc::new(employee_survey().unwrap()),
        Arc::new(standard_registry()),
    )
}

/// A value that satisfies `field`.
pub fn valid_value(field: &FieldView) -> String {
    match &field.kind {
        FieldKind::SingleChoice { options } | FieldKind::Select { options } => options[0].clone(),
        FieldKind::FreeText { .. } => LONG_TEXT.to_string(),
    }
}

/// Edit a field and wait for its autosave.
pub async fn edit(
    service: &WizardLoopService,
    wizard: &mut WizardController,
    key: &str,
    value: impl Into<String>,
) -> Result<(), WizardError> {
    let pending = service.change_field(wizard, key, value)?;
    service.persist(pending).await;
    Ok(())
}

/// Advance from `from` and wait for the autosave a move owes.
pub async fn go_next(
    service: &WizardLoopService,
    wizard: &mut WizardController,
    from: PageNumber,
) -> Result<Navigation, WizardError> {
    let step = service.advance(wizard, from)?;
    if let Some(pending) = step.save {
        service.persist(pending).await;
    }
    Ok(step.navigation)
}

/// Send a confirmed survey and apply the outcome.
pub async fn submit(
    service: &WizardLoopService,
    wizard: &mut WizardController,
) -> Result<SubmissionReceipt, WizardError> {
    let payload = service.prepare_submission(wizard)?;
    let outcome = service.send_submission(&payload).await;
    service.settle_submission(wizard, outcome)
}

/// Fill every visible field of the current page with a valid value.
pub async fn answer_current_page(service: &WizardLoopService, wizard: &mut WizardController) {
    let fields = wizard.page_view().fields;
    for field in fields.iter().filter(|field| field.visible) {
        edit(service, wizard, &field.key, valid_value(field))
            .await
            .unwrap();
    }
}

/// Answer and advance until the last page is reached.
pub async fn walk_to_last_page(service: &WizardLoopService, wizard: &mut WizardController) {
    while wizard.current_page().value() < wizard.total_pages() {
        answer_current_page(service, wizard).await;
        let from = wizard.current_page();
        go_next(service, wizard, from).await.unwrap();
    }
}

/// Serve exactly one HTTP response and hand back the raw request.
pub async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });
    (format!("http://{addr}"), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let body_len = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
