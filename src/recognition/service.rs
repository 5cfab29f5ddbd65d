//! Recognition job runner
//!
//! Owns a tokio runtime and spawns one task per job. Tasks report back over a
//! crossbeam channel so the UI thread can poll without blocking. Every job
//! carries a cancellation token; cancelling drops the in-flight engine call.

use anyhow::{Context, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tokio::time::{interval_at, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{JobId, OcrEngine, SyntheticProgress};
use crate::capture::acquisition::ImageFile;
use crate::config::OcrSettings;

/// Callback used to wake the UI after an event
pub type RepaintNotifier = Arc<dyn Fn() + Send + Sync>;

/// Message from a job task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionEvent {
    pub job: JobId,
    pub kind: RecognitionEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEventKind {
    /// Synthetic progress percentage
    Progress(u8),
    /// Final transcription
    Completed(String),
    /// Engine error, formatted for display
    Failed(String),
    /// Job was cancelled before finishing
    Cancelled,
}

impl RecognitionEventKind {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RecognitionEventKind::Progress(_))
    }
}

/// Per-job parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOptions {
    pub language: String,
    pub tick: Duration,
    pub step: u8,
    pub cap: u8,
}

impl JobOptions {
    pub fn from_settings(settings: &OcrSettings) -> Self {
        Self {
            language: settings.language.clone(),
            tick: Duration::from_millis(settings.progress_interval_ms.max(1)),
            step: settings.progress_step,
            cap: settings.progress_cap,
        }
    }
}

/// Handle to a running job
#[derive(Debug, Clone)]
pub struct JobHandle {
    id: JobId,
    cancel: CancellationToken,
}

impl JobHandle {
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Abort the job. The task still reports `Cancelled`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Runs recognition jobs against the configured engine
pub struct RecognitionService {
    runtime: Runtime,
    engine: Arc<dyn OcrEngine>,
    options: JobOptions,
    events_tx: Sender<RecognitionEvent>,
    events_rx: Receiver<RecognitionEvent>,
    notifier: Option<RepaintNotifier>,
}

impl RecognitionService {
    pub fn new(engine: Arc<dyn OcrEngine>, options: JobOptions) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("ocr-worker")
            .enable_all()
            .build()
            .context("Failed to create tokio runtime")?;
        let (events_tx, events_rx) = unbounded();

        Ok(Self {
            runtime,
            engine,
            options,
            events_tx,
            events_rx,
            notifier: None,
        })
    }

    /// Swap the engine used by future jobs
    pub fn set_engine(&mut self, engine: Arc<dyn OcrEngine>, options: JobOptions) {
        info!("Recognition engine set to {}", engine.name());
        self.engine = engine;
        self.options = options;
    }

    pub fn set_notifier(&mut self, notifier: RepaintNotifier) {
        self.notifier = Some(notifier);
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Event stream for all jobs
    pub fn events(&self) -> &Receiver<RecognitionEvent> {
        &self.events_rx
    }

    /// Start recognizing `image` in the background
    pub fn start(&self, image: ImageFile) -> JobHandle {
        let id = JobId::new();
        let cancel = CancellationToken::new();

        // Timers must be created inside the runtime context
        let _guard = self.runtime.enter();
        let mut ticker = interval_at(
            tokio::time::Instant::now() + self.options.tick,
            self.options.tick,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let ctx = JobContext {
            id,
            cancel: cancel.clone(),
            events: self.events_tx.clone(),
            notifier: self.notifier.clone(),
            ticker,
            progress: SyntheticProgress::new(self.options.step, self.options.cap),
        };
        let engine = self.engine.clone();
        let language = self.options.language.clone();

        self.runtime.spawn(run_job(engine, language, image, ctx));

        JobHandle { id, cancel }
    }
}

struct JobContext {
    id: JobId,
    cancel: CancellationToken,
    events: Sender<RecognitionEvent>,
    notifier: Option<RepaintNotifier>,
    ticker: Interval,
    progress: SyntheticProgress,
}

impl JobContext {
    fn emit(&self, kind: RecognitionEventKind) {
        // The receiver lives as long as the service
        let _ = self.events.send(RecognitionEvent { job: self.id, kind });
        if let Some(notify) = &self.notifier {
            notify();
        }
    }

    /// Poll `fut` to completion while ticking progress. `None` if cancelled first.
    async fn drive<F: Future>(&mut self, fut: F) -> Option<F::Output> {
        tokio::pin!(fut);
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return None,
                out = &mut fut => return Some(out),
                _ = self.ticker.tick() => {
                    if let Some(percent) = self.progress.advance() {
                        self.emit(RecognitionEventKind::Progress(percent));
                    }
                }
            }
        }
    }
}

async fn run_job(engine: Arc<dyn OcrEngine>, language: String, image: ImageFile, mut ctx: JobContext) {
    let started = Instant::now();
    info!("Job {}: recognizing {} with {}", ctx.id, image.name, engine.name());

    let mut worker = match ctx.drive(engine.start(&language)).await {
        None => {
            info!("Job {}: cancelled during engine start", ctx.id);
            ctx.emit(RecognitionEventKind::Cancelled);
            return;
        }
        Some(Err(e)) => {
            warn!("Job {}: engine failed to start: {}", ctx.id, e);
            ctx.emit(RecognitionEventKind::Failed(e.to_string()));
            return;
        }
        Some(Ok(worker)) => worker,
    };

    let outcome = ctx.drive(worker.recognize(&image)).await;
    worker.terminate().await;

    match outcome {
        None => {
            info!("Job {}: cancelled after {:?}", ctx.id, started.elapsed());
            ctx.emit(RecognitionEventKind::Cancelled);
        }
        Some(Ok(text)) => {
            info!(
                "Job {}: recognized {} chars in {:?}",
                ctx.id,
                text.len(),
                started.elapsed()
            );
            let percent = ctx.progress.complete();
            ctx.emit(RecognitionEventKind::Progress(percent));
            ctx.emit(RecognitionEventKind::Completed(text));
        }
        Some(Err(e)) => {
            warn!("Job {}: recognition failed: {}", ctx.id, e);
            ctx.emit(RecognitionEventKind::Failed(e.to_string()));
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::capture::acquisition::{accept_image, tests::png_bytes};
    use crate::recognition::{OcrWorker, RecognitionError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Engine with a fixed outcome that counts worker lifecycles
    pub(crate) struct ScriptedEngine {
        pub outcome: Result<String, String>,
        pub delay: Duration,
        pub started: Arc<AtomicUsize>,
        pub terminated: Arc<AtomicUsize>,
    }

    impl ScriptedEngine {
        pub(crate) fn new(outcome: Result<&str, &str>, delay: Duration) -> Self {
            Self {
                outcome: outcome.map(str::to_string).map_err(str::to_string),
                delay,
                started: Arc::new(AtomicUsize::new(0)),
                terminated: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    struct ScriptedWorker {
        outcome: Result<String, String>,
        delay: Duration,
        terminated: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl OcrEngine for ScriptedEngine {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn start(&self, _language: &str) -> Result<Box<dyn OcrWorker>, RecognitionError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(ScriptedWorker {
                outcome: self.outcome.clone(),
                delay: self.delay,
                terminated: self.terminated.clone(),
            }))
        }
    }

    #[async_trait]
    impl OcrWorker for ScriptedWorker {
        async fn recognize(&mut self, _image: &ImageFile) -> Result<String, RecognitionError> {
            tokio::time::sleep(self.delay).await;
            self.outcome.clone().map_err(RecognitionError::Engine)
        }

        async fn terminate(&mut self) {
            self.terminated.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub(crate) fn fast_options() -> JobOptions {
        JobOptions {
            language: "eng".to_string(),
            tick: Duration::from_millis(10),
            step: 10,
            cap: 90,
        }
    }

    pub(crate) fn test_image() -> ImageFile {
        accept_image("photo.png", png_bytes(2, 2), 64).unwrap().original
    }

    /// Collect events for one job until a terminal event arrives
    pub(crate) fn collect_until_done(service: &RecognitionService, job: JobId) -> Vec<RecognitionEventKind> {
        let mut kinds = Vec::new();
        loop {
            let event = service
                .events()
                .recv_timeout(Duration::from_secs(5))
                .expect("job produced no terminal event");
            if event.job != job {
                continue;
            }
            let terminal = event.kind.is_terminal();
            kinds.push(event.kind);
            if terminal {
                return kinds;
            }
        }
    }

    #[test]
    fn test_successful_job_reports_progress_then_text() {
        let engine = Arc::new(ScriptedEngine::new(Ok("Mitochondria"), Duration::from_millis(60)));
        let terminated = engine.terminated.clone();
        let service = RecognitionService::new(engine, fast_options()).unwrap();

        let handle = service.start(test_image());
        let kinds = collect_until_done(&service, handle.id());

        let progress: Vec<u8> = kinds
            .iter()
            .filter_map(|k| match k {
                RecognitionEventKind::Progress(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert!(progress.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(progress.last(), Some(&100));
        assert!(progress[..progress.len() - 1].iter().all(|p| *p <= 90));
        assert_eq!(
            kinds.last(),
            Some(&RecognitionEventKind::Completed("Mitochondria".to_string()))
        );
        assert_eq!(terminated.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_job_terminates_worker() {
        let engine = Arc::new(ScriptedEngine::new(Err("blurry"), Duration::from_millis(5)));
        let terminated = engine.terminated.clone();
        let service = RecognitionService::new(engine, fast_options()).unwrap();

        let handle = service.start(test_image());
        let kinds = collect_until_done(&service, handle.id());

        assert!(matches!(
            kinds.last(),
            Some(RecognitionEventKind::Failed(message)) if message.contains("blurry")
        ));
        assert_eq!(terminated.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_aborts_recognition() {
        let engine = Arc::new(ScriptedEngine::new(Ok("never"), Duration::from_secs(30)));
        let terminated = engine.terminated.clone();
        let service = RecognitionService::new(engine, fast_options()).unwrap();

        let handle = service.start(test_image());
        std::thread::sleep(Duration::from_millis(30));
        handle.cancel();
        assert!(handle.is_cancelled());

        let kinds = collect_until_done(&service, handle.id());
        assert_eq!(kinds.last(), Some(&RecognitionEventKind::Cancelled));
        assert!(!kinds.iter().any(|k| matches!(k, RecognitionEventKind::Completed(_))));
        assert_eq!(terminated.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_engine_start_failure_is_reported() {
        let engine = Arc::new(crate::recognition::TesseractEngine::new("/nonexistent/tesseract"));
        let service = RecognitionService::new(engine, fast_options()).unwrap();

        let handle = service.start(test_image());
        let kinds = collect_until_done(&service, handle.id());

        assert!(matches!(
            kinds.last(),
            Some(RecognitionEventKind::Failed(message)) if message.contains("unavailable")
        ));
    }

    #[test]
    fn test_notifier_is_called() {
        let engine = Arc::new(ScriptedEngine::new(Ok("x"), Duration::from_millis(1)));
        let mut service = RecognitionService::new(engine, fast_options()).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        service.set_notifier(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let handle = service.start(test_image());
        let kinds = collect_until_done(&service, handle.id());
        // The last notification races the final send
        std::thread::sleep(Duration::from_millis(50));

        assert_eq!(calls.load(Ordering::SeqCst), kinds.len());
    }

    #[test]
    fn test_options_from_settings() {
        let settings = OcrSettings::default();
        let options = JobOptions::from_settings(&settings);
        assert_eq!(options.tick, Duration::from_millis(200));
        assert_eq!(options.language, "eng");
    }
}
