//! The upload pipeline state machine.
//!
//! `STARTED → TRANSFORMING → TRANSFORM_DONE → PUBLISHING[platform]… → COMPLETED`,
//! with `ERRORED` reachable from `TRANSFORMING` only. Every transition is
//! reported through the run's [`ProgressNotifier`]; overall progress follows
//! the configured [`StageWeights`] and never decreases.

use dayclip_core::models::{clamp_percent, codes};
use dayclip_core::{
    PipelineResult, PlatformName, PlatformOutcome, ProgressEvent, StageWeights, UploadRequest,
};
use dayclip_platforms::{PublishReceipt, PublishRequest, PublisherRegistry};
use dayclip_processing::{MediaTransform, TransformRequest};
use serde_json::Value;
use std::sync::Arc;

use super::error::PipelineError;
use super::tracker::ProgressTracker;
use crate::progress::{ProgressEmitter, ProgressNotifier};

pub struct UploadPipeline {
    transform: Arc<dyn MediaTransform>,
    publishers: PublisherRegistry,
    emitter: Arc<dyn ProgressEmitter>,
    weights: StageWeights,
    preview_base_url: String,
}

impl std::fmt::Debug for UploadPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadPipeline")
            .field("publishers", &self.publishers)
            .field("weights", &self.weights)
            .field("preview_base_url", &self.preview_base_url)
            .finish()
    }
}

/// Per-run state threaded through the stages.
struct Run<'a> {
    notifier: ProgressNotifier,
    tracker: ProgressTracker,
    weights: &'a StageWeights,
}

impl Run<'_> {
    fn emit(&mut self, code: impl Into<String>, message: impl Into<String>, target: f64) {
        let progress = self.tracker.advance(target);
        self.notifier
            .notify(ProgressEvent::new(code, message, progress));
    }

    fn emit_with(&mut self, event: ProgressEvent) {
        let progress = self.tracker.advance(event.progress);
        self.notifier.notify(ProgressEvent { progress, ..event });
    }
}

impl UploadPipeline {
    pub fn new(
        transform: Arc<dyn MediaTransform>,
        publishers: PublisherRegistry,
        emitter: Arc<dyn ProgressEmitter>,
        weights: StageWeights,
        preview_base_url: impl Into<String>,
    ) -> Self {
        Self {
            transform,
            publishers,
            emitter,
            weights,
            preview_base_url: preview_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn weights(&self) -> &StageWeights {
        &self.weights
    }

    /// Run one upload.
    ///
    /// Fails only when the transform stage fails; publish failures become
    /// skipped outcomes. Exactly one outcome per known platform is returned,
    /// in publishing order.
    #[tracing::instrument(skip(self, request), fields(
        session_id = request.session_id.as_deref().unwrap_or(""),
        day = request.day_label
    ))]
    pub async fn run(&self, request: &UploadRequest) -> Result<PipelineResult, PipelineError> {
        let mut run = Run {
            notifier: ProgressNotifier::new(
                Arc::clone(&self.emitter),
                request.session_id.as_deref(),
            ),
            tracker: ProgressTracker::new(),
            weights: &self.weights,
        };

        run.emit(
            codes::VIDEO_PROCESSING_START,
            "Video upload started...",
            self.weights.start,
        );

        let transform_request = TransformRequest {
            source_path: request.source_path.clone(),
            day_label: request.day_label,
        };
        let transformed = {
            let run = &mut run;
            let mut on_progress = |p: f64| {
                let target = run.weights.transform_progress(p);
                run.emit(
                    codes::VIDEO_PROCESSING_PROGRESS,
                    format!("Processing video...{}%", clamp_percent(p).round()),
                    target,
                );
            };
            self.transform
                .transform(&transform_request, &mut on_progress)
                .await
        };

        let output = match transformed {
            Ok(output) => output,
            Err(e) => {
                tracing::error!(error = %e, "Video transform failed");
                run.emit(codes::ERROR, format!("Upload failed: {}", e), 100.0);
                return Err(PipelineError::TransformFailure(e));
            }
        };

        let preview_url = format!("{}/{}", self.preview_base_url, output.file_name);
        run.emit(
            codes::VIDEO_PROCESSING_FINISHED,
            "Video processing finished!",
            self.weights.transform_end,
        );
        tracing::info!(artifact = %output.file_name, "Video transform finished");

        let publish_request = PublishRequest {
            artifact_path: output.artifact_path.clone(),
            title: request.title(),
            day_label: request.day_label,
        };

        let mut outcomes = Vec::with_capacity(PlatformName::ALL.len());
        let mut slice_start = self.weights.transform_end;
        for platform in PlatformName::ALL {
            let slice_end = slice_start + self.weights.weight(platform);
            let outcome = if request.is_requested(platform) {
                self.publish_to(&mut run, platform, &publish_request, slice_start)
                    .await
            } else {
                run.emit(
                    codes::upload_skipped(platform),
                    format!("{} upload skipped.", platform.display_name()),
                    slice_end,
                );
                PlatformOutcome::skipped(platform)
            };
            outcomes.push(outcome);
            slice_start = slice_end;
        }

        let results = serde_json::to_value(&outcomes).unwrap_or(Value::Null);
        run.emit_with(
            ProgressEvent::new(codes::COMPLETED, "All uploads finished!", 100.0)
                .with_extra("results", results),
        );
        tracing::info!(?outcomes, "Upload run completed");

        Ok(PipelineResult {
            outcomes,
            preview_url,
            artifact_path: output.artifact_path,
        })
    }

    /// Publish to one requested platform inside its progress slice.
    async fn publish_to(
        &self,
        run: &mut Run<'_>,
        platform: PlatformName,
        request: &PublishRequest,
        slice_start: f64,
    ) -> PlatformOutcome {
        let weight = self.weights.weight(platform);
        let slice_end = slice_start + weight;
        let name = platform.display_name();

        run.emit(
            codes::upload_start(platform),
            format!("{} upload started...", name),
            slice_start,
        );

        let result = match self.publishers.get(platform) {
            Some(publisher) => {
                let mut on_progress = |p: f64| {
                    run.emit(
                        codes::upload_progress(platform),
                        format!("Uploading to {}...{}%", name, clamp_percent(p).round()),
                        slice_start + clamp_percent(p) * weight / 100.0,
                    );
                };
                publisher.publish(request, &mut on_progress).await
            }
            None => {
                tracing::warn!(platform = %platform, "No publisher registered");
                Err(dayclip_platforms::PublishError::NotImplemented(platform))
            }
        };

        match result {
            Ok(receipt) => {
                tracing::info!(platform = %platform, video_id = ?receipt.video_id, "Publish finished");
                run.emit_with(finished_event(platform, &receipt, slice_end));
                PlatformOutcome::finished(platform)
            }
            Err(e) => {
                tracing::warn!(platform = %platform, error = %e, "Publish failed, skipping platform");
                run.emit(
                    codes::upload_skipped(platform),
                    format!("{} upload skipped", name),
                    slice_end,
                );
                PlatformOutcome::skipped(platform)
            }
        }
    }
}

fn finished_event(platform: PlatformName, receipt: &PublishReceipt, progress: f64) -> ProgressEvent {
    let event = ProgressEvent::new(
        codes::upload_finished(platform),
        format!("{} upload finished!", platform.display_name()),
        progress,
    );
    match &receipt.url {
        Some(url) => event.with_extra("url", Value::String(url.clone())),
        None => event,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::RecordingEmitter;
    use async_trait::async_trait;
    use dayclip_core::{ProgressFn, PublishStatus};
    use dayclip_platforms::{PlatformPublisher, PublishError};
    use dayclip_processing::{TransformError, TransformOutput};
    use std::collections::BTreeSet;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SESSION: &str = "session-1";

    struct FakeTransform {
        fail: bool,
        steps: Vec<f64>,
    }

    #[async_trait]
    impl MediaTransform for FakeTransform {
        async fn transform(
            &self,
            _request: &TransformRequest,
            on_progress: ProgressFn<'_>,
        ) -> Result<TransformOutput, TransformError> {
            for step in &self.steps {
                on_progress(*step);
            }
            if self.fail {
                return Err(TransformError::Probe("corrupt input".to_string()));
            }
            Ok(TransformOutput {
                artifact_path: PathBuf::from("processed/out.mp4"),
                file_name: "out.mp4".to_string(),
            })
        }
    }

    #[derive(Debug)]
    struct FakePublisher {
        platform: PlatformName,
        fail: bool,
        steps: Vec<f64>,
        calls: AtomicUsize,
    }

    impl FakePublisher {
        fn new(platform: PlatformName, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                platform,
                fail,
                steps: vec![0.0, 50.0, 100.0],
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PlatformPublisher for FakePublisher {
        fn platform(&self) -> PlatformName {
            self.platform
        }

        async fn publish(
            &self,
            _request: &PublishRequest,
            on_progress: ProgressFn<'_>,
        ) -> Result<PublishReceipt, PublishError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            for step in &self.steps {
                on_progress(*step);
            }
            if self.fail {
                return Err(PublishError::missing_credentials(self.platform, "no token"));
            }
            Ok(PublishReceipt {
                video_id: Some("vid".to_string()),
                url: Some("https://youtube.com/shorts/vid".to_string()),
            })
        }
    }

    fn request(platforms: &[PlatformName]) -> UploadRequest {
        UploadRequest {
            source_path: PathBuf::from("uploads/source"),
            day_label: 5,
            requested_platforms: platforms.iter().copied().collect::<BTreeSet<_>>(),
            session_id: Some(SESSION.to_string()),
        }
    }

    fn pipeline(
        transform: FakeTransform,
        publishers: Vec<Arc<FakePublisher>>,
        recorder: Arc<RecordingEmitter>,
    ) -> UploadPipeline {
        let mut registry = PublisherRegistry::new();
        for publisher in publishers {
            registry.register(publisher);
        }
        UploadPipeline::new(
            Arc::new(transform),
            registry,
            recorder,
            StageWeights::default(),
            "http://localhost:5000/upload/preview/",
        )
    }

    fn ok_transform() -> FakeTransform {
        FakeTransform {
            fail: false,
            steps: vec![0.0, 25.0, 50.0, 99.0, 100.0],
        }
    }

    fn progress_of(recorder: &RecordingEmitter) -> Vec<f64> {
        recorder
            .events_for(SESSION)
            .into_iter()
            .map(|e| e.progress)
            .collect()
    }

    fn assert_monotonic_to_100(progress: &[f64]) {
        assert!(progress.windows(2).all(|w| w[0] <= w[1]), "{:?}", progress);
        assert_eq!(progress.last(), Some(&100.0));
    }

    #[tokio::test]
    async fn test_youtube_only_success() {
        let recorder = Arc::new(RecordingEmitter::default());
        let youtube = FakePublisher::new(PlatformName::Youtube, false);
        let pipeline = pipeline(ok_transform(), vec![youtube.clone()], recorder.clone());

        let result = pipeline
            .run(&request(&[PlatformName::Youtube]))
            .await
            .expect("run");

        assert_eq!(
            result.outcomes,
            vec![
                PlatformOutcome::finished(PlatformName::Youtube),
                PlatformOutcome::skipped(PlatformName::Instagram),
                PlatformOutcome::skipped(PlatformName::Tiktok),
            ]
        );
        assert_eq!(
            result.preview_url,
            "http://localhost:5000/upload/preview/out.mp4"
        );
        assert_eq!(youtube.calls.load(Ordering::SeqCst), 1);

        assert_eq!(
            recorder.codes_for(SESSION),
            vec![
                "video-processing-start",
                "video-processing-progress",
                "video-processing-progress",
                "video-processing-progress",
                "video-processing-progress",
                "video-processing-progress",
                "video-processing-finished",
                "upload-youtube-start",
                "upload-youtube-progress",
                "upload-youtube-progress",
                "upload-youtube-progress",
                "upload-youtube-finished",
                "upload-instagram-skipped",
                "upload-tiktok-skipped",
                "completed",
            ]
        );
        assert_eq!(
            progress_of(&recorder),
            vec![
                10.0, 10.0, 20.0, 30.0, 49.6, 50.0, 50.0, 50.0, 50.0, 57.5, 65.0, 65.0, 80.0,
                95.0, 100.0
            ]
        );

        let events = recorder.events_for(SESSION);
        let finished = &events[11];
        assert_eq!(
            finished.extra.get("url"),
            Some(&Value::String("https://youtube.com/shorts/vid".to_string()))
        );
        let completed = events.last().expect("completed");
        assert_eq!(
            completed.extra.get("results"),
            Some(&serde_json::json!([
                {"platform": "youtube", "status": "finished"},
                {"platform": "instagram", "status": "skipped"},
                {"platform": "tiktok", "status": "skipped"},
            ]))
        );
    }

    #[tokio::test]
    async fn test_youtube_failure_is_skipped() {
        let recorder = Arc::new(RecordingEmitter::default());
        let pipeline = pipeline(
            ok_transform(),
            vec![FakePublisher::new(PlatformName::Youtube, true)],
            recorder.clone(),
        );

        let result = pipeline
            .run(&request(&[PlatformName::Youtube]))
            .await
            .expect("publish failures never fail the run");

        assert!(result
            .outcomes
            .iter()
            .all(|o| o.status == PublishStatus::Skipped));
        let codes = recorder.codes_for(SESSION);
        assert!(codes.contains(&"upload-youtube-skipped".to_string()));
        assert!(!codes.contains(&"upload-youtube-finished".to_string()));
        assert_monotonic_to_100(&progress_of(&recorder));
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_later_platforms() {
        let recorder = Arc::new(RecordingEmitter::default());
        let tiktok = FakePublisher::new(PlatformName::Tiktok, false);
        let pipeline = pipeline(
            ok_transform(),
            vec![
                FakePublisher::new(PlatformName::Youtube, true),
                FakePublisher::new(PlatformName::Instagram, true),
                tiktok.clone(),
            ],
            recorder.clone(),
        );

        let result = pipeline
            .run(&request(&PlatformName::ALL))
            .await
            .expect("run");

        assert_eq!(
            result.outcomes,
            vec![
                PlatformOutcome::skipped(PlatformName::Youtube),
                PlatformOutcome::skipped(PlatformName::Instagram),
                PlatformOutcome::finished(PlatformName::Tiktok),
            ]
        );
        assert_eq!(tiktok.calls.load(Ordering::SeqCst), 1);
        assert_monotonic_to_100(&progress_of(&recorder));
    }

    #[tokio::test]
    async fn test_every_platform_subset_yields_three_ordered_outcomes() {
        for mask in 0u8..8 {
            let selected: Vec<PlatformName> = PlatformName::ALL
                .into_iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, p)| p)
                .collect();

            let recorder = Arc::new(RecordingEmitter::default());
            let publishers = PlatformName::ALL
                .into_iter()
                .map(|p| FakePublisher::new(p, false))
                .collect::<Vec<_>>();
            let pipeline = pipeline(ok_transform(), publishers.clone(), recorder.clone());

            let result = pipeline.run(&request(&selected)).await.expect("run");

            let platforms: Vec<_> = result.outcomes.iter().map(|o| o.platform).collect();
            assert_eq!(platforms, PlatformName::ALL.to_vec());
            for (outcome, publisher) in result.outcomes.iter().zip(&publishers) {
                let requested = selected.contains(&outcome.platform);
                let expected = if requested {
                    PublishStatus::Finished
                } else {
                    PublishStatus::Skipped
                };
                assert_eq!(outcome.status, expected);
                assert_eq!(
                    publisher.calls.load(Ordering::SeqCst),
                    usize::from(requested)
                );
            }
            assert_monotonic_to_100(&progress_of(&recorder));
        }
    }

    #[tokio::test]
    async fn test_transform_failure_is_fatal() {
        let recorder = Arc::new(RecordingEmitter::default());
        let youtube = FakePublisher::new(PlatformName::Youtube, false);
        let pipeline = pipeline(
            FakeTransform {
                fail: true,
                steps: vec![10.0],
            },
            vec![youtube.clone()],
            recorder.clone(),
        );

        let err = pipeline
            .run(&request(&[PlatformName::Youtube]))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::TransformFailure(_)));
        assert_eq!(youtube.calls.load(Ordering::SeqCst), 0);

        let events = recorder.events_for(SESSION);
        let last = events.last().expect("events");
        assert_eq!(last.code, "error");
        assert_eq!(last.progress, 100.0);
        assert!(events
            .iter()
            .all(|e| !e.code.starts_with("upload-") && e.code != "completed"));
    }

    #[tokio::test]
    async fn test_out_of_range_stage_progress_is_clamped() {
        let recorder = Arc::new(RecordingEmitter::default());
        let pipeline = pipeline(
            FakeTransform {
                fail: false,
                steps: vec![80.0, 40.0, 250.0, -3.0, f64::NAN],
            },
            vec![],
            recorder.clone(),
        );

        pipeline.run(&request(&[])).await.expect("run");

        let progress = progress_of(&recorder);
        assert_eq!(&progress[..6], &[10.0, 42.0, 42.0, 50.0, 50.0, 50.0]);
        assert_monotonic_to_100(&progress);
    }

    #[tokio::test]
    async fn test_requested_platform_without_publisher_is_skipped() {
        let recorder = Arc::new(RecordingEmitter::default());
        let pipeline = pipeline(ok_transform(), vec![], recorder.clone());

        let result = pipeline
            .run(&request(&[PlatformName::Instagram]))
            .await
            .expect("run");

        assert_eq!(
            result.outcomes[1],
            PlatformOutcome::skipped(PlatformName::Instagram)
        );
        let codes = recorder.codes_for(SESSION);
        assert!(codes.contains(&"upload-instagram-start".to_string()));
        assert!(codes.contains(&"upload-instagram-skipped".to_string()));
    }

    #[tokio::test]
    async fn test_no_session_emits_nothing() {
        let recorder = Arc::new(RecordingEmitter::default());
        let pipeline = pipeline(ok_transform(), vec![], recorder.clone());
        let mut request = request(&[]);
        request.session_id = None;

        let result = pipeline.run(&request).await.expect("run");
        assert_eq!(result.outcomes.len(), 3);
        assert!(recorder.events().is_empty());
    }
}
