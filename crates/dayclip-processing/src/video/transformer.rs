//! ffmpeg-backed [`MediaTransform`]: burns a "Day N" label into the clip and
//! speeds it up towards the target length.

use async_trait::async_trait;
use dayclip_core::ProgressFn;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use uuid::Uuid;

use crate::error::TransformError;
use crate::traits::{MediaTransform, TransformOutput, TransformRequest};
use crate::video::overlay::OverlayPlan;
use crate::video::processor::{validate_binary_path, validate_input_file, VideoProcessor};
use crate::video::progress::FfmpegProgressParser;

/// Number of trailing stderr lines kept for error reports.
const STDERR_TAIL_LINES: usize = 20;
/// Encoding progress is capped here until ffmpeg exits successfully.
const MAX_RUNNING_PERCENT: f64 = 99.0;

#[derive(Debug, Clone)]
pub struct DayOverlayTransformerConfig {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub font_path: String,
    pub output_dir: PathBuf,
    pub target_clip_seconds: f64,
}

#[derive(Debug, Clone)]
pub struct DayOverlayTransformer {
    config: DayOverlayTransformerConfig,
    processor: VideoProcessor,
}

impl DayOverlayTransformer {
    pub fn new(config: DayOverlayTransformerConfig) -> Result<Self, TransformError> {
        validate_binary_path(&config.ffmpeg_path)?;
        let processor = VideoProcessor::new(config.ffprobe_path.clone())?;
        Ok(Self { config, processor })
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    async fn encode(
        &self,
        input: &Path,
        output: &Path,
        plan: &OverlayPlan,
        has_audio: bool,
        on_progress: ProgressFn<'_>,
    ) -> Result<(), TransformError> {
        let args = encode_args(input, output, plan, has_audio, &self.config.font_path);

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TransformError::Spawn {
                binary: self.config.ffmpeg_path.clone(),
                source,
            })?;

        let stderr_task = child
            .stderr
            .take()
            .map(|stderr| tokio::spawn(collect_tail(stderr)));

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("ffmpeg stdout was not captured"))?;

        let mut parser = FfmpegProgressParser::new(plan.output_duration());
        let mut lines = BufReader::new(stdout).lines();
        let mut last_reported = 0.0;
        while let Some(line) = lines.next_line().await? {
            if let Some(percent) = parser.feed(&line) {
                let percent = percent.min(MAX_RUNNING_PERCENT);
                if percent > last_reported {
                    last_reported = percent;
                    on_progress(percent);
                }
            }
        }

        let status = child.wait().await?;
        let stderr = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        if !status.success() {
            return Err(TransformError::Ffmpeg {
                status: status.to_string(),
                stderr,
            });
        }

        if !parser.is_finished() {
            tracing::debug!("ffmpeg exited without a final progress report");
        }
        Ok(())
    }
}

#[async_trait]
impl MediaTransform for DayOverlayTransformer {
    #[tracing::instrument(skip(self, on_progress), fields(
        source = %request.source_path.display(),
        day = request.day_label
    ))]
    async fn transform(
        &self,
        request: &TransformRequest,
        on_progress: ProgressFn<'_>,
    ) -> Result<TransformOutput, TransformError> {
        let start = std::time::Instant::now();
        let input = validate_input_file(&request.source_path)?;

        let metadata = self.processor.extract_metadata_from_path(&input).await?;
        let plan = OverlayPlan::new(
            request.day_label,
            metadata.duration,
            self.config.target_clip_seconds,
        );

        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        let file_name = format!("{}.mp4", Uuid::new_v4());
        let artifact_path = self.config.output_dir.join(&file_name);

        tracing::info!(
            speed = plan.speed,
            source_duration = plan.source_duration,
            output_duration = plan.output_duration(),
            has_audio = metadata.has_audio,
            "Starting transform"
        );

        on_progress(0.0);
        if let Err(e) = self
            .encode(
                &input,
                &artifact_path,
                &plan,
                metadata.has_audio,
                &mut *on_progress,
            )
            .await
        {
            if let Err(remove_err) = tokio::fs::remove_file(&artifact_path).await {
                if remove_err.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        error = %remove_err,
                        path = %artifact_path.display(),
                        "Failed to remove partial artifact"
                    );
                }
            }
            return Err(e);
        }
        on_progress(100.0);

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            artifact = %file_name,
            "Transform completed"
        );

        Ok(TransformOutput {
            artifact_path,
            file_name,
        })
    }
}

/// Full ffmpeg argument list for one encode.
fn encode_args(
    input: &Path,
    output: &Path,
    plan: &OverlayPlan,
    has_audio: bool,
    font_path: &str,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-hide_banner",
        "-loglevel",
        "error",
        "-nostats",
        "-y",
        "-progress",
        "pipe:1",
        "-i",
    ]
    .iter()
    .map(OsString::from)
    .collect();
    args.push(input.as_os_str().to_owned());
    args.push("-vf".into());
    args.push(plan.video_filter(font_path).into());
    if has_audio {
        args.push("-af".into());
        args.push(plan.audio_filter().into());
    } else {
        args.push("-an".into());
    }
    args.extend(
        [
            "-c:v", "libx264", "-preset", "fast", "-crf", "23", "-c:a", "aac", "-b:a", "128k",
        ]
        .iter()
        .map(OsString::from),
    );
    args.push(output.as_os_str().to_owned());
    args
}

async fn collect_tail<R: AsyncRead + Unpin>(reader: R) -> String {
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }
    Vec::from(tail).join("\n")
}
