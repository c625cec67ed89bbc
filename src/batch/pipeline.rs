use rayon::prelude::*;

use crate::assets::WatermarkAsset;
use crate::assets::decode::{decode_image, is_supported_image};
use crate::batch::packager::BatchPackager;
use crate::encode::{encode_with, watermarked_filename};
use crate::foundation::core::Position;
use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::model::{ExportOptions, WatermarkKind, WatermarkSpec};
use crate::render::composite::Compositor;
use crate::render::surface::Surface;

/// One source file offered to the batch.
#[derive(Clone, Debug)]
pub struct BatchInput {
    /// Original file name, used to derive the output name.
    pub name: String,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
}

impl BatchInput {
    /// Pair a file name with its bytes.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Watermark settings applied to every file of a batch.
#[derive(Clone, Debug)]
pub struct BatchJob {
    /// Watermark description.
    pub spec: WatermarkSpec,
    /// Placement (single mode) or grid phase (tiling).
    pub position: Position,
    /// Shaped text or decoded image matching `spec.kind`.
    pub watermark: WatermarkAsset,
    /// Output encoding.
    pub export: ExportOptions,
}

impl BatchJob {
    /// Centered job with default export options.
    pub fn new(spec: WatermarkSpec, watermark: WatermarkAsset) -> Self {
        Self {
            spec,
            position: Position::CENTER,
            watermark,
            export: ExportOptions::default(),
        }
    }

    fn validated(&self) -> OvermarkResult<WatermarkSpec> {
        let spec = self.spec.clone().validate()?;
        self.export.validate()?;
        match (&spec.kind, &self.watermark) {
            (WatermarkKind::Text(_), WatermarkAsset::Text(_))
            | (WatermarkKind::Image(_), WatermarkAsset::Image(_)) => Ok(spec),
            _ => Err(OvermarkError::precondition(
                "batch watermark asset does not match the watermark kind",
            )),
        }
    }
}

/// Threading knobs for [`process_batch`].
#[derive(Clone, Debug, Default)]
pub struct BatchOptions {
    /// Composite files on a worker pool instead of the calling thread.
    pub parallel: bool,
    /// Worker count; `None` uses rayon's default.
    pub threads: Option<usize>,
}

impl BatchOptions {
    /// Defaults overridden by `OVERMARK_BATCH_PARALLEL` (`1`/`true`/`0`/`false`) and
    /// `OVERMARK_BATCH_THREADS` (> 0).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let parallel = std::env::var("OVERMARK_BATCH_PARALLEL")
            .ok()
            .and_then(|v| parse_flag(&v))
            .unwrap_or(defaults.parallel);
        let threads = std::env::var("OVERMARK_BATCH_THREADS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .or(defaults.threads);
        Self { parallel, threads }
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// One encoded output file.
#[derive(Clone, Debug)]
pub struct BatchOutput {
    /// Output file name (`<stem>-watermarked.<ext>`).
    pub name: String,
    /// Encoded bytes.
    pub bytes: Vec<u8>,
}

/// A file that did not make it into the package.
#[derive(Debug)]
pub struct BatchFailure {
    /// Original file name.
    pub name: String,
    /// Why it failed.
    pub error: OvermarkError,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Output names handed to the packager, in input order.
    pub succeeded: Vec<String>,
    /// Files skipped because they are not a supported image format.
    pub rejected: Vec<String>,
    /// Files that failed to decode or encode.
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// `true` when every offered file was packaged.
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty() && self.failures.is_empty()
    }
}

/// Split `inputs` into sniffed-supported images and the names of everything else.
pub fn partition_supported(inputs: &[BatchInput]) -> (Vec<&BatchInput>, Vec<String>) {
    let mut supported = Vec::with_capacity(inputs.len());
    let mut rejected = Vec::new();
    for input in inputs {
        if is_supported_image(&input.bytes) {
            supported.push(input);
        } else {
            rejected.push(input.name.clone());
        }
    }
    (supported, rejected)
}

/// Decode, composite and encode one file on a private surface.
pub fn process_file(input: &BatchInput, job: &BatchJob) -> OvermarkResult<BatchOutput> {
    let spec = job.validated()?;
    process_with(&mut Compositor::new(), input, &spec, job)
}

fn process_with(
    compositor: &mut Compositor,
    input: &BatchInput,
    spec: &WatermarkSpec,
    job: &BatchJob,
) -> OvermarkResult<BatchOutput> {
    let background = decode_image(&input.bytes)?;
    let mut surface = Surface::for_image(&background)?;
    compositor.composite(
        &mut surface,
        &background,
        spec,
        job.position,
        Some(&job.watermark),
    )?;
    let bytes = encode_with(&surface, &job.export)?;
    Ok(BatchOutput {
        name: watermarked_filename(&input.name, job.export.format),
        bytes,
    })
}

/// Watermark every supported input and hand the results to `packager` in input order.
///
/// Per-file decode/encode failures are collected in the report and do not stop the batch.
/// Invalid job settings and packager errors abort it.
#[tracing::instrument(skip_all, fields(files = inputs.len(), parallel = opts.parallel))]
pub fn process_batch(
    inputs: &[BatchInput],
    job: &BatchJob,
    opts: &BatchOptions,
    packager: &mut dyn BatchPackager,
) -> OvermarkResult<BatchReport> {
    let spec = job.validated()?;
    let (supported, rejected) = partition_supported(inputs);
    for name in &rejected {
        tracing::warn!(file = %name, "skipping unsupported file");
    }

    let results: Vec<OvermarkResult<BatchOutput>> = if opts.parallel && supported.len() > 1 {
        let pool = build_thread_pool(opts.threads)?;
        pool.install(|| {
            supported
                .par_iter()
                .map_init(Compositor::new, |compositor, input| {
                    process_with(compositor, input, &spec, job)
                })
                .collect()
        })
    } else {
        let mut compositor = Compositor::new();
        supported
            .iter()
            .map(|input| process_with(&mut compositor, input, &spec, job))
            .collect()
    };

    let mut report = BatchReport {
        rejected,
        ..BatchReport::default()
    };
    packager.begin(supported.len())?;
    for (input, result) in supported.iter().zip(results) {
        match result {
            Ok(out) => {
                packager.add_file(&out.name, &out.bytes)?;
                report.succeeded.push(out.name);
            }
            Err(error) => {
                tracing::warn!(file = %input.name, error = %error, "batch file failed");
                report.failures.push(BatchFailure {
                    name: input.name.clone(),
                    error,
                });
            }
        }
    }
    packager.finish()?;

    tracing::debug!(
        succeeded = report.succeeded.len(),
        failed = report.failures.len(),
        rejected = report.rejected.len(),
        "batch finished"
    );
    Ok(report)
}

fn build_thread_pool(threads: Option<usize>) -> OvermarkResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(OvermarkError::validation(
            "batch 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| {
            OvermarkError::Other(anyhow::anyhow!("failed to build batch thread pool: {e}"))
        })
}

#[cfg(test)]
#[path = "../../tests/unit/batch/pipeline.rs"]
mod tests;
