// THEORY:
// Every analysis is independent: its own image, its own matrix, its own records. The
// batch layer exploits that by running many files at once while the pipeline itself
// stays synchronous.
//
// Shape:
// 1.  One immutable `ConcentrationPipeline` behind an `Arc`, shared by every job.
// 2.  A semaphore caps how many decode+analyse jobs run at the same time (CPU count by
//     default). Each job runs on tokio's blocking pool because decoding and sampling
//     are CPU-bound.
// 3.  Results are joined in submission order. A failing file produces a per-file error
//     and never aborts its siblings.
// 4.  Highlighted copies are named `{index}_{stem}_highlighted.png`. The input index makes
//     names unique even when two inputs share a stem, so concurrent jobs never write the
//     same file.

use crate::core_modules::overlay::{OverlayStyle, annotate};
use crate::core_modules::utils::image_io::image_io::{load_image, save_png};
use crate::error::{ScanError, ScanResult};
use crate::pipeline::{ConcentrationPipeline, Report};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Concurrency settings for multi-image runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Upper bound on concurrent analyses. `None` means one per CPU.
    pub max_concurrency: Option<usize>,
}

impl BatchConfig {
    pub fn concurrency(&self) -> usize {
        self.max_concurrency.unwrap_or_else(num_cpus::get).max(1)
    }

    pub fn validate(&self) -> ScanResult<()> {
        if self.max_concurrency == Some(0) {
            return Err(ScanError::InvalidConfig(
                "batch.max_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// The analysis of one file on disk.
#[derive(Debug, Clone, Serialize)]
pub struct ImageAnalysis {
    pub width: u32,
    pub height: u32,
    pub report: Report,
    /// Where the highlighted copy was written, if one was requested and produced.
    pub annotated: Option<PathBuf>,
}

/// Per-file result of a batch run.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: ScanResult<ImageAnalysis>,
}

/// Runs a `ConcentrationPipeline` over many files concurrently.
pub struct BatchAnalyzer {
    pipeline: Arc<ConcentrationPipeline>,
    overlay: OverlayStyle,
    limit: Arc<Semaphore>,
}

impl BatchAnalyzer {
    pub fn new(pipeline: ConcentrationPipeline, overlay: OverlayStyle, config: &BatchConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            overlay,
            limit: Arc::new(Semaphore::new(config.concurrency())),
        }
    }

    /// Analyses every path, returning outcomes in the same order as `paths`.
    pub async fn analyze_paths(
        &self,
        paths: Vec<PathBuf>,
        annotate_dir: Option<PathBuf>,
    ) -> Vec<FileOutcome> {
        let jobs = paths.into_iter().enumerate().map(|(index, path)| {
            let pipeline = Arc::clone(&self.pipeline);
            let limit = Arc::clone(&self.limit);
            let overlay = self.overlay;
            let target = annotate_dir
                .as_ref()
                .map(|dir| dir.join(annotated_file_name(index, &path)));

            async move {
                let result = match limit.acquire_owned().await {
                    Ok(permit) => {
                        let job_path = path.clone();
                        let handle = tokio::task::spawn_blocking(move || {
                            let _permit = permit;
                            analyze_file(&pipeline, &job_path, target.as_deref(), &overlay)
                        });
                        handle
                            .await
                            .unwrap_or_else(|e| Err(ScanError::Worker(e.to_string())))
                    }
                    Err(e) => Err(ScanError::Worker(e.to_string())),
                };

                if let Err(e) = &result {
                    warn!(path = %path.display(), error = %e, "analysis failed");
                }
                FileOutcome { path, result }
            }
        });

        join_all(jobs).await
    }
}

/// Decodes, analyses and optionally annotates a single file. Blocking.
///
/// The highlighted copy is written to `annotate_to` only when a region was found.
pub fn analyze_file(
    pipeline: &ConcentrationPipeline,
    path: &Path,
    annotate_to: Option<&Path>,
    overlay: &OverlayStyle,
) -> ScanResult<ImageAnalysis> {
    let loaded = load_image(path)?;
    let report = pipeline.analyze(&loaded.gray);

    let annotated = match (annotate_to, report.region()) {
        (Some(target), Some(region)) => {
            let highlighted = annotate(
                &loaded.rgb,
                region.highlighted(),
                pipeline.config().block_size,
                overlay,
            );
            save_png(target, &highlighted)?;
            info!(path = %target.display(), "wrote highlighted image");
            Some(target.to_path_buf())
        }
        _ => None,
    };

    Ok(ImageAnalysis {
        width: loaded.rgb.width(),
        height: loaded.rgb.height(),
        report,
        annotated,
    })
}

/// File name of the highlighted copy of the `index`-th input.
pub fn annotated_file_name(index: usize, source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    format!("{}_{}_highlighted.png", index, stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::utils::image_io::image_io::save_png;
    use crate::pipeline::PipelineConfig;
    use image::{Rgb, RgbImage};

    fn analyzer(max_concurrency: Option<usize>) -> BatchAnalyzer {
        let pipeline = ConcentrationPipeline::new(PipelineConfig::default()).expect("pipeline");
        BatchAnalyzer::new(
            pipeline,
            OverlayStyle::default(),
            &BatchConfig { max_concurrency },
        )
    }

    #[test]
    fn concurrency_defaults_to_cpu_count() {
        assert_eq!(BatchConfig::default().concurrency(), num_cpus::get().max(1));
        assert_eq!(BatchConfig { max_concurrency: Some(3) }.concurrency(), 3);
        assert!(BatchConfig { max_concurrency: Some(0) }.validate().is_err());
    }

    #[test]
    fn annotated_name_uses_index_and_stem() {
        assert_eq!(
            annotated_file_name(3, Path::new("plates/sample_01.jpg")),
            "3_sample_01_highlighted.png"
        );
        assert_ne!(
            annotated_file_name(0, Path::new("a/plate.png")),
            annotated_file_name(1, Path::new("b/plate.bmp"))
        );
    }

    #[tokio::test]
    async fn outcomes_keep_input_order_and_isolate_failures() {
        let dir = tempfile::tempdir().expect("temp dir");
        let dark = dir.path().join("dark.png");
        let bright = dir.path().join("bright.png");
        save_png(&dark, &RgbImage::from_pixel(32, 32, Rgb([100, 100, 100]))).expect("save");
        save_png(&bright, &RgbImage::from_pixel(32, 32, Rgb([250, 250, 250]))).expect("save");
        let missing = dir.path().join("missing.png");
        let unsupported = dir.path().join("notes.txt");

        let paths = vec![dark, missing, bright, unsupported];
        let outcomes = analyzer(Some(2)).analyze_paths(paths.clone(), None).await;

        let returned: Vec<PathBuf> = outcomes.iter().map(|o| o.path.clone()).collect();
        assert_eq!(returned, paths);

        let dark_report = &outcomes[0].result.as_ref().expect("dark analysed").report;
        assert_eq!(dark_report.region().expect("region").records.len(), 4);
        assert!(outcomes[1].result.is_err());
        assert_eq!(
            outcomes[2].result.as_ref().expect("bright analysed").report,
            Report::NoValidRegion { sampled_blocks: 4 }
        );
        assert!(matches!(
            outcomes[3].result,
            Err(ScanError::UnsupportedFormat(_))
        ));
    }

    #[tokio::test]
    async fn writes_highlighted_copy_only_for_regions() {
        let dir = tempfile::tempdir().expect("temp dir");
        let out = tempfile::tempdir().expect("out dir");
        let dark = dir.path().join("dark.png");
        let bright = dir.path().join("bright.png");
        save_png(&dark, &RgbImage::from_pixel(32, 32, Rgb([100, 100, 100]))).expect("save");
        save_png(&bright, &RgbImage::from_pixel(32, 32, Rgb([250, 250, 250]))).expect("save");

        let outcomes = analyzer(None)
            .analyze_paths(vec![dark, bright], Some(out.path().to_path_buf()))
            .await;

        let written = outcomes[0]
            .result
            .as_ref()
            .expect("dark analysed")
            .annotated
            .clone()
            .expect("annotated path");
        assert_eq!(written, out.path().join("0_dark_highlighted.png"));
        assert!(written.exists());

        let highlighted = image::open(&written).expect("open annotated").to_rgb8();
        assert_eq!(*highlighted.get_pixel(0, 0), Rgb([0, 128, 0]));

        assert!(outcomes[1].result.as_ref().expect("bright analysed").annotated.is_none());
    }

    #[tokio::test]
    async fn same_stem_inputs_get_separate_highlighted_copies() {
        let dir = tempfile::tempdir().expect("temp dir");
        let out = tempfile::tempdir().expect("out dir");
        std::fs::create_dir_all(dir.path().join("a")).expect("dir a");
        std::fs::create_dir_all(dir.path().join("b")).expect("dir b");
        let first = dir.path().join("a").join("plate.png");
        let second = dir.path().join("b").join("plate.bmp");
        save_png(&first, &RgbImage::from_pixel(32, 32, Rgb([100, 100, 100]))).expect("save");
        RgbImage::from_pixel(32, 16, Rgb([150, 150, 150]))
            .save(&second)
            .expect("save bmp");

        let outcomes = analyzer(Some(2))
            .analyze_paths(vec![first, second], Some(out.path().to_path_buf()))
            .await;

        let written: Vec<PathBuf> = outcomes
            .iter()
            .map(|o| {
                o.result
                    .as_ref()
                    .expect("analysed")
                    .annotated
                    .clone()
                    .expect("annotated path")
            })
            .collect();
        assert_eq!(
            written,
            vec![
                out.path().join("0_plate_highlighted.png"),
                out.path().join("1_plate_highlighted.png"),
            ]
        );

        let files = std::fs::read_dir(out.path()).expect("read out dir").count();
        assert_eq!(files, 2);

        // Each copy keeps its own source dimensions.
        let a = image::open(&written[0]).expect("open first").to_rgb8();
        let b = image::open(&written[1]).expect("open second").to_rgb8();
        assert_eq!(a.dimensions(), (32, 32));
        assert_eq!(b.dimensions(), (32, 16));
    }
}
