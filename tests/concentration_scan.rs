use image::{Rgb, RgbImage};
use salicyl_vision::batch::{analyze_file, annotated_file_name};
use salicyl_vision::core_modules::overlay::OverlayStyle;
use salicyl_vision::core_modules::utils::image_io::image_io::save_png;
use salicyl_vision::pipeline::{Band, BandMode, ConcentrationPipeline, PipelineConfig, Report};

/// A 64x40 plate: a 2x2 block dark spot on a mid-gray background, a bright column on the
/// right, and an 8-pixel remainder strip at the bottom that must be ignored.
fn plate() -> RgbImage {
    RgbImage::from_fn(64, 40, |x, y| {
        if y >= 32 {
            Rgb([0, 0, 0])
        } else if x >= 48 {
            Rgb([255, 255, 255])
        } else if x < 32 && y < 32 && (x / 16 + y / 16) % 2 == 0 {
            Rgb([40, 40, 40])
        } else {
            Rgb([150, 150, 150])
        }
    })
}

fn pipeline(mode: BandMode) -> ConcentrationPipeline {
    ConcentrationPipeline::new(PipelineConfig {
        band_mode: mode,
        ..PipelineConfig::default()
    })
    .expect("pipeline")
}

#[test]
fn scans_a_plate_from_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = dir.path().join("plate.png");
    save_png(&source, &plate()).expect("save plate");
    let target = dir.path().join(annotated_file_name(0, &source));

    let analysis = analyze_file(
        &pipeline(BandMode::Range),
        &source,
        Some(&target),
        &OverlayStyle::default(),
    )
    .expect("analysis");

    let Report::Region(region) = &analysis.report else {
        panic!("expected a region, got {:?}", analysis.report);
    };

    // 4 x 2 whole blocks; the bottom strip is truncated and the bright column is dropped.
    assert_eq!(region.sampled_blocks, 8);
    assert_eq!(region.records.len(), 6);

    // Gray 150 -> 0.00890 (x4), gray 40 -> 0.03894 (x2).
    assert_eq!(region.selection.mode, 0.009);
    assert_eq!(region.selection.mode_count, 4);
    assert_eq!(region.band(), Band { lower: 0.009, upper: 0.039 });
    assert_eq!(region.highlighted().len(), 6);

    let written = analysis.annotated.expect("annotated copy");
    assert_eq!(written, target);
    assert!(written.exists());
}

#[test]
fn single_mode_keeps_only_background_blocks() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = dir.path().join("plate.bmp");
    plate().save(&source).expect("save bmp");

    let analysis = analyze_file(
        &pipeline(BandMode::Single),
        &source,
        None,
        &OverlayStyle::default(),
    )
    .expect("analysis");

    let region = analysis.report.region().expect("region");
    assert_eq!(region.band(), Band { lower: 0.009, upper: 0.009 });
    let origins: Vec<(u32, u32)> = region
        .highlighted()
        .iter()
        .map(|r| (r.x(), r.y()))
        .collect();
    assert_eq!(origins, vec![(16, 0), (32, 0), (0, 16), (32, 16)]);
    assert!(analysis.annotated.is_none());
}

#[test]
fn small_image_reports_no_blocks() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = dir.path().join("thumb.png");
    save_png(&source, &RgbImage::from_pixel(12, 40, Rgb([100, 100, 100]))).expect("save");
    let target = dir.path().join("thumb_highlighted.png");

    let analysis = analyze_file(
        &pipeline(BandMode::Range),
        &source,
        Some(&target),
        &OverlayStyle::default(),
    )
    .expect("analysis");

    assert_eq!(analysis.report, Report::NoBlocks);
    assert!(analysis.annotated.is_none());
    assert!(!target.exists());
}
