pub mod image_io {
    use crate::core_modules::gray_matrix::GrayMatrix;
    use crate::error::{ScanError, ScanResult};
    use image::{ImageEncoder, RgbImage};
    use std::path::Path;

    /// File extensions accepted for analysis.
    pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

    /// A decoded image together with its gray matrix.
    pub struct LoadedImage {
        pub rgb: RgbImage,
        pub gray: GrayMatrix,
    }

    pub fn is_supported(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                SUPPORTED_EXTENSIONS
                    .iter()
                    .any(|supported| ext.eq_ignore_ascii_case(supported))
            })
            .unwrap_or(false)
    }

    pub fn load_image(path: &Path) -> ScanResult<LoadedImage> {
        if !is_supported(path) {
            return Err(ScanError::UnsupportedFormat(path.to_path_buf()));
        }
        let rgb = image::open(path)?.to_rgb8();
        let gray = GrayMatrix::from_rgb(&rgb);
        Ok(LoadedImage { rgb, gray })
    }

    pub fn save_png(path: &Path, image: &RgbImage) -> ScanResult<()> {
        let output = std::io::BufWriter::new(std::fs::File::create(path)?);
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder.write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )?;

        Ok(())
    }
}
