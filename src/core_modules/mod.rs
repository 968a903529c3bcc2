pub mod band_selector;
pub mod block;
pub mod block_classifier;
pub mod block_sampler;
pub mod calibration;
pub mod gray_matrix;
pub mod histogram;
pub mod overlay;
pub mod utils;
