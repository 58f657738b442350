use serde::Deserialize;

/// Largest accepted image file, in bytes.
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 2 * 1024 * 1024;

/// Largest estimated image payload admitted in one submission, in bytes.
pub const DEFAULT_ADMISSION_CEILING: u64 = 4_718_592; // 4.5 MiB

/// Size limits applied to a submission before anything is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_image_bytes: u64,
    pub admission_ceiling: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            admission_ceiling: DEFAULT_ADMISSION_CEILING,
        }
    }
}
