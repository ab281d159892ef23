use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Collision-free output path for one extracted photo.
///
/// Base pattern: `{base}_photo_{NN}_{method}_conf{confidence}.jpg`.
/// On collision, numbered `-1..-99` variants are tried; past that an
/// opaque nanosecond suffix guarantees uniqueness without a PRNG.
pub fn unique_output_path(
    dir: &Path,
    base: &str,
    index: usize,
    method: &str,
    confidence: f32,
) -> PathBuf {
    let name = format!(
        "{base}_photo_{:02}_{method}_conf{confidence:.2}.jpg",
        index + 1
    );
    let candidate = dir.join(&name);
    if !candidate.exists() {
        return candidate;
    }

    let stem = name.strip_suffix(".jpg").unwrap_or(&name);
    for n in 1..=99u32 {
        let p = dir.join(format!("{stem}-{n}.jpg"));
        if !p.exists() {
            return p;
        }
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    dir.join(format!("{stem}-{nanos:x}.jpg"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn builds_the_base_pattern() {
        let dir = tempfile::tempdir().expect("tempdir");
        let p = unique_output_path(dir.path(), "scan01", 2, "contour", 0.874);
        assert_eq!(
            p.file_name().unwrap().to_str().unwrap(),
            "scan01_photo_03_contour_conf0.87.jpg"
        );
    }

    #[test]
    fn collision_falls_back_to_numbered_suffix() {
        let dir = tempfile::tempdir().expect("tempdir");
        let first = unique_output_path(dir.path(), "scan01", 0, "contour", 0.9);
        fs::write(&first, b"x").expect("write");
        let second = unique_output_path(dir.path(), "scan01", 0, "contour", 0.9);
        assert_ne!(first, second);
        assert_eq!(
            second.file_name().unwrap().to_str().unwrap(),
            "scan01_photo_01_contour_conf0.90-1.jpg"
        );
        fs::write(&second, b"x").expect("write");
        let third = unique_output_path(dir.path(), "scan01", 0, "contour", 0.9);
        assert_eq!(
            third.file_name().unwrap().to_str().unwrap(),
            "scan01_photo_01_contour_conf0.90-2.jpg"
        );
    }
}
