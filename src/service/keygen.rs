//! Storage Key Generation
//!
//! Uploaded files are stored under a key derived from their original name:
//!
//! ```text
//! "reports/q3 summary.pdf"  ──>  "q3 summary_1729065600123456789.pdf"
//!          │                          │              │            │
//!   directories dropped             stem      nanos since epoch   extension
//! ```
//!
//! The timestamp makes keys unique. Two calls within the same nanosecond (or a
//! clock that steps backwards) would collide, so the generator never hands out a
//! stamp lower than or equal to the previous one.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Stem used when the filename has none.
const FALLBACK_STEM: &str = "file";

/// Generates unique, path-safe storage keys from filenames.
#[derive(Debug, Default)]
pub struct KeyGenerator {
    /// Last stamp handed out (nanoseconds since the UNIX epoch)
    last_stamp: AtomicU64,
}

impl KeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates a key for `filename`.
    ///
    /// # Example
    ///
    /// ```
    /// use flashfs::service::KeyGenerator;
    ///
    /// let keys = KeyGenerator::new();
    /// let key = keys.generate("archive.tar.gz");
    ///
    /// assert!(key.starts_with("archive.tar_"));
    /// assert!(key.ends_with(".gz"));
    /// ```
    pub fn generate(&self, filename: &str) -> String {
        let (stem, ext) = split_filename(filename);
        format!("{}_{}{}", stem, self.next_stamp(), ext)
    }

    /// Returns a stamp strictly greater than every stamp returned before.
    fn next_stamp(&self) -> u64 {
        let now = unix_nanos();
        let mut last = self.last_stamp.load(Ordering::Relaxed);

        loop {
            let candidate = now.max(last + 1);
            match self.last_stamp.compare_exchange_weak(
                last,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }
}

/// Splits a filename into its stem and extension (with the leading dot).
///
/// Any directory components are discarded, so the result never contains a path
/// separator.
fn split_filename(filename: &str) -> (String, String) {
    // Treat both separators as directories regardless of platform
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let path = Path::new(base);

    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty() && s != "..")
        .unwrap_or_else(|| FALLBACK_STEM.to_string());

    (stem, ext)
}

fn unix_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_split_filename() {
        assert_eq!(
            split_filename("photo.png"),
            ("photo".to_string(), ".png".to_string())
        );
        assert_eq!(
            split_filename("archive.tar.gz"),
            ("archive.tar".to_string(), ".gz".to_string())
        );
        assert_eq!(
            split_filename("README"),
            ("README".to_string(), String::new())
        );
        assert_eq!(
            split_filename(".env"),
            (".env".to_string(), String::new())
        );
    }

    #[test]
    fn test_split_filename_strips_directories() {
        assert_eq!(
            split_filename("../../etc/passwd"),
            ("passwd".to_string(), String::new())
        );
        assert_eq!(
            split_filename("C:\\Users\\me\\notes.txt"),
            ("notes".to_string(), ".txt".to_string())
        );
        assert_eq!(
            split_filename("dir/"),
            (FALLBACK_STEM.to_string(), String::new())
        );
        assert_eq!(
            split_filename(".."),
            (FALLBACK_STEM.to_string(), String::new())
        );
    }

    #[test]
    fn test_empty_filename() {
        let keys = KeyGenerator::new();
        let key = keys.generate("");
        assert!(key.starts_with("file_"));
    }

    #[test]
    fn test_generate_preserves_extension() {
        let keys = KeyGenerator::new();
        let key = keys.generate("report.pdf");

        let (stem, rest) = key.split_once('_').unwrap();
        assert_eq!(stem, "report");
        let stamp = rest.strip_suffix(".pdf").unwrap();
        assert!(stamp.parse::<u64>().unwrap() > 0);
    }

    #[test]
    fn test_generated_keys_are_path_safe() {
        let keys = KeyGenerator::new();
        for name in ["a/b/c.txt", "..\\..\\x.bin", "/abs/path.tar.gz"] {
            let key = keys.generate(name);
            assert!(!key.contains('/'), "{}", key);
            assert!(!key.contains('\\'), "{}", key);
        }
    }

    #[test]
    fn test_stamps_strictly_increase() {
        let keys = KeyGenerator::new();
        let mut previous = 0;
        for _ in 0..1000 {
            let stamp = keys.next_stamp();
            assert!(stamp > previous);
            previous = stamp;
        }
    }

    #[test]
    fn test_concurrent_keys_are_unique() {
        use std::thread;

        let keys = Arc::new(KeyGenerator::new());
        let mut handles = vec![];

        for _ in 0..8 {
            let keys = Arc::clone(&keys);
            handles.push(thread::spawn(move || {
                (0..500)
                    .map(|_| keys.generate("same.txt"))
                    .collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for key in handle.join().unwrap() {
                assert!(seen.insert(key));
            }
        }
        assert_eq!(seen.len(), 4000);
    }
}
