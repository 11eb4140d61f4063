use std::path::PathBuf;

/// Archive downloaded by the binary.
pub const SOURCE_URL: &str = "http://takeda-toshiya.my.coocan.jp/alice/lp32.zip";

/// Directory, relative to the working directory, receiving the images.
pub const OUTPUT_DIR: &str = "cg";

/// Directory inside the archive holding the images. Matched case-insensitively.
pub const PATH_PREFIX: &str = "lp32/cg/";

/// Extension of the images to extract. Matched case-insensitively.
pub const EXTENSION: &str = ".gif";

/// What to download, what to keep from it and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupConfig {
    pub source_url: String,
    pub output_dir: PathBuf,
    pub path_prefix: String,
    pub extension: String,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            source_url: SOURCE_URL.to_string(),
            output_dir: PathBuf::from(OUTPUT_DIR),
            path_prefix: PATH_PREFIX.to_string(),
            extension: EXTENSION.to_string(),
        }
    }
}

impl SetupConfig {
    /// Whether an archive entry with this stored path should be extracted.
    pub fn selects(&self, entry_name: &str) -> bool {
        let name = entry_name.to_lowercase();
        name.starts_with(&self.path_prefix.to_lowercase())
            && name.ends_with(&self.extension.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_the_fixed_constants() {
        let config = SetupConfig::default();
        assert_eq!(config.source_url, SOURCE_URL);
        assert_eq!(config.output_dir, PathBuf::from("cg"));
        assert_eq!(config.path_prefix, "lp32/cg/");
        assert_eq!(config.extension, ".gif");
    }

    #[test]
    fn selects_images_under_the_prefix_in_any_case() {
        let config = SetupConfig::default();
        assert!(config.selects("lp32/cg/a.gif"));
        assert!(config.selects("LP32/CG/FOO.GIF"));
        assert!(config.selects("Lp32/Cg/sub/b.Gif"));
    }

    #[test]
    fn rejects_other_paths_and_extensions() {
        let config = SetupConfig::default();
        assert!(!config.selects("lp32/cg/"));
        assert!(!config.selects("lp32/cg/a.png"));
        assert!(!config.selects("lp32/a.gif"));
        assert!(!config.selects("cg/a.gif"));
        assert!(!config.selects("x/lp32/cg/a.gif"));
        assert!(!config.selects("lp32/cg/a.gif.bak"));
    }

    #[test]
    fn patterns_are_compared_lowercased() {
        let config = SetupConfig {
            path_prefix: "LP32/CG/".to_string(),
            extension: ".GIF".to_string(),
            ..SetupConfig::default()
        };
        assert!(config.selects("lp32/cg/a.gif"));
    }
}
