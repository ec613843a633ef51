use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Substrings that mark a path for removal when no configuration overrides them
///
/// Extension markers are plain substrings too, so `notes.txt.bak` or a directory
/// called `archive.txt-old` match `.txt`.
pub const DEFAULT_PATTERNS: &[&str] = &[
    ".txt",
    ".html",
    ".url",
    ".torrent",
    ".js",
    "快来安装",
    "福利",
    "点击观看",
    "精彩片头",
    "prpxv.mp4",
    "gif",
    "宣传图",
    "png",
    "老司机",
    "找的到",
    "星际末世",
    "AV大平台",
    "快感上腺",
    "超優質愛情動作片",
    "世界杯最方便的視頻",
    "全部免費",
    "张信哲的成功致富方法",
];

/// Classifies paths as removal candidates by literal substring containment
///
/// Matching is case-sensitive and runs against the full path string, directory
/// components included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denylist {
    patterns: Vec<String>,
}

impl Default for Denylist {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERNS.iter().copied())
    }
}

impl Denylist {
    /// Build a matcher from `patterns`. Empty patterns are dropped since they would match every path.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns = patterns
            .into_iter()
            .map(Into::into)
            .filter(|p: &String| {
                if p.is_empty() {
                    log::warn!("Ignoring empty denylist pattern");
                }
                !p.is_empty()
            })
            .collect();
        Self { patterns }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether any pattern occurs anywhere in `path`
    pub fn should_remove(&self, path: &str) -> bool {
        self.matching_pattern(path).is_some()
    }

    /// First pattern found in `path`, if any
    pub fn matching_pattern(&self, path: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|p| path.contains(p.as_str()))
            .map(String::as_str)
    }
}

/// Persisted denylist configuration (`denylist.toml` in the config directory)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenylistConfig {
    /// Substrings that mark a path for removal
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,
}

fn default_patterns() -> Vec<String> {
    DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect()
}

impl Default for DenylistConfig {
    fn default() -> Self {
        DenylistConfig {
            patterns: default_patterns(),
        }
    }
}

impl DenylistConfig {
    /// Load configuration from the config directory, falling back to the built-in list
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read denylist file: {}", path.display()))?;

        let config: DenylistConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse denylist file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to the config directory
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize denylist")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write denylist file: {}", config_path.display()))?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        crate::config::ConfigManager::denylist_config_path()
    }

    pub fn matcher(&self) -> Denylist {
        Denylist::new(self.patterns.iter().cloned())
    }
}

/// Add or remove patterns in the persisted denylist, or restore the built-in list
pub fn update_config(add: Vec<String>, remove: Vec<String>, reset: bool) -> Result<()> {
    let mut config = if reset {
        println!("{}", "Restored the built-in denylist".green());
        DenylistConfig::default()
    } else {
        DenylistConfig::load()?
    };

    for pattern in add {
        if pattern.is_empty() {
            println!("{}", "Skipping empty pattern".yellow());
            continue;
        }
        if config.patterns.contains(&pattern) {
            println!("  {} {}", "Already present:".dimmed(), pattern);
            continue;
        }
        println!("  {} {}", "Added:".green(), pattern);
        config.patterns.push(pattern);
    }

    for pattern in remove {
        let before = config.patterns.len();
        config.patterns.retain(|p| p != &pattern);
        if config.patterns.len() < before {
            println!("  {} {}", "Removed:".green(), pattern);
        } else {
            println!("  {} {}", "Not found:".yellow(), pattern);
        }
    }

    config.save()?;
    println!("{}", "Denylist saved successfully!".green().bold());

    Ok(())
}

/// Print the persisted denylist
pub fn show_config() -> Result<()> {
    let config = DenylistConfig::load()?;
    let path = DenylistConfig::config_path()?;

    println!("{}", "Current Denylist:".bold());
    println!(
        "  {}: {}",
        "Source".cyan(),
        if path.exists() {
            path.display().to_string()
        } else {
            "built-in".to_string()
        }
    );
    println!("  {}: {}", "Patterns".cyan(), config.patterns.len());
    for pattern in &config.patterns {
        println!("    {pattern}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/tmp/movie.torrent", true)]
    #[case("/tmp/readme.pdf", false)]
    #[case("/tmp/快来安装.exe", true)]
    #[case("/tmp/clip.mp4", false)]
    #[case("/tmp/prpxv.mp4", true)]
    #[case("/tmp/archive.txt-backup/data.bin", true)]
    #[case("/tmp/pngs/readme.pdf", true)]
    #[case("/tmp/Movie.TORRENT", false)]
    #[case("/tmp/全部免費/x.mkv", true)]
    fn test_default_denylist(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(Denylist::default().should_remove(path), expected);
    }

    #[test]
    fn test_matching_pattern_reports_hit() {
        let denylist = Denylist::default();
        assert_eq!(denylist.matching_pattern("/a/index.html"), Some(".html"));
        assert_eq!(denylist.matching_pattern("/a/index.pdf"), None);
    }

    #[test]
    fn test_empty_patterns_are_dropped() {
        let denylist = Denylist::new(vec!["", ".iso"]);
        assert_eq!(denylist.patterns(), &[".iso".to_string()]);
        assert!(!denylist.should_remove("/a/b.pdf"));
        assert!(denylist.should_remove("/a/b.iso"));
    }

    #[test]
    fn test_config_default_matches_builtin_list() {
        let config = DenylistConfig::default();
        assert_eq!(config.patterns.len(), DEFAULT_PATTERNS.len());
        assert_eq!(config.matcher(), Denylist::default());
    }

    #[test]
    fn test_config_serialization() {
        let config = DenylistConfig {
            patterns: vec![".iso".to_string(), "广告".to_string()],
        };

        let serialized = toml::to_string(&config).unwrap();
        assert!(serialized.contains("patterns"));

        let deserialized: DenylistConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.patterns, config.patterns);
    }

    #[test]
    fn test_load_from_file_without_patterns_uses_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("denylist.toml");
        fs::write(&path, "").unwrap();

        let config = DenylistConfig::load_from(&path).unwrap();
        assert_eq!(config.patterns.len(), DEFAULT_PATTERNS.len());
    }
}
