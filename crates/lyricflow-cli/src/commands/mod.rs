pub mod config;
pub mod inspect;
pub mod play;
pub mod simulate;

use std::path::Path;

use anyhow::{Context, Result};
use lyricflow_core::config::TimingConfig;
use lyricflow_core::{parse_source, Timeline};

/// Read and parse a lyrics file
pub async fn read_timeline(path: &Path, config: &TimingConfig) -> Result<Timeline> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let timeline = parse_source(path, &content, config)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(timeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_read_timeline_sniffs_content() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        // Unknown extensions are rejected before sniffing
        writeln!(file, "[00:01.00]hello").unwrap();
        assert!(read_timeline(file.path(), &TimingConfig::default()).await.is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[00:01.00]hello\n[00:03.00]world").unwrap();
        let timeline = read_timeline(file.path(), &TimingConfig::default())
            .await
            .unwrap();
        assert_eq!(timeline.timed_lines().count(), 2);
    }

    #[tokio::test]
    async fn test_read_timeline_missing_file() {
        let err = read_timeline(Path::new("/no/such/lyrics.lrc"), &TimingConfig::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
