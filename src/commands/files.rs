use crate::commands::Out;
use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// A statement file in the uploads directory.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    name: String,
    path: PathBuf,
    size: u64,
    modified: DateTime<Local>,
}

impl UploadedFile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

/// The uploaded statements, most recently modified first.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Uploads(Vec<UploadedFile>);

impl Uploads {
    /// Scans the uploads directory for files with an allowed extension.
    pub(crate) async fn scan(config: &Config) -> Result<Self> {
        let mut files = Vec::new();
        let mut dir = utils::read_dir(config.uploads()).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let path = entry.path();
            if !config.is_allowed(&path) {
                continue;
            }
            let metadata = entry
                .metadata()
                .await
                .with_context(|| format!("Unable to read metadata for {}", path.display()))?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata
                .modified()
                .with_context(|| format!("Unable to read modified time of {}", path.display()))?;
            files.push(UploadedFile {
                name: entry.file_name().to_string_lossy().to_string(),
                path,
                size: metadata.len(),
                modified: modified.into(),
            });
        }

        files.sort_by(|a, b| b.modified.cmp(&a.modified).then(a.name.cmp(&b.name)));
        Ok(Self(files))
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.0
    }

    pub fn latest(&self) -> Option<&UploadedFile> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Uploads {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (ix, file) in self.0.iter().enumerate() {
            if ix > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "{}  {:>10}  {}",
                file.modified.format("%Y-%m-%d %H:%M"),
                file.size,
                file.name
            )?;
        }
        Ok(())
    }
}

/// Lists the statements in the uploads directory, most recent first.
pub async fn files(config: Config) -> Result<Out<Uploads>> {
    let uploads = Uploads::scan(&config).await?;
    let message = match uploads.len() {
        0 => String::from("No statements have been uploaded, use 'budget upload' to add one"),
        1 => String::from("1 uploaded statement"),
        n => format!("{n} uploaded statements"),
    };
    Ok(Out::new(message, uploads))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{TestEnv, COFFEE_AND_PAYROLL_CSV};
    use std::time::{Duration, SystemTime};

    #[tokio::test]
    async fn test_files_empty() {
        let env = TestEnv::new().await;
        let out = files(env.config()).await.unwrap();
        assert!(out.structure().unwrap().is_empty());
        assert!(out.message().contains("No statements"));
    }

    #[tokio::test]
    async fn test_files_sorted_by_modified() {
        let env = TestEnv::new().await;
        let uploads = env.config().uploads().to_path_buf();

        let older = uploads.join("older.CSV");
        let newer = uploads.join("newer.csv");
        std::fs::write(&older, COFFEE_AND_PAYROLL_CSV).unwrap();
        std::fs::write(&newer, COFFEE_AND_PAYROLL_CSV).unwrap();
        std::fs::write(uploads.join("notes.txt"), "ignored").unwrap();

        let an_hour_ago = SystemTime::now() - Duration::from_secs(3600);
        std::fs::File::options()
            .write(true)
            .open(&older)
            .unwrap()
            .set_modified(an_hour_ago)
            .unwrap();

        let out = files(env.config()).await.unwrap();
        let uploads = out.structure().unwrap();
        let names: Vec<&str> = uploads.files().iter().map(|f| f.name()).collect();
        assert_eq!(names, ["newer.csv", "older.CSV"]);
        assert_eq!(uploads.latest().unwrap().name(), "newer.csv");
        assert!(out.message().contains("2 uploaded statements"));
        assert!(uploads.to_string().contains("older.CSV"));
    }
}
