use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tempfile::NamedTempFile;
use todo_core::Storage;
use tracing::{debug, info};

/// Key/blob storage backed by one `<key>.json` file per key.
#[derive(Debug)]
pub struct FileStorage {
    pub data_dir: PathBuf,
}

impl FileStorage {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        info!(data_dir = %data_dir.display(), "opened datastore");
        Ok(Self { data_dir })
    }

    pub fn path_for(&self, key: &str) -> anyhow::Result<PathBuf> {
        validate_key(key)?;
        Ok(self.data_dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    #[tracing::instrument(skip(self))]
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => {
                debug!(file = %path.display(), bytes = raw.len(), "read item");
                Ok(Some(raw))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("failed reading {}", path.display())),
        }
    }

    #[tracing::instrument(skip(self, value))]
    fn set_item(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let path = self.path_for(key)?;
        write_atomic(&path, value).with_context(|| format!("failed to save {}", path.display()))
    }
}

#[tracing::instrument(skip(path, contents))]
fn write_atomic(path: &Path, contents: &str) -> anyhow::Result<()> {
    debug!(file = %path.display(), bytes = contents.len(), "writing atomically");

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(contents.as_bytes())?;
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}

fn validate_key(key: &str) -> anyhow::Result<()> {
    if key.is_empty() {
        return Err(anyhow!("storage key cannot be empty"));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(anyhow!(
            "invalid storage key: {key} (must be alphanumeric with _/-)"
        ));
    }
    Ok(())
}
