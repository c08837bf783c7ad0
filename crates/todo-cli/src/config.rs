use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow, bail};
use todo_core::Filter;
use tracing::{debug, info, warn};

const DATA_LOCATION: &str = "data.location";
const DEFAULT_FILTER: &str = "default.filter";
const COLOR: &str = "color";

/// Settings from the rc file and `--rc` overrides, keyed by dotted name.
#[derive(Debug, Clone)]
pub struct Config {
    settings: BTreeMap<String, String>,
    pub loaded_files: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let settings = [
            (DATA_LOCATION, "~/.todo"),
            (DEFAULT_FILTER, "all"),
            (COLOR, "on"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            settings,
            loaded_files: Vec::new(),
        }
    }
}

/// One meaningful line of an rc file.
#[derive(Debug, PartialEq, Eq)]
enum RcLine<'a> {
    Include(&'a str),
    Set(&'a str, &'a str),
}

fn parse_line(raw: &str) -> Option<Result<RcLine<'_>, ()>> {
    let line = raw.split_once('#').map_or(raw, |(before, _)| before).trim();
    if line.is_empty() {
        return None;
    }
    if let Some(path) = line.strip_prefix("include ") {
        return Some(Ok(RcLine::Include(path.trim())));
    }
    Some(
        line.split_once('=')
            .map(|(k, v)| RcLine::Set(k.trim(), v.trim()))
            .ok_or(()),
    )
}

impl Config {
    /// Defaults, then the rc file picked by [`locate_todorc`] if there is one.
    #[tracing::instrument(skip(todorc_override))]
    pub fn load(todorc_override: Option<&Path>) -> anyhow::Result<Self> {
        let mut cfg = Self::default();
        match locate_todorc(todorc_override) {
            Some(path) => {
                info!(todorc = %path.display(), "loading todorc");
                cfg.read_file(&path)?;
            }
            None => debug!("no todorc; using defaults"),
        }
        Ok(cfg)
    }

    pub fn apply_overrides<I>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in overrides {
            let key = key.strip_prefix("rc.").unwrap_or(&key).to_string();
            debug!(%key, %value, "rc override");
            self.settings.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    pub fn color(&self) -> anyhow::Result<bool> {
        match self.get(COLOR).map(str::to_ascii_lowercase).as_deref() {
            None | Some("on" | "yes" | "true" | "1") => Ok(true),
            Some("off" | "no" | "false" | "0") => Ok(false),
            Some(other) => Err(anyhow!("invalid color setting: {other}")),
        }
    }

    pub fn default_filter(&self) -> anyhow::Result<Filter> {
        self.get(DEFAULT_FILTER)
            .map_or(Ok(Filter::All), |raw| raw.parse::<Filter>())
            .context("invalid default.filter")
    }

    fn read_file(&mut self, path: &Path) -> anyhow::Result<()> {
        let path = expand_tilde(path);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        self.loaded_files.push(path.clone());
        let base_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

        for (idx, raw) in text.lines().enumerate() {
            match parse_line(raw) {
                None => {}
                Some(Ok(RcLine::Set(key, value))) => {
                    self.settings.insert(key.to_string(), value.to_string());
                }
                Some(Ok(RcLine::Include(include))) => {
                    let target = base_dir.join(expand_tilde(Path::new(include)));
                    if target.exists() {
                        self.read_file(&target)?;
                    } else {
                        warn!(include = %target.display(), "skipping missing include");
                    }
                }
                Some(Err(())) => {
                    bail!("invalid config line {}:{}: {raw}", path.display(), idx + 1)
                }
            }
        }
        Ok(())
    }
}

/// Where tasks live: `--data`, else `data.location`. Created when missing.
#[tracing::instrument(skip(cfg))]
pub fn resolve_data_dir(cfg: &Config, override_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    let dir = match (override_dir, cfg.get(DATA_LOCATION)) {
        (Some(dir), _) => dir.to_path_buf(),
        (None, Some(location)) => expand_tilde(Path::new(location)),
        (None, None) => dirs::home_dir()
            .context("cannot determine home directory")?
            .join(".todo"),
    };

    if !dir.exists() {
        info!(dir = %dir.display(), "creating data directory");
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    Ok(dir)
}

/// `--todorc`, else `$TODORC` (`/dev/null` turns the file off), else an
/// existing `~/.todorc`.
fn locate_todorc(override_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path.to_path_buf());
    }
    if let Ok(env) = std::env::var("TODORC") {
        return (env != "/dev/null").then(|| PathBuf::from(env));
    }
    dirs::home_dir()
        .map(|home| home.join(".todorc"))
        .filter(|candidate| candidate.exists())
}

fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}
