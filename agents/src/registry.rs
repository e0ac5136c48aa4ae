use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

use tracing::debug;
use tracing::warn;

use crate::error::AgentParseError;
use crate::error::ParserError;
use crate::error::RegistryError;
use crate::parser::parse_agent_file;
use crate::spec::AgentSpec;

#[derive(Debug, Clone)]
struct CachedEntry {
    modified: Option<SystemTime>,
    instructions_modified: Option<SystemTime>,
    spec: AgentSpec,
}

impl CachedEntry {
    fn new(modified: Option<SystemTime>, spec: AgentSpec) -> Self {
        let instructions_modified = spec.instructions_path().and_then(get_modified_time);
        Self {
            modified,
            instructions_modified,
            spec,
        }
    }

    /// Fresh when neither the definition nor its instructions file changed.
    fn is_fresh(&self, modified: Option<SystemTime>) -> bool {
        if modified.is_none() || self.modified != modified {
            return false;
        }
        match self.spec.instructions_path() {
            Some(path) => {
                let current = get_modified_time(path);
                current.is_some() && current == self.instructions_modified
            }
            None => true,
        }
    }
}

/// Summary of one [`AgentRegistry::reload`].
#[derive(Debug, Clone, Default)]
pub struct ReloadReport {
    pub loaded: usize,
    pub errors: Vec<AgentParseError>,
}

/// Agent definitions loaded from a directory of Markdown files.
#[derive(Debug)]
pub struct AgentRegistry {
    dir: PathBuf,
    cache: HashMap<PathBuf, CachedEntry>,
    agents: BTreeMap<String, AgentSpec>,
    parse_errors: Vec<AgentParseError>,
}

impl AgentRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: HashMap::new(),
            agents: BTreeMap::new(),
            parse_errors: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Rescans the directory. Unchanged files are served from the cache;
    /// files that cannot be read or parsed are recorded and skipped. Only a
    /// failure to list the directory itself is an error; a missing
    /// directory yields an empty registry.
    pub fn reload(&mut self) -> Result<ReloadReport, RegistryError> {
        let mut agents = BTreeMap::new();
        let mut cache = HashMap::new();
        let mut parse_errors = Vec::new();

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => Some(entries),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                return Err(RegistryError::Io {
                    path: self.dir.clone(),
                    source: err,
                });
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .into_iter()
            .flatten()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(err) => {
                    parse_errors.push(AgentParseError::new(
                        self.dir.clone(),
                        format!("failed to read directory entry: {err}"),
                    ));
                    None
                }
            })
            .filter(|path| is_agent_file(path))
            .collect();
        paths.sort();

        for path in paths {
            let modified = get_modified_time(&path);
            let spec = match self.load_agent(&path, modified) {
                Ok(spec) => spec,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping invalid agent definition");
                    parse_errors.push(AgentParseError::new(path, err.to_string()));
                    continue;
                }
            };
            if agents.contains_key(spec.name()) {
                parse_errors.push(AgentParseError::new(
                    path,
                    format!("duplicate agent name `{}`", spec.name()),
                ));
                continue;
            }
            cache.insert(path, CachedEntry::new(modified, spec.clone()));
            agents.insert(spec.name.clone(), spec);
        }

        self.agents = agents;
        self.cache = cache;
        self.parse_errors = parse_errors;
        debug!(dir = %self.dir.display(), loaded = self.agents.len(), "reloaded agents");

        Ok(ReloadReport {
            loaded: self.agents.len(),
            errors: self.parse_errors.clone(),
        })
    }

    fn load_agent(
        &self,
        path: &Path,
        modified: Option<SystemTime>,
    ) -> Result<AgentSpec, ParserError> {
        if let Some(entry) = self.cache.get(path)
            && entry.is_fresh(modified)
        {
            return Ok(entry.spec.clone());
        }
        parse_agent_file(path)
    }

    pub fn agents(&self) -> impl Iterator<Item = &AgentSpec> {
        self.agents.values()
    }

    pub fn get(&self, name: &str) -> Option<&AgentSpec> {
        self.agents.get(name)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn parse_errors(&self) -> &[AgentParseError] {
        &self.parse_errors
    }
}

fn is_agent_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "md" | "markdown"))
}

fn get_modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|metadata| metadata.modified()).ok()
}
