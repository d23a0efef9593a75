use serde::Deserialize;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "casegen.toml";

/// Template sources for one suite: `builtin:<name>` or a file path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplatesConfig {
    #[serde(default = "default_preamble")]
    pub preamble: String,
    #[serde(default = "default_testcase")]
    pub testcase: String,
    #[serde(default = "default_postamble")]
    pub postamble: Option<String>,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            preamble: default_preamble(),
            testcase: default_testcase(),
            postamble: default_postamble(),
        }
    }
}

fn default_preamble() -> String {
    "builtin:jest/preamble".to_string()
}

fn default_testcase() -> String {
    "builtin:jest/testcase".to_string()
}

fn default_postamble() -> Option<String> {
    Some("builtin:jest/postamble".to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct CasegenConfig {
    /// Cloned repositories, laid out as `<owner>/<repo>`.
    pub repos_dir: PathBuf,
    pub diffs_dir: PathBuf,
    /// Where `<owner>/<repo>.test.js` files go. Unset means `repos_dir`.
    pub tests_dir: Option<PathBuf>,
    /// Repository summary JSON holding each repo's bot-created issues.
    pub repos_file: PathBuf,
    pub issues_csv: PathBuf,
    pub log_level: Option<String>,
    pub templates: TemplatesConfig,
}

impl Default for CasegenConfig {
    fn default() -> Self {
        Self {
            repos_dir: PathBuf::from("repos"),
            diffs_dir: PathBuf::from("diffs"),
            tests_dir: None,
            repos_file: PathBuf::from("repos.json"),
            issues_csv: PathBuf::from("issues_pre_bot.csv"),
            log_level: None,
            templates: TemplatesConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    repos_dir: Option<PathBuf>,
    #[serde(default)]
    diffs_dir: Option<PathBuf>,
    #[serde(default)]
    tests_dir: Option<PathBuf>,
    #[serde(default)]
    repos_file: Option<PathBuf>,
    #[serde(default)]
    issues_csv: Option<PathBuf>,
    #[serde(default)]
    log_level: Option<String>,
    #[serde(default)]
    templates: Option<TemplatesConfig>,
}

impl From<ConfigFile> for CasegenConfig {
    fn from(file: ConfigFile) -> Self {
        let defaults = CasegenConfig::default();
        CasegenConfig {
            repos_dir: file.repos_dir.unwrap_or(defaults.repos_dir),
            diffs_dir: file.diffs_dir.unwrap_or(defaults.diffs_dir),
            tests_dir: file.tests_dir,
            repos_file: file.repos_file.unwrap_or(defaults.repos_file),
            issues_csv: file.issues_csv.unwrap_or(defaults.issues_csv),
            log_level: file.log_level,
            templates: file.templates.unwrap_or_default(),
        }
    }
}

impl CasegenConfig {
    /// Effective suite directory: `tests_dir` if set, else the current `repos_dir`.
    pub fn tests_dir(&self) -> &Path {
        self.tests_dir.as_deref().unwrap_or(&self.repos_dir)
    }
}

fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

/// Parse config text. Missing keys take their defaults.
pub fn parse_config(contents: &str) -> Result<CasegenConfig, toml::de::Error> {
    let file: ConfigFile = toml::from_str(contents)?;
    Ok(file.into())
}

/// Load config from `path` (or `./casegen.toml`), falling back to defaults.
///
/// Runs before logging is set up, so a broken file is reported as a note
/// that the caller logs once the subscriber exists.
pub fn load_config(explicit: Option<&Path>) -> (CasegenConfig, Option<String>) {
    let path = config_path(explicit);

    let contents = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => return (CasegenConfig::default(), None),
    };

    match parse_config(&contents) {
        Ok(config) => (config, None),
        Err(e) => (
            CasegenConfig::default(),
            Some(format!(
                "ignoring invalid config {}: {}",
                path.display(),
                e.message()
            )),
        ),
    }
}
