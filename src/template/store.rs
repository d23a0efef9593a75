use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::path::PathBuf;

use tracing::debug;

use super::builtin::builtin_template;
use super::render::{render, tokenize, Segment};
use super::TemplateError;
use crate::case::CaseRecord;
use crate::config::TemplatesConfig;

/// Prefix that selects a compiled-in template instead of a file path.
const BUILTIN_PREFIX: &str = "builtin:";
/// Prefix that takes the rest of the value as the template text itself.
const INLINE_PREFIX: &str = "inline:";

/// Where a template's text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Path(PathBuf),
    Inline(String),
    Builtin(String),
}

impl TemplateSource {
    /// Interpret a config or CLI value: `builtin:<name>`, `inline:<text>` or a file path.
    pub fn parse(spec: &str) -> Self {
        if let Some(name) = spec.strip_prefix(BUILTIN_PREFIX) {
            TemplateSource::Builtin(name.to_string())
        } else if let Some(text) = spec.strip_prefix(INLINE_PREFIX) {
            TemplateSource::Inline(text.to_string())
        } else {
            TemplateSource::Path(PathBuf::from(spec))
        }
    }
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateSource::Path(p) => write!(f, "{}", p.display()),
            TemplateSource::Inline(_) => f.write_str("<inline>"),
            TemplateSource::Builtin(name) => write!(f, "{BUILTIN_PREFIX}{name}"),
        }
    }
}

/// Immutable template text. Placeholders are only discovered when rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    origin: String,
    text: String,
}

impl Template {
    pub fn load(source: &TemplateSource) -> Result<Self, TemplateError> {
        let origin = source.to_string();
        let text = match source {
            TemplateSource::Inline(text) => text.clone(),
            TemplateSource::Builtin(name) => builtin_template(name)
                .ok_or_else(|| TemplateError::NotFound {
                    origin: origin.clone(),
                })?
                .to_string(),
            // read_to_string closes the handle before returning and rejects non-UTF-8 input
            TemplateSource::Path(path) => match std::fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(TemplateError::NotFound { origin });
                }
                Err(error) => return Err(TemplateError::Read { origin, error }),
            },
        };
        Ok(Self { origin, text })
    }

    #[cfg(test)]
    pub fn inline(text: impl Into<String>) -> Self {
        Self {
            origin: "<inline>".to_string(),
            text: text.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Names of every placeholder the template references.
    pub fn placeholders(&self) -> Result<BTreeSet<String>, TemplateError> {
        Ok(tokenize(&self.text)?
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Placeholder(name) => Some(name.to_string()),
                Segment::Literal(_) => None,
            })
            .collect())
    }
}

/// The templates that make up one generated test suite.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    pub preamble: Template,
    pub per_case: Template,
    pub postamble: Option<Template>,
}

impl TemplateSet {
    pub fn load(config: &TemplatesConfig) -> Result<Self, TemplateError> {
        let preamble = Template::load(&TemplateSource::parse(&config.preamble))?;
        let per_case = Template::load(&TemplateSource::parse(&config.testcase))?;
        let postamble = config
            .postamble
            .as_deref()
            .filter(|spec| !spec.is_empty())
            .map(|spec| Template::load(&TemplateSource::parse(spec)))
            .transpose()?;
        debug!(
            preamble = preamble.origin(),
            per_case = per_case.origin(),
            postamble = ?postamble.as_ref().map(Template::origin),
            "templates loaded"
        );
        Ok(Self {
            preamble,
            per_case,
            postamble,
        })
    }

    /// Preamble, rendered cases, then the postamble verbatim.
    pub fn render_suite(&self, cases: &[CaseRecord]) -> Result<String, TemplateError> {
        let mut out = render(&self.preamble, &self.per_case, cases)?;
        if let Some(ref post) = self.postamble {
            out.push_str(post.text());
        }
        Ok(out)
    }
}
