//! # Requirement List Normalization
//!
//! Turns the raw lines of a `requirements.txt` style file into canonical
//! `name<op>version` or bare `name` entries that the conflict detector and the
//! installed-package registry can reason about.
//!
//! Per line, in order:
//!
//! 1. A trailing `# comment` is stripped (`#` at the start of the line or after whitespace,
//!    so `#egg=` fragments survive).
//! 2. Blank lines and pip options are skipped: `-e .`, `-r`/`-c` includes (not followed),
//!    `--index-url`, `--extra-index-url`, `--find-links` and the rest.
//! 3. VCS references (`git+https://...`, `-e git+...`) yield the repository name,
//!    preferring an explicit `#egg=` fragment.
//! 4. Direct wheel URLs yield `name==version` from the wheel filename.
//! 5. Everything else is parsed as a PEP 508 requirement. Entries whose marker is false
//!    are dropped, extras are stripped, and each specifier becomes its own entry.
//!
//! Names are lower-cased, known renamed distributions are aliased, and each version is
//! checked for PEP 440 canonical form. Entries that fail any step are dropped with a
//! `debug!` note rather than failing the whole list, and the result is deduplicated
//! in first-seen order. Normalizing an already normalized list returns it unchanged.

use bon::Builder;
use getset::Getters;
use indexmap::{IndexMap, IndexSet};
use lazy_regex::regex_is_match;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Constraint, MarkerEnvironment, Operator, Requirement, VersionOrUrl,
    wheel::{WheelFilename, is_wheel_url},
};

/// Distributions whose canonical spelling differs from the name projects write.
const DEFAULT_ALIASES: &[(&str, &str)] = &[("sam2", "SAM-2")];

const VCS_PREFIXES: &[&str] = &["git+", "hg+", "svn+", "bzr+"];

/// Normalizes requirement lines for a given environment.
///
/// ```
/// # use pyreq::{MarkerEnvironment, Normalizer};
/// let normalizer = Normalizer::builder()
///     .environment(MarkerEnvironment::builder().sys_platform("linux").build())
///     .build();
/// let lines = ["pywin32; sys_platform == 'win32'", "Pillow>=9.0  # imaging"];
/// assert_eq!(normalizer.normalize(lines), vec!["pillow>=9.0"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct Normalizer {
    /// The environment markers are evaluated against.
    #[builder(default)]
    #[serde(default)]
    environment: MarkerEnvironment,

    /// Replacement names for unversioned entries, keyed by lower-cased name.
    #[builder(default = default_aliases())]
    #[serde(default = "default_aliases")]
    aliases: IndexMap<String, String>,
}

fn default_aliases() -> IndexMap<String, String> {
    DEFAULT_ALIASES
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Normalizer {
    /// Add or replace an alias.
    pub fn with_alias(mut self, from: impl AsRef<str>, to: impl Into<String>) -> Self {
        self.aliases.insert(from.as_ref().to_lowercase(), to.into());
        self
    }

    /// Normalize a list of raw requirement lines.
    pub fn normalize<I, S>(&self, lines: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = IndexSet::new();
        for line in lines {
            entries.extend(self.normalize_line(line.as_ref()));
        }
        entries.into_iter().collect()
    }

    /// Normalize a single line into zero or more entries.
    pub fn normalize_line(&self, line: &str) -> Vec<String> {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            return Vec::new();
        }

        if let Some(target) = editable_target(line) {
            if is_vcs(target) {
                return self.vcs_entry(target);
            }
            debug!(line, "skipping local editable install");
            return Vec::new();
        }

        if line.starts_with('-') {
            debug!(line, "skipping pip option");
            return Vec::new();
        }

        if is_vcs(line) {
            return self.vcs_entry(line);
        }

        if line.starts_with("http://") || line.starts_with("https://") {
            if is_wheel_url(line) {
                return self.wheel_entry(line);
            }
            debug!(line, "skipping direct url that is not a wheel");
            return Vec::new();
        }

        self.requirement_entries(strip_requirement_options(line))
    }

    fn vcs_entry(&self, url: &str) -> Vec<String> {
        match vcs_name(url) {
            Some(name) => vec![self.alias(name)],
            None => {
                debug!(url, "no package name in vcs reference");
                Vec::new()
            }
        }
    }

    fn wheel_entry(&self, url: &str) -> Vec<String> {
        match WheelFilename::from_url(url) {
            Ok(wheel) => self.versioned(wheel.name(), &Constraint::Equal(wheel.version().clone())),
            Err(error) => {
                debug!(url, %error, "skipping unparseable wheel url");
                Vec::new()
            }
        }
    }

    fn requirement_entries(&self, line: &str) -> Vec<String> {
        let requirement = match Requirement::parse(line) {
            Ok(requirement) => requirement,
            Err(error) => {
                debug!(line, %error, "skipping unparseable requirement");
                return Vec::new();
            }
        };

        if !requirement.evaluate_marker(&self.environment) {
            debug!(line, "skipping requirement whose marker does not apply");
            return Vec::new();
        }

        match requirement.version_or_url() {
            None => vec![self.alias(requirement.name().to_lowercase())],
            Some(VersionOrUrl::Url(url)) => match WheelFilename::from_url(url) {
                Ok(wheel) => self.versioned(
                    requirement.name(),
                    &Constraint::Equal(wheel.version().clone()),
                ),
                Err(_) => vec![self.alias(requirement.name().to_lowercase())],
            },
            Some(VersionOrUrl::Specifiers(constraints)) => {
                let entries = constraints
                    .iter()
                    .flat_map(|constraint| self.versioned(requirement.name(), constraint))
                    .collect::<Vec<_>>();
                if entries.len() > 1 {
                    entries
                        .iter()
                        .flat_map(|entry| self.normalize_line(entry))
                        .collect()
                } else {
                    entries
                }
            }
        }
    }

    fn versioned(&self, name: &str, constraint: &Constraint<String>) -> Vec<String> {
        let version = constraint.version();
        let wildcard_allowed = matches!(constraint.operator(), Operator::Equal | Operator::NotEqual);
        let checked = match version.strip_suffix(".*") {
            Some(prefix) if wildcard_allowed => prefix,
            _ => version.as_str(),
        };

        if is_canonical(checked) {
            vec![format!("{}{constraint}", name.to_lowercase())]
        } else {
            debug!(name, %constraint, "dropping entry with non-canonical version");
            Vec::new()
        }
    }

    fn alias(&self, name: String) -> String {
        self.aliases
            .iter()
            .find(|(from, to)| from.eq_ignore_ascii_case(&name) || to.eq_ignore_ascii_case(&name))
            .map(|(_, to)| to.clone())
            .unwrap_or(name)
    }
}

/// Normalize requirement lines with the default alias table.
///
/// ```
/// # use pyreq::{MarkerEnvironment, normalize};
/// let env = MarkerEnvironment::from_host("3.10.12");
/// let lines = ["diffusers[torch]==0.10.2", "protobuf<5,>=4.25.3", "-e ."];
/// assert_eq!(
///     normalize(lines, &env),
///     vec!["diffusers==0.10.2", "protobuf<5", "protobuf>=4.25.3"],
/// );
/// ```
pub fn normalize<I, S>(lines: I, env: &MarkerEnvironment) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Normalizer::builder()
        .environment(env.clone())
        .build()
        .normalize(lines)
}

/// Whether a version string is in PEP 440 canonical form, optionally with a local label.
///
/// ```
/// # use pyreq::is_canonical;
/// assert!(is_canonical("1!2.0rc1.post2.dev3+cu118"));
/// assert!(!is_canonical("2.0-rc1"));
/// assert!(!is_canonical("v2.0"));
/// ```
pub fn is_canonical(version: &str) -> bool {
    regex_is_match!(
        r"^([1-9][0-9]*!)?(0|[1-9][0-9]*)(\.(0|[1-9][0-9]*))*((a|b|rc)(0|[1-9][0-9]*))?(\.post(0|[1-9][0-9]*))?(\.dev(0|[1-9][0-9]*))?(\+[a-zA-Z0-9]+(\.[a-zA-Z0-9]+)*)?$",
        version
    )
}

fn strip_comment(line: &str) -> &str {
    let mut previous = None;
    for (i, c) in line.char_indices() {
        if c == '#' && previous.is_none_or(char::is_whitespace) {
            return &line[..i];
        }
        previous = Some(c);
    }
    line
}

fn editable_target(line: &str) -> Option<&str> {
    ["--editable=", "--editable ", "-e "]
        .iter()
        .find_map(|prefix| line.strip_prefix(prefix))
        .map(str::trim)
}

fn is_vcs(target: &str) -> bool {
    let lowered = target.to_lowercase();
    VCS_PREFIXES.iter().any(|prefix| lowered.starts_with(prefix))
}

/// Derive a package name from a VCS reference.
///
/// An `#egg=name` fragment wins, cut at its first `-` or `[` to drop a version suffix
/// and extras. Otherwise the last path segment is used without `@ref` and `.git`.
/// Names that are not valid distribution identifiers yield nothing.
fn vcs_name(url: &str) -> Option<String> {
    let name = match url.split_once("#egg=") {
        Some((_, fragment)) => {
            let egg = fragment.split('&').next().unwrap_or_default();
            egg.split(['-', '[']).next().unwrap_or_default().trim()
        }
        None => {
            let reference = url.split(['#', '?']).next().unwrap_or_default();
            let reference = reference.split_once("://").map_or(reference, |(_, rest)| rest);
            let (_, path) = reference.split_once('/')?;
            let segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
            let segment = segment.split('@').next().unwrap_or_default();
            segment.strip_suffix(".git").unwrap_or(segment).trim()
        }
    };

    if regex_is_match!(r"^[A-Za-z0-9]([A-Za-z0-9._-]*[A-Za-z0-9])?$", name) {
        Some(name.to_lowercase())
    } else {
        debug!(url, name, "vcs reference does not name a valid distribution");
        None
    }
}

/// Drop pip's per-requirement options (`--hash=...`, `--config-settings ...`) and a
/// trailing line continuation, leaving the PEP 508 part of the line.
fn strip_requirement_options(line: &str) -> &str {
    let mut end = line.len();
    let mut previous = None;
    for (i, c) in line.char_indices() {
        if previous.is_some_and(char::is_whitespace) && line[i..].starts_with("--") {
            end = i;
            break;
        }
        previous = Some(c);
    }
    let line = line[..end].trim_end();
    line.strip_suffix('\\').unwrap_or(line).trim_end()
}
