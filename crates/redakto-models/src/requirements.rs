//! System requirement checks for catalog models.
//!
//! Requirements look like `pattern-tagger>=1.0` or `redakto>=0.1,<2`. They are
//! checked against the components compiled into this binary.

use lazy_static::lazy_static;
use regex::Regex;
use semver::{Version, VersionReq};

lazy_static! {
    static ref REQUIREMENT: Regex =
        Regex::new(r"^\s*([A-Za-z0-9][A-Za-z0-9._-]*)\s*(.*?)\s*$").unwrap();
}

pub const PATTERN_TAGGER_VERSION: &str = "1.0.0";
pub const REMOTE_TAGGER_VERSION: &str = "1.0.0";

/// Version of a component available to models, if known.
pub fn component_version(name: &str) -> Option<&'static str> {
    match name.to_lowercase().replace('_', "-").as_str() {
        "redakto" | "redakto-models" => Some(env!("CARGO_PKG_VERSION")),
        "pattern-tagger" => Some(PATTERN_TAGGER_VERSION),
        "remote-tagger" => Some(REMOTE_TAGGER_VERSION),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Requirement {
    pub name: String,
    comparators: Vec<Comparator>,
}

#[derive(Debug, Clone, PartialEq)]
enum Comparator {
    Req(VersionReq),
    NotEqual(Version),
}

impl Requirement {
    pub fn parse(input: &str) -> Result<Self, String> {
        let caps = REQUIREMENT
            .captures(input)
            .ok_or_else(|| format!("Invalid requirement '{}'", input))?;
        let name = caps[1].to_string();
        let spec = caps[2].trim();

        let mut comparators = Vec::new();
        if !spec.is_empty() {
            for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                comparators.push(parse_comparator(part).map_err(|e| {
                    format!("Invalid version specifier '{}' in '{}': {}", part, input, e)
                })?);
            }
        }

        Ok(Self { name, comparators })
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.comparators.iter().all(|c| match c {
            Comparator::Req(req) => req.matches(version),
            Comparator::NotEqual(v) => version != v,
        })
    }
}

fn parse_comparator(part: &str) -> Result<Comparator, String> {
    let part: String = part.chars().filter(|c| !c.is_whitespace()).collect();
    let part = part.as_str();
    if let Some(v) = part.strip_prefix("!=") {
        return parse_version(v).map(Comparator::NotEqual);
    }
    let converted = if let Some(v) = part.strip_prefix("==") {
        format!("={}", parse_version(v)?)
    } else if let Some(v) = part.strip_prefix("~=") {
        compatible_release(v)?
    } else {
        part.to_string()
    };
    VersionReq::parse(&converted)
        .map(Comparator::Req)
        .map_err(|e| e.to_string())
}

/// `~=X.Y` means `>=X.Y, <X+1`; `~=X.Y.Z` means `>=X.Y.Z, <X.Y+1`.
fn compatible_release(input: &str) -> Result<String, String> {
    let lower = parse_version(input)?;
    let upper = match input.split('.').count() {
        2 => Version::new(lower.major + 1, 0, 0),
        3 => Version::new(lower.major, lower.minor + 1, 0),
        _ => return Err("compatible release needs two or three version parts".to_string()),
    };
    Ok(format!(">={}, <{}", lower, upper))
}

/// Parse a possibly shortened version (`1`, `1.2`) as semver.
fn parse_version(input: &str) -> Result<Version, String> {
    let parts = input.split('.').count();
    let padded = match parts {
        1 => format!("{}.0.0", input),
        2 => format!("{}.0", input),
        _ => input.to_string(),
    };
    Version::parse(&padded).map_err(|e| e.to_string())
}

/// True when every requirement names a known component whose version matches.
pub fn check_requirements(requirements: &[String]) -> bool {
    for raw in requirements {
        let requirement = match Requirement::parse(raw) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("{}", e);
                return false;
            }
        };

        let Some(installed) = component_version(&requirement.name) else {
            tracing::warn!("{} is not available", raw);
            return false;
        };
        let version = match Version::parse(installed) {
            Ok(v) => v,
            Err(_) => {
                tracing::error!("Could not parse version for {}", raw);
                return false;
            }
        };

        if requirement.matches(&version) {
            tracing::info!("{} {} satisfies {}", requirement.name, installed, raw);
        } else {
            tracing::warn!("{} {} does not satisfy {}", requirement.name, installed, raw);
            return false;
        }
    }
    true
}
