//! Reviewer persona table.
//!
//! The registry is built and validated once at startup and shared read-only
//! (behind an `Arc`) by every document run.

use std::collections::HashSet;
use std::path::Path;

use generation_client::GenerationParams;
use serde::{Deserialize, Serialize};

use crate::domain::{AgentName, ConfigError, ConfigResult};

const DEFAULT_MAX_TOKENS: u32 = 1024;

const OUTPUT_CONTRACT: &str = "\
Return as many findings as needed, as a JSON array [{severity, comment, line}] and nothing else.
severity is one of 'high', 'medium', 'low'.
line is the 1-based line number the finding refers to (integer), or null when it cannot be pinpointed.
If you must answer with a JSON object, put the array under the key \"issues\".
There is no limit on the number of findings; list them in order of importance.";

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

/// One reviewer persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaConfig {
    pub name: AgentName,
    /// System instruction sent with every request for this persona.
    pub instruction: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl PersonaConfig {
    pub fn new(name: &str, instruction: impl Into<String>, temperature: f32) -> Self {
        Self {
            name: AgentName::from(name),
            instruction: instruction.into(),
            temperature,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PersonaFile {
    #[serde(rename = "persona", default)]
    personas: Vec<PersonaConfig>,
}

/// Validated, immutable set of personas.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaRegistry {
    personas: Vec<PersonaConfig>,
}

impl PersonaRegistry {
    /// Validate and freeze a persona list. Order is preserved.
    pub fn new(personas: Vec<PersonaConfig>) -> ConfigResult<Self> {
        if personas.is_empty() {
            return Err(ConfigError::EmptyPersonaSet);
        }

        let mut seen = HashSet::new();
        for persona in &personas {
            let name = persona.name.as_str();
            if name.trim().is_empty() {
                return Err(ConfigError::BlankPersonaName);
            }
            if !seen.insert(name) {
                return Err(ConfigError::DuplicatePersona(name.to_string()));
            }
            if persona.instruction.trim().is_empty() {
                return Err(ConfigError::BlankInstruction(name.to_string()));
            }
            if !(0.0..=2.0).contains(&persona.temperature) {
                return Err(ConfigError::InvalidTemperature {
                    name: name.to_string(),
                    value: persona.temperature,
                });
            }
        }

        Ok(Self { personas })
    }

    /// The three built-in reviewer roles.
    pub fn builtin() -> Self {
        let personas = vec![
            PersonaConfig::new(
                "engineer",
                format!(
                    "You are a senior software engineer with 15 years of experience.\n\
                     Review the user story from an implementation perspective \
                     (dependencies, complexity, Definition of Ready).\n{OUTPUT_CONTRACT}"
                ),
                0.0,
            ),
            PersonaConfig::new(
                "pdm",
                format!(
                    "You are a product manager.\n\
                     Review the user story for business value and how it ties to KPIs.\n\
                     {OUTPUT_CONTRACT}"
                ),
                0.2,
            ),
            PersonaConfig::new(
                "architect",
                format!(
                    "You are a software architect.\n\
                     Review the user story for non-functional risks \
                     (performance, availability, security).\n{OUTPUT_CONTRACT}"
                ),
                0.0,
            ),
        ];
        Self { personas }
    }

    /// Parse a TOML table of `[[persona]]` entries.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let file: PersonaFile = toml::from_str(source)?;
        Self::new(file.personas)
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PersonaConfig> {
        self.personas.iter()
    }

    pub fn names(&self) -> Vec<AgentName> {
        self.personas.iter().map(|p| p.name.clone()).collect()
    }

    pub fn get(&self, name: &AgentName) -> Option<&PersonaConfig> {
        self.personas.iter().find(|p| &p.name == name)
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    /// Always `false` for a constructed registry.
    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    /// SHA-256 hex digest of the canonical JSON form of the table.
    pub fn digest(&self) -> String {
        use sha2::Digest as _;
        let canonical = serde_json::to_vec(&self.personas).unwrap_or_default();
        hex::encode(sha2::Sha256::digest(&canonical))
    }
}
