//! Parse options

use serde::{Deserialize, Serialize};

/// Which top-level grammar to parse with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Script,
    Module,
}

impl SourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::Script => "script",
            SourceType::Module => "module",
        }
    }
}

/// Default limit on nested productions before the parser gives up
pub const DEFAULT_MAX_DEPTH: u32 = 256;

/// Options accepted by [`crate::parse`] and friends.
///
/// Deserializable from JSON with camelCase keys, so an options file such as
/// `{ "sourceType": "module", "loc": true }` maps directly onto this struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseOptions {
    /// Grammar used by the generic `parse` entry point
    pub source_type: SourceType,
    /// Treat the top level as strict without a directive
    pub implied_strict: bool,
    /// Disable the legacy sloppy-mode (Annex B) productions
    pub disable_web_compat: bool,
    /// Enable staged syntax (decorators, import attributes)
    pub next: bool,
    /// Attach `loc` line/column information to every node
    pub loc: bool,
    /// Attach a `range: [start, end]` pair to every node
    pub ranges: bool,
    /// Allow `return` at the top level of a script
    pub global_return: bool,
    /// File name reported in error messages
    pub source_file: Option<String>,
    /// Maximum nesting of statements and expressions
    pub max_depth: u32,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            source_type: SourceType::Script,
            implied_strict: false,
            disable_web_compat: false,
            next: false,
            loc: false,
            ranges: false,
            global_return: false,
            source_file: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module() -> Self {
        Self::default().with_source_type(SourceType::Module)
    }

    pub fn with_source_type(mut self, source_type: SourceType) -> Self {
        self.source_type = source_type;
        self
    }

    pub fn with_implied_strict(mut self, value: bool) -> Self {
        self.implied_strict = value;
        self
    }

    pub fn with_web_compat(mut self, enabled: bool) -> Self {
        self.disable_web_compat = !enabled;
        self
    }

    pub fn with_next(mut self, value: bool) -> Self {
        self.next = value;
        self
    }

    pub fn with_loc(mut self, value: bool) -> Self {
        self.loc = value;
        self
    }

    pub fn with_ranges(mut self, value: bool) -> Self {
        self.ranges = value;
        self
    }

    pub fn with_global_return(mut self, value: bool) -> Self {
        self.global_return = value;
        self
    }

    pub fn with_source_file(mut self, name: impl Into<String>) -> Self {
        self.source_file = Some(name.into());
        self
    }

    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn is_module(&self) -> bool {
        self.source_type == SourceType::Module
    }

    /// Load options from a JSON document; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
