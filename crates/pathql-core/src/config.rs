//! Planner configuration.

/// Limits and coercion switches applied while compiling a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Maximum number of segments accepted in one path, attribute included.
    pub max_path_depth: usize,
    /// Match enum members ignoring ASCII case when no exact match exists.
    pub case_insensitive_enums: bool,
    /// Accept integer literals as enum ordinals.
    pub allow_enum_ordinals: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_path_depth: 8,
            case_insensitive_enums: true,
            allow_enum_ordinals: true,
        }
    }
}

impl PlannerConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only exact member names match enum attributes.
    pub fn strict() -> Self {
        Self {
            case_insensitive_enums: false,
            allow_enum_ordinals: false,
            ..Self::default()
        }
    }

    /// Set the maximum path depth.
    pub fn with_max_path_depth(mut self, depth: usize) -> Self {
        self.max_path_depth = depth;
        self
    }

    /// Enable or disable case-insensitive enum matching.
    pub fn with_case_insensitive_enums(mut self, enabled: bool) -> Self {
        self.case_insensitive_enums = enabled;
        self
    }

    /// Enable or disable ordinal enum matching.
    pub fn with_enum_ordinals(mut self, enabled: bool) -> Self {
        self.allow_enum_ordinals = enabled;
        self
    }
}
