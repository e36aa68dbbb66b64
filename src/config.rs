//! Configuration for the `Mapper`.

/// Process-wide mapping behaviour, read on every conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MapperConfig {
    /// Copy private (non-`pub`) fields as well as public ones
    pub map_unexported_fields: bool,
    /// Fail on missing profiles and shape mismatches instead of logging and
    /// leaving the destination at its zero value
    pub strict: bool,
}

impl MapperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unexported_fields(mut self, enabled: bool) -> Self {
        self.map_unexported_fields = enabled;
        self
    }

    pub fn with_strict(mut self, enabled: bool) -> Self {
        self.strict = enabled;
        self
    }
}
