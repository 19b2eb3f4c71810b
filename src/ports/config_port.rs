//! Configuration access port trait.

/// Sectioned key/value settings. Numeric and date keys are parsed by
/// `domain::config_validation` so that bad values surface as errors.
pub trait ConfigPort {
    /// Trimmed value, `None` when the key is absent or blank.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;
}
