//! Configuration access port trait.

/// Keyed lookups into `[section] key = value` settings.
pub trait ConfigPort {
    /// Trimmed value; missing and blank keys are both `None`.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Integer value, or `default` when missing or not an integer.
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
}
