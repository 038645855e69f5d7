//! Builder for [`Settings`]
//!
//! Overrides are applied in call order, each one replacing the previous value
//! of its field. The only exception is [`SettingsBuilder::blacklist`], which
//! appends to the current pattern list instead of replacing it.

use crate::config::types::Settings;
use crate::config::validation::validate_settings;
use crate::ConfigError;

/// Applies named overrides on top of a base [`Settings`] and validates the result
#[derive(Debug, Clone, Default)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    /// Starts from the default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing settings record (e.g. one loaded from a file)
    pub fn from_settings(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.settings.max_depth = max_depth;
        self
    }

    pub fn parallels(mut self, parallels: usize) -> Self {
        self.settings.parallels = parallels;
        self
    }

    /// Sets the per-domain delay in milliseconds
    pub fn delay_millis(mut self, delay_millis: u64) -> Self {
        self.settings.delay_millis = delay_millis;
        self
    }

    pub fn async_mode(mut self, async_mode: bool) -> Self {
        self.settings.async_mode = async_mode;
        self
    }

    /// Replaces the blacklist with `patterns`
    pub fn new_blacklist<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings.blacklist = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Appends `patterns` to the current blacklist
    pub fn blacklist<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings
            .blacklist
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn handle_links(mut self, handle_links: bool) -> Self {
        self.settings.handle_links = handle_links;
        self
    }

    /// Caps scraped text per page; 0 disables truncation
    pub fn max_scraped_data_length(mut self, length: usize) -> Self {
        self.settings.max_scraped_data_length = length;
        self
    }

    /// Validates and returns the settings
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - All field constraints hold
    /// * `Err(ConfigError::Validation)` - A constraint was violated
    pub fn build(self) -> Result<Settings, ConfigError> {
        validate_settings(&self.settings)?;
        Ok(self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BLACKLIST;

    #[test]
    fn test_defaults() {
        let settings = SettingsBuilder::new().build().unwrap();
        assert_eq!(settings.max_depth, 1);
        assert_eq!(settings.parallels, 2);
        assert_eq!(settings.delay_millis, 3);
        assert!(settings.async_mode);
        assert!(!settings.handle_links);
        assert_eq!(settings.max_scraped_data_length, 15000);
        assert_eq!(settings.blacklist.len(), DEFAULT_BLACKLIST.len());
    }

    #[test]
    fn test_later_override_wins() {
        let settings = SettingsBuilder::new()
            .max_depth(5)
            .parallels(8)
            .max_depth(2)
            .build()
            .unwrap();
        assert_eq!(settings.max_depth, 2);
        assert_eq!(settings.parallels, 8);
    }

    #[test]
    fn test_blacklist_appends() {
        let settings = SettingsBuilder::new()
            .blacklist(["admin", "cart"])
            .build()
            .unwrap();
        assert_eq!(settings.blacklist.len(), DEFAULT_BLACKLIST.len() + 2);
        assert_eq!(settings.blacklist.last().map(String::as_str), Some("cart"));
        assert!(settings.blacklist.contains(&"login".to_string()));
    }

    #[test]
    fn test_new_blacklist_replaces() {
        let settings = SettingsBuilder::new()
            .new_blacklist(["private"])
            .blacklist(["tmp"])
            .build()
            .unwrap();
        assert_eq!(settings.blacklist, vec!["private", "tmp"]);
    }

    #[test]
    fn test_zero_parallels_rejected() {
        let result = SettingsBuilder::new().parallels(0).build();
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let result = SettingsBuilder::new().blacklist([""]).build();
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_from_settings_keeps_base() {
        let base = Settings {
            max_depth: 4,
            ..Settings::default()
        };
        let settings = SettingsBuilder::from_settings(base)
            .handle_links(true)
            .build()
            .unwrap();
        assert_eq!(settings.max_depth, 4);
        assert!(settings.handle_links);
    }
}
