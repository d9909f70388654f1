//! Table configuration

/// Default message shown when there are no rows.
pub const DEFAULT_EMPTY_MESSAGE: &str = "No data available";

/// Default message shown while loading.
pub const DEFAULT_LOADING_MESSAGE: &str = "Loading...";

/// Display configuration for a [`DataTable`](super::DataTable).
///
/// # Example
///
/// ```
/// use tabula::table::TableConfig;
///
/// let config = TableConfig::default()
///     .with_empty_message("No users found")
///     .with_class_name("users");
/// assert_eq!(config.loading_message, "Loading...");
/// ```
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Shown instead of the table when the input has no rows.
    ///
    /// Default: "No data available"
    pub empty_message: String,

    /// Shown instead of the table while the host is loading data.
    ///
    /// Default: "Loading..."
    pub loading_message: String,

    /// Opaque class name carried into the view for host styling.
    pub class_name: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            empty_message: DEFAULT_EMPTY_MESSAGE.to_string(),
            loading_message: DEFAULT_LOADING_MESSAGE.to_string(),
            class_name: String::new(),
        }
    }
}

impl TableConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the empty-state message.
    pub fn with_empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    /// Sets the loading message.
    pub fn with_loading_message(mut self, message: impl Into<String>) -> Self {
        self.loading_message = message.into();
        self
    }

    /// Sets the class name.
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }
}
