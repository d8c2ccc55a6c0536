//! Filter definitions and the default filter set

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One saved process instance filter for one application
///
/// Serialized in camelCase, the shape persisted in preference values.
/// Fields missing from a stored entry decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterDefinition {
    /// Opaque identifier, empty until the filter is first persisted
    pub id: String,

    /// Short machine name, expected unique within an application
    pub key: String,

    /// Display label (a localization key)
    pub name: String,

    pub icon: String,

    /// Owning application
    #[validate(length(min = 1, message = "appName must not be empty"))]
    pub app_name: String,

    /// Sort field
    pub sort: String,

    /// Status predicate, empty for "any"
    pub status: String,

    /// Sort direction
    pub order: String,
}

impl FilterDefinition {
    /// Create a filter without an id
    pub fn new(key: impl Into<String>, name: impl Into<String>, app_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            app_name: app_name.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = order.into();
        self
    }

    /// Whether the store has not assigned an id yet
    pub fn is_unassigned(&self) -> bool {
        self.id.is_empty()
    }

    /// Assign a fresh id if none is set
    pub fn ensure_id(&mut self) {
        if self.is_unassigned() {
            self.id = Uuid::new_v4().to_string();
        }
    }
}

/// Template for one filter of the default set
///
/// The application name is filled in when the set is seeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultFilter {
    pub key: String,
    pub name: String,
    pub icon: String,
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default)]
    pub status: String,
    #[serde(default = "default_order")]
    pub order: String,
}

fn default_sort() -> String {
    "startDate".to_string()
}

fn default_order() -> String {
    "DESC".to_string()
}

impl DefaultFilter {
    fn builtin(key: &str, name: &str, icon: &str, status: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            sort: default_sort(),
            status: status.to_string(),
            order: default_order(),
        }
    }

    /// Instantiate this template for an application
    pub fn for_app(&self, app_name: &str) -> FilterDefinition {
        FilterDefinition::new(&*self.key, &*self.name, app_name)
            .with_icon(&*self.icon)
            .with_sort(&*self.sort)
            .with_status(&*self.status)
            .with_order(&*self.order)
    }
}

/// The built-in defaults: all, running and completed processes
pub fn builtin_default_filters() -> Vec<DefaultFilter> {
    vec![
        DefaultFilter::builtin(
            "all-processes",
            "ADF_CLOUD_PROCESS_FILTERS.ALL_PROCESSES",
            "adjust",
            "",
        ),
        DefaultFilter::builtin(
            "running-processes",
            "ADF_CLOUD_PROCESS_FILTERS.RUNNING_PROCESSES",
            "inbox",
            "RUNNING",
        ),
        DefaultFilter::builtin(
            "completed-processes",
            "ADF_CLOUD_PROCESS_FILTERS.COMPLETED_PROCESSES",
            "done",
            "COMPLETED",
        ),
    ]
}

/// Build the default filter set for an application, without ids
pub fn default_filters(app_name: &str) -> Vec<FilterDefinition> {
    builtin_default_filters()
        .iter()
        .map(|template| template.for_app(app_name))
        .collect()
}
