//! Fluent builder for `sfdx-project.json` contents in tests
//!
//! ```rust,ignore
//! let manifest = ProjectBuilder::new()
//!     .package_directory("force-app", Some("MyApp"))
//!     .dependency("Logger")
//!     .alias("Logger", "04tL")
//!     .field("plugins", json!({ "custom": true }))
//!     .build();
//! ```

use serde_json::{Map, Value, json};

#[derive(Debug, Default)]
pub struct ProjectBuilder {
    directories: Vec<Value>,
    aliases: Map<String, Value>,
    extra: Map<String, Value>,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package directory; the first one added is the default.
    pub fn package_directory(mut self, path: &str, package: Option<&str>) -> Self {
        let mut directory = json!({ "path": path, "default": self.directories.is_empty() });
        if let Some(package) = package {
            directory["package"] = json!(package);
            directory["versionName"] = json!("ver 1.0");
            directory["versionNumber"] = json!("1.0.0.NEXT");
        }
        self.directories.push(directory);
        self
    }

    /// Declare a dependency on the most recently added package directory.
    pub fn dependency(mut self, package: &str) -> Self {
        if self.directories.is_empty() {
            self = self.package_directory("force-app", None);
        }
        if let Some(directory) = self.directories.last_mut() {
            let entry = json!({ "package": package });
            match directory.get_mut("dependencies").and_then(Value::as_array_mut) {
                Some(list) => list.push(entry),
                None => directory["dependencies"] = json!([entry]),
            }
        }
        self
    }

    pub fn alias(mut self, package: &str, target: &str) -> Self {
        self.aliases.insert(package.to_string(), json!(target));
        self
    }

    /// Add an arbitrary top-level field.
    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    pub fn build_value(self) -> Value {
        let mut root = Map::new();
        root.insert("packageDirectories".to_string(), Value::Array(self.directories));
        root.insert("namespace".to_string(), json!(""));
        root.insert("sfdcLoginUrl".to_string(), json!("https://login.salesforce.com"));
        root.insert("sourceApiVersion".to_string(), json!("48.0"));
        root.extend(self.extra);
        root.insert("packageAliases".to_string(), Value::Object(self.aliases));
        Value::Object(root)
    }

    pub fn build(self) -> String {
        let mut content = serde_json::to_string_pretty(&self.build_value()).unwrap_or_default();
        content.push('\n');
        content
    }
}
