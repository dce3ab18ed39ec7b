use serde::Deserialize;

use super::SeverityBucket;

/// Collection names for each severity bucket of the log store
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MongoLogConfig {
    #[serde(default = "default_info_collection")]
    pub info_collection: String,
    #[serde(default = "default_warning_collection")]
    pub warning_collection: String,
    #[serde(default = "default_error_collection")]
    pub error_collection: String,
}

impl Default for MongoLogConfig {
    fn default() -> Self {
        Self {
            info_collection: default_info_collection(),
            warning_collection: default_warning_collection(),
            error_collection: default_error_collection(),
        }
    }
}

impl MongoLogConfig {
    pub fn collection_for(&self, bucket: SeverityBucket) -> &str {
        match bucket {
            SeverityBucket::Info => &self.info_collection,
            SeverityBucket::Warning => &self.warning_collection,
            SeverityBucket::Error => &self.error_collection,
        }
    }
}

fn default_info_collection() -> String {
    "info".to_string()
}

fn default_warning_collection() -> String {
    "warning".to_string()
}

fn default_error_collection() -> String {
    "error".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_collections() {
        let config = MongoLogConfig::default();
        assert_eq!(config.collection_for(SeverityBucket::Info), "info");
        assert_eq!(config.collection_for(SeverityBucket::Warning), "warning");
        assert_eq!(config.collection_for(SeverityBucket::Error), "error");
    }

    #[test]
    fn test_partial_deserialization_keeps_defaults() {
        let config: MongoLogConfig =
            serde_json::from_str(r#"{"error_collection": "app_errors"}"#).unwrap();
        assert_eq!(config.info_collection, "info");
        assert_eq!(config.collection_for(SeverityBucket::Error), "app_errors");
    }
}
