use async_trait::async_trait;
use bson::Document;
use mongodb::{Client, Database};

use crate::domain::{DomainError, LogEntry, LogSink};

/// Writes log entries into collections of one MongoDB database
#[derive(Debug, Clone)]
pub struct MongoLogSink {
    database: Database,
}

impl MongoLogSink {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub async fn connect(connection_string: &str, database: &str) -> Result<Self, DomainError> {
        let client = Client::with_uri_str(connection_string)
            .await
            .map_err(|e| DomainError::connection("mongodb", e.to_string()))?;

        Ok(Self::new(client.database(database)))
    }
}

#[async_trait]
impl LogSink for MongoLogSink {
    async fn write(&self, collection: &str, entry: &LogEntry) -> Result<(), DomainError> {
        let document = bson::to_document(entry)?;

        self.database
            .collection::<Document>(collection)
            .insert_one(document)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to insert log entry: {}", e)))?;

        Ok(())
    }
}
