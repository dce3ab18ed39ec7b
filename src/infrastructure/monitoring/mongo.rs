//! MongoDB request log handler

use async_trait::async_trait;
use bson::{doc, Document};
use mongodb::{Client, Collection};
use tracing::{error, info, warn};

use super::lazy::LazyConnection;
use crate::domain::{DomainError, RequestLogHandler, RequestRecord};

/// Inserts each request record as one document into a fixed collection
#[derive(Debug)]
pub struct MongoRequestLogHandler {
    connection_string: String,
    database: String,
    collection_name: String,
    collection: LazyConnection<Collection<Document>>,
}

impl MongoRequestLogHandler {
    pub fn new(
        connection_string: impl Into<String>,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            connection_string: connection_string.into(),
            database: database.into(),
            collection_name: collection.into(),
            collection: LazyConnection::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.collection.is_connected()
    }

    async fn connect(&self) -> Result<Collection<Document>, DomainError> {
        let client = Client::with_uri_str(&self.connection_string)
            .await
            .map_err(|e| DomainError::connection("mongodb", e.to_string()))?;

        info!(
            database = %self.database,
            collection = %self.collection_name,
            "Request monitoring connected to MongoDB"
        );

        Ok(client
            .database(&self.database)
            .collection::<Document>(&self.collection_name))
    }
}

#[async_trait]
impl RequestLogHandler for MongoRequestLogHandler {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn initialize(&self) -> Result<(), DomainError> {
        self.collection
            .get_or_connect(|| self.connect())
            .await
            .map(|_| ())
    }

    async fn log_request(&self, record: &RequestRecord) {
        let Some(collection) = self.collection.get() else {
            warn!(path = %record.url_path, "MongoDB request log handler is not initialized");
            return;
        };

        if let Err(e) = collection.insert_one(record_document(record)).await {
            error!(
                collection = %self.collection_name,
                error = %e,
                "Failed to log request to MongoDB"
            );
        }
    }
}

/// Builds the stored document; the timestamp is kept as a BSON date
pub fn record_document(record: &RequestRecord) -> Document {
    doc! {
        "timestamp": bson::DateTime::from_chrono(record.timestamp),
        "method": record.method.as_str(),
        "url_path": record.url_path.as_str(),
        "full_url": record.full_url.as_str(),
        "client_ip": record.client_ip.clone(),
        "user_agent": record.user_agent.clone(),
        "hostname": record.hostname.as_str(),
        "route": record.route.as_str(),
        "response_time_ms": record.response_time_ms,
        "status_code": i32::from(record.status_code),
    }
}
