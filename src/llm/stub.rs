use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::core::errors::ApiError;
use crate::llm::structured::{StructuredGenerator, StructuredRequest};

type Handler = dyn Fn(&StructuredRequest) -> Result<Value, ApiError> + Send + Sync;

/// Generator double answering from a closure and recording every request.
pub(crate) struct ScriptedGenerator {
    handler: Box<Handler>,
    calls: Mutex<Vec<StructuredRequest>>,
}

impl ScriptedGenerator {
    pub(crate) fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&StructuredRequest) -> Result<Value, ApiError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn calls(&self) -> Vec<StructuredRequest> {
        self.calls.lock().expect("lock").clone()
    }

    pub(crate) fn calls_for(&self, schema_name: &str) -> Vec<StructuredRequest> {
        self.calls()
            .into_iter()
            .filter(|call| call.schema.name == schema_name)
            .collect()
    }
}

#[async_trait]
impl StructuredGenerator for ScriptedGenerator {
    async fn generate(&self, request: StructuredRequest) -> Result<Value, ApiError> {
        self.calls.lock().expect("lock").push(request.clone());
        (self.handler)(&request)
    }
}
