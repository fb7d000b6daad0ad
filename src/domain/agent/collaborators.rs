//! Model-backed callables the orchestrator sequences

use std::fmt::Debug;

use async_trait::async_trait;

use super::{Domain, RetrievalVerdict, WorkflowError};
use crate::domain::vector_store::Document;

/// Maps free text to exactly one domain
#[async_trait]
pub trait DomainClassifier: Send + Sync + Debug {
    async fn classify(&self, text: &str) -> Result<Domain, WorkflowError>;
}

/// Judges whether documents answer a query
#[async_trait]
pub trait RetrievalValidator: Send + Sync + Debug {
    async fn validate(
        &self,
        query: &str,
        documents: &[Document],
    ) -> Result<RetrievalVerdict, WorkflowError>;
}

/// Writes the final answer from the accumulated documents
#[async_trait]
pub trait AnswerGenerator: Send + Sync + Debug {
    async fn generate(&self, query: &str, documents: &[Document]) -> Result<String, WorkflowError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Pops the next scripted item, repeating the last one forever
    fn next_scripted<T: Clone>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
        let mut queue = queue.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }

    #[derive(Debug, Default)]
    pub struct MockDomainClassifier {
        script: Mutex<VecDeque<Result<Domain, WorkflowError>>>,
        inputs: Mutex<Vec<String>>,
        delay: Option<Duration>,
    }

    impl MockDomainClassifier {
        pub fn returning(domain: Domain) -> Self {
            Self::default().then(domain)
        }

        pub fn then(self, domain: Domain) -> Self {
            self.script.lock().unwrap().push_back(Ok(domain));
            self
        }

        pub fn failing(error: WorkflowError) -> Self {
            let mock = Self::default();
            mock.script.lock().unwrap().push_back(Err(error));
            mock
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn inputs(&self) -> Vec<String> {
            self.inputs.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DomainClassifier for MockDomainClassifier {
        async fn classify(&self, text: &str) -> Result<Domain, WorkflowError> {
            self.inputs.lock().unwrap().push(text.to_string());

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            next_scripted(&self.script)
                .unwrap_or_else(|| Err(WorkflowError::classification("no scripted domain")))
        }
    }

    #[derive(Debug, Default)]
    pub struct MockRetrievalValidator {
        script: Mutex<VecDeque<Result<RetrievalVerdict, WorkflowError>>>,
        calls: Mutex<Vec<(String, usize)>>,
    }

    impl MockRetrievalValidator {
        pub fn sufficient() -> Self {
            Self::default().then(RetrievalVerdict::Sufficient)
        }

        pub fn always_refine(refined_query: &str) -> Self {
            Self::default().then(RetrievalVerdict::refine(refined_query))
        }

        pub fn then(self, verdict: RetrievalVerdict) -> Self {
            self.script.lock().unwrap().push_back(Ok(verdict));
            self
        }

        pub fn failing(error: WorkflowError) -> Self {
            let mock = Self::default();
            mock.script.lock().unwrap().push_back(Err(error));
            mock
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        /// `(query, document count)` per call
        pub fn calls(&self) -> Vec<(String, usize)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RetrievalValidator for MockRetrievalValidator {
        async fn validate(
            &self,
            query: &str,
            documents: &[Document],
        ) -> Result<RetrievalVerdict, WorkflowError> {
            self.calls
                .lock()
                .unwrap()
                .push((query.to_string(), documents.len()));

            next_scripted(&self.script).unwrap_or(Ok(RetrievalVerdict::Sufficient))
        }
    }

    #[derive(Debug)]
    pub struct MockAnswerGenerator {
        result: Result<String, WorkflowError>,
        calls: Mutex<Vec<(String, Vec<String>)>>,
        delay: Option<Duration>,
    }

    impl MockAnswerGenerator {
        pub fn answering(answer: &str) -> Self {
            Self {
                result: Ok(answer.to_string()),
                calls: Mutex::new(Vec::new()),
                delay: None,
            }
        }

        pub fn failing(error: WorkflowError) -> Self {
            Self {
                result: Err(error),
                calls: Mutex::new(Vec::new()),
                delay: None,
            }
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        /// `(query, document texts)` per call
        pub fn calls(&self) -> Vec<(String, Vec<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AnswerGenerator for MockAnswerGenerator {
        async fn generate(
            &self,
            query: &str,
            documents: &[Document],
        ) -> Result<String, WorkflowError> {
            let texts = documents.iter().map(|d| d.text().to_string()).collect();
            self.calls.lock().unwrap().push((query.to_string(), texts));

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            self.result.clone()
        }
    }
}
