use std::collections::VecDeque;
use std::sync::Mutex;

use super::{LlmClient, LlmError};

/// Mock LLM client for testing: returns scripted responses and records
/// every `(model, prompt)` it receives.
///
/// Scripted responses are consumed in order; once exhausted the default
/// response is returned for every further call.
pub struct MockLlmClient {
    default_response: String,
    scripted: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            default_response: response.to_string(),
            scripted: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// A client whose every call fails with a connection error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new("")
        }
    }

    /// Queue responses returned before the default one.
    pub fn with_script<I, S>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Ok(mut queue) = self.scripted.lock() {
            queue.extend(responses.into_iter().map(Into::into));
        }
        self
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.calls().into_iter().map(|(_, prompt)| prompt).collect()
    }
}

impl LlmClient for MockLlmClient {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((model.to_string(), prompt.to_string()));
        }
        if self.fail {
            return Err(LlmError::Connection("mock".into()));
        }
        let scripted = self.scripted.lock().ok().and_then(|mut q| q.pop_front());
        Ok(scripted.unwrap_or_else(|| self.default_response.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_responses_come_first() {
        let mock = MockLlmClient::new("default").with_script(["one", "two"]);
        assert_eq!(mock.generate("m", "a").unwrap(), "one");
        assert_eq!(mock.generate("m", "b").unwrap(), "two");
        assert_eq!(mock.generate("m", "c").unwrap(), "default");
        assert_eq!(mock.prompts(), vec!["a", "b", "c"]);
    }

    #[test]
    fn failing_client_records_then_fails() {
        let mock = MockLlmClient::failing();
        assert!(matches!(
            mock.generate("m", "p"),
            Err(LlmError::Connection(_))
        ));
        assert_eq!(mock.calls().len(), 1);
    }
}
