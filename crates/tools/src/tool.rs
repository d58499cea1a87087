//! The tool capability seam.

use async_trait::async_trait;
use shopscout_common::Result;

/// A capability an agent can hold: invoke with input text, receive text
/// back. Structured results (listings, review snippets) are rendered to
/// text by the tool itself.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Short identifier, e.g. "web-search".
    fn name(&self) -> &str;

    /// One-line description used when listing an agent's capabilities.
    fn description(&self) -> &str;

    async fn invoke(&self, input: &str) -> Result<String>;
}

#[async_trait]
impl Tool for Box<dyn Tool> {
    fn name(&self) -> &str {
        (**self).name()
    }
    fn description(&self) -> &str {
        (**self).description()
    }
    async fn invoke(&self, input: &str) -> Result<String> {
        (**self).invoke(input).await
    }
}
