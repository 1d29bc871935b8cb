// LLM abstraction layer

pub mod provider;
pub mod azure_openai;

pub use provider::*;
pub use azure_openai::AzureOpenAIAdapter;
