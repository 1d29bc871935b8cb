// Document text extraction

pub mod provider;
pub mod azure_document;

pub use provider::*;
pub use azure_document::AzureDocumentAdapter;
