pub mod backend;
pub mod registry;
pub mod tool;
pub mod tools;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use backend::{BackendError, CrawlerClient, SearchBackend};
pub use registry::{RegistryError, ToolRegistry};
pub use tool::{Tool, ToolDefinition, ToolError, ToolResult};
pub use tools::WebSearchTool;
