// Document model, YAML loading, and the tag filter.
// The filter is pure; loading is the only part that touches the filesystem.

pub mod filter;
pub mod loader;
pub mod node;
pub mod tags;

pub use filter::{filter_document, FilterError};
pub use loader::{load_path, load_str, LoadError};
pub use node::{Map, Node};
pub use tags::TagSet;
