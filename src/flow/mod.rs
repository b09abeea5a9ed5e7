pub mod action;
pub mod conversion;
pub mod definition;
pub mod document;
pub mod node;

pub use action::*;
pub use conversion::*;
pub use definition::*;
pub use document::*;
pub use node::*;
