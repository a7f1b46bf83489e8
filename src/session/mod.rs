pub mod manager;
pub mod persistence;
pub mod store;

// Re-export commonly used items
pub use manager::{EditorSession, LoadOutcome};
pub use store::LocalStore;
