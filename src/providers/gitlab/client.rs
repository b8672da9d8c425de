mod core;
pub mod pipelines;
pub mod registry;

pub use self::core::GitLabClient;
