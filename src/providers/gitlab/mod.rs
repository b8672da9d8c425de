mod client;
mod provider;
mod types;

#[cfg(test)]
pub mod fixtures;

pub use provider::GitLabProvider;
