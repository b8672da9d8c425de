mod exports;
mod report;
mod styling;

pub use exports::write_summary;
pub use report::{print_detail, print_outcome, print_project_header, print_summary};
use styling::{banner, dim};

/// Prints the autotrigger banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        banner("🚀 autotrigger"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Release-driven GitLab pipeline trigger")
    );
}
