//! Parse every content unit and report the ones left out

use anyhow::Result;

use crate::content::BuildReport;
use crate::Blog;

/// Format a build report for the terminal
pub fn summary(report: &BuildReport) -> String {
    let mut out = format!("{} posts indexed\n", report.posts);

    if !report.rejected.is_empty() {
        out.push_str(&format!("Excluded ({}):\n", report.rejected.len()));
        for rejected in &report.rejected {
            out.push_str(&format!("  {}: {}\n", rejected.source, rejected.reason));
        }
    }
    if !report.collisions.is_empty() {
        out.push_str(&format!("Slug collisions ({}):\n", report.collisions.len()));
        for rejected in &report.collisions {
            out.push_str(&format!("  {}: {}\n", rejected.source, rejected.reason));
        }
    }

    out
}

/// Run the check command; fails when any unit was excluded
pub fn run(blog: &Blog) -> Result<()> {
    let (_, report) = blog.library().check()?;
    print!("{}", summary(&report));

    let excluded = report.rejected.len() + report.collisions.len();
    if excluded > 0 {
        anyhow::bail!("{} content units excluded", excluded);
    }
    Ok(())
}
