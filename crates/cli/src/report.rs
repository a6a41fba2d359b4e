//! Run summary

use owo_colors::OwoColorize;

/// Counters collected over one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub dry_run: bool,
    pub compressed: usize,
    pub compress_failed: usize,
    pub skipped: usize,
    pub deleted: usize,
    pub delete_failed: usize,
}

impl RunReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Whether any per-file operation failed
    pub fn has_failures(&self) -> bool {
        self.compress_failed > 0 || self.delete_failed > 0
    }

    /// Print the summary to stdout
    pub fn print(&self) {
        let prefix = if self.dry_run { "[dry-run] " } else { "" };

        if self.compressed == 0 && self.deleted == 0 && !self.has_failures() {
            println!("{}{}", prefix, "Nothing to rotate".dimmed());
            return;
        }

        println!("{}{}", prefix, "Rotation complete".green().bold());
        println!(
            "  Compressed: {}  Failed: {}  Skipped: {}",
            self.compressed.to_string().green(),
            failures(self.compress_failed),
            self.skipped.to_string().dimmed()
        );
        if self.deleted > 0 || self.delete_failed > 0 {
            println!(
                "  Deleted:    {}  Failed: {}",
                self.deleted.to_string().yellow(),
                failures(self.delete_failed)
            );
        }
    }
}

fn failures(count: usize) -> String {
    if count == 0 {
        count.to_string()
    } else {
        count.to_string().red().to_string()
    }
}
