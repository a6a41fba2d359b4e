//! Dated filename matching
//!
//! A rotation pattern is a case-insensitive regular expression that must
//! declare the named groups `year`, `month` and `day`. Every file it matches
//! becomes a [`DatedFile`] carrying a date-only calendar value.

use crate::snapshot::DirSnapshot;
use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Capture groups every rotation pattern has to provide
pub const REQUIRED_GROUPS: [&str; 3] = ["year", "month", "day"];

/// Default suffix recognising files produced by the compressor
pub const DEFAULT_COMPRESSED_SUFFIX: &str = r"\.xz$";

/// Pattern configuration errors
///
/// All of these are fatal: they mean the operator's pattern is wrong, not
/// that a single file should be skipped.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("Pattern /{pattern}/ does not compile: {source}")]
    Invalid {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Pattern /{pattern}/ is invalid: missing named group(s) {missing:?}")]
    MissingGroups {
        pattern: String,
        missing: Vec<&'static str>,
    },

    #[error("Pattern /{pattern}/ is invalid: group '{group}' did not capture in \"{file}\"")]
    MissingCapture {
        pattern: String,
        file: String,
        group: &'static str,
    },

    #[error("File \"{file}\" has an invalid date {year}-{month}-{day}")]
    InvalidDate {
        file: String,
        year: String,
        month: String,
        day: String,
    },
}

/// A directory entry with the calendar date taken from its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedFile {
    pub name: String,
    pub date: NaiveDate,
}

/// A file matched by the rotation pattern
pub type FileCandidate = DatedFile;

/// A file matched by the compressed pattern
pub type CompressedFileRecord = DatedFile;

/// Compiled rotation pattern
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    source: String,
    regex: Regex,
}

impl PatternMatcher {
    /// Compile a rotation pattern, checking the required groups up front
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| PatternError::Invalid {
                pattern: pattern.to_string(),
                source,
            })?;

        let declared: Vec<&str> = regex.capture_names().flatten().collect();
        let missing: Vec<&'static str> = REQUIRED_GROUPS
            .iter()
            .copied()
            .filter(|group| !declared.contains(group))
            .collect();
        if !missing.is_empty() {
            return Err(PatternError::MissingGroups {
                pattern: pattern.to_string(),
                missing,
            });
        }

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Pattern for compressed files: this pattern followed by `suffix`
    ///
    /// A trailing `$` on this pattern is dropped so the suffix can follow.
    pub fn with_suffix(&self, suffix: &str) -> Result<Self, PatternError> {
        Self::new(&format!("(?:{})(?:{})", strip_end_anchor(&self.source), suffix))
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match one file name
    ///
    /// `Ok(None)` means the name does not match and is ignored.
    pub fn match_name(&self, name: &str) -> Result<Option<DatedFile>, PatternError> {
        let Some(caps) = self.regex.captures(name) else {
            return Ok(None);
        };

        let group = |group: &'static str| {
            caps.name(group)
                .map(|m| m.as_str())
                .ok_or_else(|| PatternError::MissingCapture {
                    pattern: self.source.clone(),
                    file: name.to_string(),
                    group,
                })
        };
        let (year, month, day) = (group("year")?, group("month")?, group("day")?);

        let date = parse_date(year, month, day).ok_or_else(|| PatternError::InvalidDate {
            file: name.to_string(),
            year: year.to_string(),
            month: month.to_string(),
            day: day.to_string(),
        })?;

        Ok(Some(DatedFile {
            name: name.to_string(),
            date,
        }))
    }

    /// Match every name of a snapshot, in scan order
    ///
    /// Names also matched by `exclude` are dropped; this keeps compressed
    /// files out of the source candidates when the base pattern is unanchored.
    pub fn match_snapshot(
        &self,
        snapshot: &DirSnapshot,
        exclude: Option<&PatternMatcher>,
    ) -> Result<Vec<DatedFile>, PatternError> {
        let mut matched = Vec::new();
        for name in snapshot.names() {
            if exclude.is_some_and(|ex| ex.regex.is_match(name)) {
                continue;
            }
            if let Some(file) = self.match_name(name)? {
                matched.push(file);
            }
        }
        Ok(matched)
    }
}

/// Recognises the compressed sibling of a source file
///
/// A sibling of `name` is any entry spelled `name + rest` where `rest`
/// matches the suffix anchored at its start.
#[derive(Debug, Clone)]
pub struct CompressedSuffix {
    regex: Regex,
}

impl CompressedSuffix {
    pub fn new(suffix: &str) -> Result<Self, PatternError> {
        let anchored = format!("^(?:{})", suffix);
        let regex = RegexBuilder::new(&anchored)
            .case_insensitive(true)
            .build()
            .map_err(|source| PatternError::Invalid {
                pattern: suffix.to_string(),
                source,
            })?;
        Ok(Self { regex })
    }

    /// Whether `candidate` is a compressed sibling of `name`
    pub fn is_counterpart(&self, name: &str, candidate: &str) -> bool {
        match candidate.strip_prefix(name) {
            Some(rest) if !rest.is_empty() => self.regex.is_match(rest),
            _ => false,
        }
    }

    /// Whether the snapshot holds a compressed sibling of `name`
    pub fn has_counterpart(&self, snapshot: &DirSnapshot, name: &str) -> bool {
        let names = snapshot.names();
        // Names sharing the prefix sort contiguously right after `name`
        let start = names.partition_point(|n| n.as_str() <= name);
        names[start..]
            .iter()
            .take_while(|n| n.starts_with(name))
            .any(|n| self.is_counterpart(name, n))
    }
}

/// `pattern` without a final unescaped `$`
fn strip_end_anchor(pattern: &str) -> &str {
    let Some(body) = pattern.strip_suffix('$') else {
        return pattern;
    };
    let escapes = body.chars().rev().take_while(|c| *c == '\\').count();
    if escapes % 2 == 0 {
        body
    } else {
        pattern
    }
}

fn parse_date(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let year: i32 = year.trim().parse().ok()?;
    let month: u32 = month.trim().parse().ok()?;
    let day: u32 = day.trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
