//! CLI output formatting for all pipeline jobs.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Categories and
//! postcards lead with a positional index and their display name; filenames
//! are shown as indented context lines underneath.
//!
//! # Output Format
//!
//! ## Collect
//!
//! ```text
//! 001 Birds
//! 002 Old_Maps
//! 2 categories
//! ```
//!
//! ## Copy
//!
//! ```text
//! Copied Birds to public/
//! Copied Old_Maps to public/
//! Copied 2 categories (14 files)
//! ```
//!
//! ## Metadata
//!
//! ```text
//! Generated metadata for 2 categories with 3 postcards
//! Metadata written to src/data/metadata.json
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 Birds (2 postcards)
//!     001 eagle
//!         Front: eagle.jpg
//!         Back: eagle_001.jpg
//!     002 owl
//!         Front: owl.png
//! 002 Old Maps (1 postcard)
//!     Source: Old_Maps/
//!     001 harbor
//!         Front: harbor.jpg
//! Generated metadata for 2 categories with 3 postcards
//! ```
//!
//! ## Thumbnails / Optimize
//!
//! ```text
//! Birds (2 images)
//!     eagle.jpg
//!         thumbs/thumb_eagle.jpg: generated
//!     owl.png
//!         thumbs/thumb_owl.jpg: fresh
//! thumbnails: 1 fresh, 1 generated (2 total)
//! ```
//!
//! # Architecture
//!
//! Each job has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::catalog::Catalog;
use crate::mirror::MirrorReport;
use crate::process::{OutputStatus, ProcessEvent, ProcessResult};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 postcard`, `3 postcards`.
fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

// ============================================================================
// Collect
// ============================================================================

pub fn format_collect_output(categories: &[String]) -> Vec<String> {
    let mut lines: Vec<String> = categories
        .iter()
        .enumerate()
        .map(|(i, folder)| format!("{} {}", format_index(i + 1), folder))
        .collect();
    lines.push(category_count(categories.len()));
    lines
}

pub fn print_collect_output(categories: &[String]) {
    for line in format_collect_output(categories) {
        println!("{}", line);
    }
}

// ============================================================================
// Copy
// ============================================================================

/// One `Copied` line per category plus a total.
///
/// `publish_label` is the publish directory as the user configured it.
pub fn format_mirror_output(report: &MirrorReport, publish_label: &str) -> Vec<String> {
    let target = publish_label.trim_end_matches('/');
    let mut lines: Vec<String> = report
        .categories
        .iter()
        .map(|c| format!("Copied {} to {}/", c.folder, target))
        .collect();
    lines.push(format!(
        "Copied {} ({})",
        category_count(report.categories.len()),
        plural(report.total_files(), "file")
    ));
    lines
}

pub fn print_mirror_output(report: &MirrorReport, publish_label: &str) {
    for line in format_mirror_output(report, publish_label) {
        println!("{}", line);
    }
}

fn category_count(n: usize) -> String {
    if n == 1 {
        "1 category".to_string()
    } else {
        format!("{n} categories")
    }
}

// ============================================================================
// Metadata / Check
// ============================================================================

/// Inventory of a derived catalog.
///
/// The `Source:` line only appears when the display name differs from the
/// folder. A back line is omitted when the postcard has no separate back.
pub fn format_catalog_output(catalog: &Catalog) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, category) in catalog.categories.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            category.name,
            plural(category.postcards.len(), "postcard")
        ));
        if category.name != category.folder {
            lines.push(format!("{}Source: {}/", indent(1), category.folder));
        }
        for (j, postcard) in category.postcards.iter().enumerate() {
            lines.push(format!(
                "{}{} {}",
                indent(1),
                format_index(j + 1),
                postcard.name
            ));
            lines.push(format!("{}Front: {}", indent(2), postcard.front));
            if postcard.back != postcard.front {
                lines.push(format!("{}Back: {}", indent(2), postcard.back));
            }
        }
    }
    lines
}

pub fn format_catalog_summary(catalog: &Catalog) -> String {
    format!(
        "Generated metadata for {} categories with {} postcards",
        catalog.categories.len(),
        catalog.total_postcards
    )
}

/// Summary printed after the catalog file was written.
pub fn format_catalog_written(catalog: &Catalog, path: &Path) -> Vec<String> {
    vec![
        format_catalog_summary(catalog),
        format!("Metadata written to {}", path.display()),
    ]
}

pub fn print_catalog_output(catalog: &Catalog) {
    for line in format_catalog_output(catalog) {
        println!("{}", line);
    }
}

pub fn print_catalog_written(catalog: &Catalog, path: &Path) {
    for line in format_catalog_written(catalog, path) {
        println!("{}", line);
    }
}

// ============================================================================
// Thumbnails / Optimize
// ============================================================================

/// Format a single process progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::CategoryStarted {
            folder,
            image_count,
            ..
        } => vec![format!("{} ({})", folder, plural(*image_count, "image"))],
        ProcessEvent::ImageProcessed {
            filename, outputs, ..
        } => {
            let mut lines = vec![format!("{}{}", indent(1), filename)];
            for output in outputs {
                let status = match &output.status {
                    OutputStatus::Fresh => "fresh".to_string(),
                    OutputStatus::Generated => "generated".to_string(),
                    OutputStatus::Failed(reason) => format!("failed ({reason})"),
                };
                lines.push(format!("{}{}: {}", indent(2), output.label, status));
            }
            lines
        }
    }
}

pub fn format_process_result(result: &ProcessResult) -> String {
    format!("{}: {}", result.job, result.stats)
}

pub fn print_process_result(result: &ProcessResult) {
    println!("{}", format_process_result(result));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStats;
    use crate::catalog::{Category, Postcard};
    use crate::mirror::MirroredCategory;
    use crate::process::{AssetJob, OutputInfo};

    fn sample_catalog() -> Catalog {
        Catalog {
            categories: vec![
                Category {
                    name: "Birds".into(),
                    folder: "Birds".into(),
                    postcards: vec![
                        Postcard {
                            id: "Birds-eagle".into(),
                            front: "eagle.jpg".into(),
                            back: "eagle_001.jpg".into(),
                            name: "eagle".into(),
                        },
                        Postcard {
                            id: "Birds-owl".into(),
                            front: "owl.png".into(),
                            back: "owl.png".into(),
                            name: "owl".into(),
                        },
                    ],
                },
                Category {
                    name: "Old Maps".into(),
                    folder: "Old_Maps".into(),
                    postcards: vec![Postcard {
                        id: "Old_Maps-harbor".into(),
                        front: "harbor.jpg".into(),
                        back: "harbor.jpg".into(),
                        name: "harbor".into(),
                    }],
                },
            ],
            total_postcards: 3,
            generated_at: "2026-10-16T09:30:00.123Z".into(),
        }
    }

    #[test]
    fn collect_lists_indexed_folders() {
        let lines = format_collect_output(&["Birds".to_string(), "Old_Maps".to_string()]);
        assert_eq!(lines, vec!["001 Birds", "002 Old_Maps", "2 categories"]);
    }

    #[test]
    fn collect_single_category() {
        let lines = format_collect_output(&["Birds".to_string()]);
        assert_eq!(lines.last().unwrap(), "1 category");
    }

    #[test]
    fn mirror_lines_match_copy_messages() {
        let report = MirrorReport {
            categories: vec![
                MirroredCategory {
                    folder: "Birds".into(),
                    files: 3,
                },
                MirroredCategory {
                    folder: "Maps".into(),
                    files: 1,
                },
            ],
        };
        let lines = format_mirror_output(&report, "public/");
        assert_eq!(
            lines,
            vec![
                "Copied Birds to public/",
                "Copied Maps to public/",
                "Copied 2 categories (4 files)",
            ]
        );
    }

    #[test]
    fn catalog_inventory() {
        let lines = format_catalog_output(&sample_catalog());
        assert_eq!(
            lines,
            vec![
                "001 Birds (2 postcards)",
                "    001 eagle",
                "        Front: eagle.jpg",
                "        Back: eagle_001.jpg",
                "    002 owl",
                "        Front: owl.png",
                "002 Old Maps (1 postcard)",
                "    Source: Old_Maps/",
                "    001 harbor",
                "        Front: harbor.jpg",
            ]
        );
    }

    #[test]
    fn catalog_written_messages() {
        let lines =
            format_catalog_written(&sample_catalog(), Path::new("src/data/metadata.json"));
        assert_eq!(
            lines,
            vec![
                "Generated metadata for 2 categories with 3 postcards",
                "Metadata written to src/data/metadata.json",
            ]
        );
    }

    #[test]
    fn process_category_header() {
        let event = ProcessEvent::CategoryStarted {
            job: AssetJob::Thumbnails,
            folder: "Birds".into(),
            image_count: 2,
        };
        assert_eq!(format_process_event(&event), vec!["Birds (2 images)"]);
    }

    #[test]
    fn process_image_statuses() {
        let event = ProcessEvent::ImageProcessed {
            folder: "Birds".into(),
            filename: "eagle.jpg".into(),
            outputs: vec![
                OutputInfo {
                    label: "webp/eagle.webp".into(),
                    status: OutputStatus::Fresh,
                },
                OutputInfo {
                    label: "optimized/eagle.jpg".into(),
                    status: OutputStatus::Generated,
                },
                OutputInfo {
                    label: "thumbs/thumb_eagle.jpg".into(),
                    status: OutputStatus::Failed("bad data".into()),
                },
            ],
        };
        assert_eq!(
            format_process_event(&event),
            vec![
                "    eagle.jpg",
                "        webp/eagle.webp: fresh",
                "        optimized/eagle.jpg: generated",
                "        thumbs/thumb_eagle.jpg: failed (bad data)",
            ]
        );
    }

    #[test]
    fn process_result_line() {
        let result = ProcessResult {
            job: AssetJob::Optimize,
            categories: 2,
            stats: CacheStats {
                fresh: 4,
                generated: 2,
                failed: 0,
            },
        };
        assert_eq!(
            format_process_result(&result),
            "optimize: 4 fresh, 2 generated (6 total)"
        );
    }
}
