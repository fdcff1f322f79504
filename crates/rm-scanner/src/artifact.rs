//! Markdown artifact generation.
//!
//! # Overview
//!
//! Each successful scan writes a `repomap.md` into the project root: a
//! header with project context, a rendered directory tree, a file-type
//! distribution, and (when analysis ran) per-file function and class
//! listings. The file is always rewritten in full; partial updates are
//! never attempted, so a reader can trust the whole document describes
//! one scan.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use camino::Utf8Path;
use chrono::{Local, TimeZone};
use tracing::info;

use rm_core::{FileAnalysis, FileNode, FxHashMap, TrackedProject, ARTIFACT_FILE_NAME};

use crate::error::ScanError;

/// Everything the renderer needs to produce one artifact.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactInput<'a> {
    /// Project metadata and totals.
    pub project: &'a TrackedProject,
    /// The scanned tree.
    pub tree: &'a FileNode,
    /// File counts per extension.
    pub file_types: &'a FxHashMap<String, u64>,
    /// Analysis results keyed by root-relative path, when analysis ran.
    pub analyses: &'a BTreeMap<String, FileAnalysis>,
}

/// Renders the full Markdown artifact for one scan.
#[must_use]
pub fn render_artifact(input: &ArtifactInput<'_>) -> String {
    let project = input.project;
    let analysis_state = if project.analysis_enabled {
        "✅ Enabled"
    } else {
        "❌ Disabled"
    };

    let mut out = String::new();
    let _ = write!(
        out,
        "# {name}\n\n\
         ## Project Context\n\
         - **Language**: {language}\n\
         - **Framework**: {frameworks}\n\
         - **Total Files**: {files}\n\
         - **Total Lines**: {lines}\n\
         - **Analysis**: {analysis_state}\n\
         - **Analyzed Files**: {analyzed}\n\
         - **Total Functions**: {functions}\n\
         - **Last Updated**: {updated}\n\n\
         ## Ignore Configuration\n\
         This project uses a `.ignore` file that contains patterns from the original `.gitignore` plus any additional patterns you want to exclude from repomap analysis.\n\n\
         Edit the `.ignore` file to customize what gets included in your repomap.\n\n\
         ## Project Structure\n\
         ```\n\
         {name}/\n",
        name = project.name,
        language = project.primary_language,
        frameworks = project.frameworks.join(", "),
        files = project.total_files,
        lines = project.total_lines,
        analyzed = project.analyzed_files,
        functions = project.total_functions,
        updated = format_timestamp(project.last_updated),
    );

    for line in render_tree(input.tree) {
        out.push_str(&line);
        out.push('\n');
    }

    out.push_str("```\n\n## File Type Distribution\n");
    for (ext, count) in top_file_types(input.file_types, 10) {
        let share = if project.total_files > 0 {
            percentage(count, project.total_files)
        } else {
            0.0
        };
        let label = if ext.is_empty() { "no extension" } else { ext };
        let _ = writeln!(out, "- **{label}**: {count} files ({share:.1}%)");
    }

    if project.analysis_enabled && !input.analyses.is_empty() {
        out.push_str(&render_analysis_section(input.analyses));
    } else {
        out.push_str(
            "\n## Code Analysis\n\
             *Code analysis is disabled for this project. Enable it to include automatic function extraction and code insights.*\n\n\
             *When enabled, this section will include:*\n\
             - Function definitions with parameters and descriptions\n\
             - Class structures and methods\n\
             - Detailed file-by-file analysis\n",
        );
    }

    out
}

/// Writes the artifact into the project root, replacing any previous one.
///
/// # Errors
///
/// Returns [`ScanError::Write`] if the file cannot be written.
pub fn write_artifact(root: &Utf8Path, contents: &str) -> Result<(), ScanError> {
    let path = root.join(ARTIFACT_FILE_NAME);
    std::fs::write(&path, contents).map_err(|e| ScanError::write(&path, e))?;
    info!(path = %path, bytes = contents.len(), "wrote artifact");
    Ok(())
}

/// Renders the tree as box-drawing lines, directories before files, both
/// in case-insensitive name order.
#[must_use]
pub fn render_tree(root: &FileNode) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(children) = root.children() {
        render_children(children, &[], &mut lines);
    }
    lines
}

fn render_children(
    children: &FxHashMap<String, FileNode>,
    ancestors_last: &[bool],
    lines: &mut Vec<String>,
) {
    let mut dirs: Vec<(&String, &FileNode)> = Vec::new();
    let mut files: Vec<(&String, &FileNode)> = Vec::new();
    for (name, node) in children {
        if node.is_dir() {
            dirs.push((name, node));
        } else {
            files.push((name, node));
        }
    }
    dirs.sort_by_key(|(name, _)| name.to_lowercase());
    files.sort_by_key(|(name, _)| name.to_lowercase());

    let total = dirs.len() + files.len();
    for (i, (name, node)) in dirs.into_iter().chain(files).enumerate() {
        let is_last = i + 1 == total;
        let prefix = connector_prefix(ancestors_last, is_last);

        match node {
            FileNode::Directory { children } => {
                lines.push(format!("{prefix}{name}/"));
                let mut next = ancestors_last.to_vec();
                next.push(is_last);
                render_children(children, &next, lines);
            }
            FileNode::File {
                lines: line_count,
                analyzed,
                functions,
            } => {
                let functions_info = if *functions > 0 {
                    format!(" ({functions} functions)")
                } else {
                    String::new()
                };
                let marker = if *analyzed { " 🤖" } else { "" };
                lines.push(format!(
                    "{prefix}{name} ({line_count} lines){functions_info}{marker}"
                ));
            }
        }
    }
}

/// Prefix for one tree line: spacers for all but the innermost ancestor,
/// then the branch connector for the item itself.
fn connector_prefix(ancestors_last: &[bool], is_last: bool) -> String {
    let connector = if is_last { "└── " } else { "├── " };
    if ancestors_last.is_empty() {
        return connector.to_owned();
    }
    let mut prefix = String::new();
    for ancestor_last in &ancestors_last[..ancestors_last.len() - 1] {
        prefix.push_str(if *ancestor_last { "    " } else { "│   " });
    }
    prefix.push_str(connector);
    prefix
}

/// Top file types by count, descending, with count as tie order left to
/// the extension name for determinism.
fn top_file_types(file_types: &FxHashMap<String, u64>, limit: usize) -> Vec<(&str, u64)> {
    let mut entries: Vec<(&str, u64)> = file_types
        .iter()
        .map(|(ext, count)| (ext.as_str(), *count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries.truncate(limit);
    entries
}

#[allow(clippy::cast_precision_loss)]
fn percentage(count: u64, total: u64) -> f64 {
    (count as f64 / total as f64) * 100.0
}

fn render_analysis_section(analyses: &BTreeMap<String, FileAnalysis>) -> String {
    let mut out = String::from("\n## Code Analysis\n\n### Function Overview\n");

    for (rel_path, analysis) in analyses {
        if analysis.functions.is_empty() {
            continue;
        }
        let _ = write!(out, "\n#### {rel_path}\n");
        if let Some(description) = &analysis.description {
            let _ = write!(out, "*{description}*\n\n");
        }
        let mut functions = analysis.functions.clone();
        functions.sort_by_key(|f| f.line_number.unwrap_or(0));
        for function in &functions {
            let params = function.parameters.join(", ");
            let return_info = function
                .return_type
                .as_ref()
                .map_or_else(String::new, |ret| format!(" → {ret}"));
            let line_info = function
                .line_number
                .map_or_else(String::new, |line| format!(" (line {line})"));
            let _ = writeln!(out, "**{}({params}){return_info}**{line_info}", function.name);
            if let Some(description) = &function.description {
                let _ = writeln!(out, "- {description}");
            }
            out.push('\n');
        }
    }

    if analyses.values().any(|a| !a.classes.is_empty()) {
        out.push_str("\n### Class Overview\n");
        for (rel_path, analysis) in analyses {
            if analysis.classes.is_empty() {
                continue;
            }
            let _ = write!(out, "\n#### {rel_path}\n");
            let mut classes = analysis.classes.clone();
            classes.sort_by_key(|c| c.line_number.unwrap_or(0));
            for class in &classes {
                let line_info = class
                    .line_number
                    .map_or_else(String::new, |line| format!(" (line {line})"));
                let _ = writeln!(out, "**{}**{line_info}", class.name);
                if let Some(description) = &class.description {
                    let _ = writeln!(out, "- {description}");
                }
                out.push('\n');
            }
        }
    }

    out
}

/// `YYYY-MM-DD HH:MM:SS` in local time, from Unix seconds.
fn format_timestamp(unix_seconds: u64) -> String {
    let seconds = i64::try_from(unix_seconds).unwrap_or(0);
    Local
        .timestamp_opt(seconds, 0)
        .single()
        .map_or_else(|| "unknown".to_owned(), |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}
