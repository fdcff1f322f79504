//! Ignore rule parsing and matching.
//!
//! # Overview
//!
//! Each project root carries a `.ignore` file with gitignore-flavored
//! rules. This module parses that file into an [`IgnoreRules`] value and
//! answers "should this path be skipped?" for the walker.
//!
//! The dialect is deliberately small:
//!
//! - blank lines and `#` comments are skipped
//! - `!pattern` negates an earlier general-pattern match
//! - `pattern/` matches directories only, including every ancestor
//!   directory of a candidate path
//! - `/pattern` anchors to the project root
//! - a single `**` splits the pattern into a literal prefix and suffix
//! - everything else is a shell glob tried against both the relative
//!   path and the base name
//!
//! Directory-pattern matches are not negatable; negations only reverse
//! general-pattern matches. Malformed globs are logged and skipped, and a
//! missing or unreadable ignore file yields an empty rule set that
//! ignores nothing.

use camino::Utf8Path;
use globset::{GlobBuilder, GlobMatcher};
use tracing::{debug, info, warn};

use rm_core::GENERATED_FILES;

use crate::error::ScanError;

/// A single parsed ignore pattern.
#[derive(Debug, Clone)]
struct IgnorePattern {
    raw: String,
    kind: PatternKind,
}

#[derive(Debug, Clone)]
enum PatternKind {
    /// Leading `/`: matches the whole relative path or its first segment.
    Anchored(GlobMatcher),
    /// Exactly one `**`: literal prefix/suffix containment.
    Globstar { prefix: String, suffix: String },
    /// Plain shell glob.
    Plain(GlobMatcher),
}

impl IgnorePattern {
    fn parse(raw: &str) -> Result<Self, globset::Error> {
        let kind = if let Some(anchored) = raw.strip_prefix('/') {
            PatternKind::Anchored(compile_glob(anchored)?)
        } else {
            let parts: Vec<&str> = raw.split("**").collect();
            if parts.len() == 2 {
                PatternKind::Globstar {
                    prefix: parts[0].trim_end_matches('/').to_owned(),
                    suffix: parts[1].trim_start_matches('/').to_owned(),
                }
            } else {
                PatternKind::Plain(compile_glob(raw)?)
            }
        };
        Ok(Self {
            raw: raw.to_owned(),
            kind,
        })
    }

    /// Matches a candidate by its relative path, falling back to the base
    /// name. Anchored patterns never take the base-name fallback, so a
    /// root-relative rule cannot match deeper in the tree.
    fn matches_candidate(&self, rel_path: &str, filename: &str, is_dir: bool) -> bool {
        if matches!(self.kind, PatternKind::Anchored(_)) {
            self.matches(rel_path, is_dir)
        } else {
            self.matches(rel_path, is_dir) || self.matches(filename, is_dir)
        }
    }

    /// Matches a single subject string, which may be a full relative path,
    /// a base name, or a lone path segment.
    fn matches(&self, subject: &str, is_dir: bool) -> bool {
        match &self.kind {
            PatternKind::Anchored(matcher) => {
                matcher.is_match(subject)
                    || subject
                        .split('/')
                        .next()
                        .is_some_and(|first| matcher.is_match(first))
            }
            PatternKind::Globstar { prefix, suffix } => {
                (prefix.is_empty() || subject.starts_with(prefix.as_str()))
                    && (suffix.is_empty() || subject.ends_with(suffix.as_str()))
            }
            PatternKind::Plain(matcher) => {
                if matcher.is_match(subject) {
                    return true;
                }
                let base = subject.rsplit('/').next().unwrap_or(subject);
                if matcher.is_match(base) {
                    return true;
                }
                // Directory candidates also match on any path segment.
                is_dir && subject.split('/').any(|part| matcher.is_match(part))
            }
        }
    }
}

/// Shell-glob compilation: `*` and `?` cross directory separators, the
/// way `fnmatch` behaves.
fn compile_glob(pattern: &str) -> Result<GlobMatcher, globset::Error> {
    Ok(GlobBuilder::new(pattern)
        .literal_separator(false)
        .backslash_escape(false)
        .build()?
        .compile_matcher())
}

/// The full parsed rule set of one `.ignore` file.
///
/// # Examples
///
/// ```
/// use rm_scanner::IgnoreRules;
///
/// let rules = IgnoreRules::parse("*.log\n!keep.log\nbuild/\n");
/// assert!(rules.is_ignored("debug.log", false));
/// assert!(!rules.is_ignored("keep.log", false));
/// assert!(rules.is_ignored("build", true));
/// ```
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    patterns: Vec<IgnorePattern>,
    dir_patterns: Vec<IgnorePattern>,
    negations: Vec<IgnorePattern>,
}

impl IgnoreRules {
    /// Parses rules from ignore file contents. Malformed lines are logged
    /// and skipped.
    #[must_use]
    pub fn parse(contents: &str) -> Self {
        let mut rules = Self::default();
        for (line_num, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (bucket, pattern) = if let Some(negated) = line.strip_prefix('!') {
                (&mut rules.negations, negated)
            } else if let Some(dir) = line.strip_suffix('/') {
                (&mut rules.dir_patterns, dir)
            } else {
                (&mut rules.patterns, line)
            };
            match IgnorePattern::parse(pattern) {
                Ok(parsed) => bucket.push(parsed),
                Err(e) => {
                    warn!(line = line_num + 1, pattern = %line, error = %e, "skipping invalid ignore pattern");
                }
            }
        }
        rules
    }

    /// Loads rules from an ignore file on disk.
    ///
    /// A missing or unreadable file logs a warning and yields an empty
    /// rule set; it never fails the scan.
    #[must_use]
    pub fn load(path: &Utf8Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let rules = Self::parse(&contents);
                info!(
                    path = %path,
                    patterns = rules.patterns.len(),
                    dir_patterns = rules.dir_patterns.len(),
                    negations = rules.negations.len(),
                    "loaded ignore rules"
                );
                rules
            }
            Err(e) => {
                warn!(path = %path, error = %e, "ignore file unreadable, ignoring nothing");
                Self::default()
            }
        }
    }

    /// Returns `true` if the given root-relative path should be skipped.
    ///
    /// `rel_path` uses forward slashes (backslashes are normalized).
    /// Generated artifact files are always ignored regardless of rules.
    #[must_use]
    pub fn is_ignored(&self, rel_path: &str, is_dir: bool) -> bool {
        let rel_path = if rel_path.contains('\\') {
            rel_path.replace('\\', "/")
        } else {
            rel_path.to_owned()
        };
        let filename = rel_path.rsplit('/').next().unwrap_or(&rel_path);

        if GENERATED_FILES.contains(&filename) {
            return true;
        }

        // Directory-only patterns, checked first and never negated.
        if is_dir {
            for pattern in &self.dir_patterns {
                if pattern.matches_candidate(&rel_path, filename, true) {
                    debug!(path = %rel_path, pattern = %pattern.raw, "directory ignored");
                    return true;
                }
            }
        }

        // Any ancestor segment matching a directory pattern ignores the
        // whole subtree.
        let segments: Vec<&str> = rel_path.split('/').collect();
        for part in &segments[..segments.len().saturating_sub(1)] {
            for pattern in &self.dir_patterns {
                if pattern.matches(part, true) {
                    debug!(path = %rel_path, segment = %part, pattern = %pattern.raw, "ignored via parent directory");
                    return true;
                }
            }
        }

        let mut ignored = false;
        for pattern in &self.patterns {
            if pattern.matches_candidate(&rel_path, filename, is_dir) {
                debug!(path = %rel_path, pattern = %pattern.raw, "ignored");
                ignored = true;
                break;
            }
        }

        if ignored {
            for pattern in &self.negations {
                if pattern.matches_candidate(&rel_path, filename, is_dir) {
                    debug!(path = %rel_path, pattern = %pattern.raw, "un-ignored by negation");
                    ignored = false;
                    break;
                }
            }
        }

        ignored
    }
}

/// Default ignore rules written into new projects, before any `.gitignore`
/// merge.
const DEFAULT_IGNORE_HEADER: &str = "\
# Repomap Ignore File
# This file was automatically created by copying your .gitignore
# and adding some default patterns. You can edit this file to
# customize what gets included in your repomap analysis.

# Repomap generated files (automatically ignored):
repomap.md
.ignore

# Python Virtual Environments (CRITICAL - these contain thousands of files):
venv/
env/
.venv/
.env/
ENV/
env.bak/
venv.bak/
.virtualenv/
virtualenv/
__pycache__/
*.pyc
*.pyo
*.pyd
.Python
build/
develop-eggs/
dist/
downloads/
eggs/
.eggs/
lib/
lib64/
parts/
sdist/
var/
wheels/
*.egg-info/
.installed.cfg
*.egg
MANIFEST

# Node.js dependencies:
node_modules/
npm-debug.log*
yarn-debug.log*
yarn-error.log*

# IDE and Editor files:
.vscode/
.idea/
*.swp
*.swo
*~
.DS_Store
Thumbs.db

# Git:
.git/

# Cache and temporary files:
.pytest_cache/
.mypy_cache/
.tox/
.coverage
.coverage.*
.cache
.nox/
htmlcov/
.nyc_output/

# Compiled and built files:
*.min.js
*.min.css
*.map
*.bundle.js

";

/// Extra defaults appended after any `.gitignore` content.
const DEFAULT_IGNORE_FOOTER: &str = "
# Additional patterns for repomap (you can edit these):
*.log
*.tmp
*.temp
*.cache
*.so
.env
.env.local
*.lock
package-lock.json
yarn.lock
";

/// Builds the default ignore file contents for a project root, merging in
/// the root's `.gitignore` when present.
#[must_use]
pub fn default_ignore_contents(root: &Utf8Path) -> String {
    let mut contents = String::from(DEFAULT_IGNORE_HEADER);

    let gitignore = root.join(".gitignore");
    if gitignore.exists() {
        contents.push_str("# Patterns copied from .gitignore:\n\n");
        match std::fs::read_to_string(&gitignore) {
            Ok(existing) => {
                let existing = existing.trim();
                if !existing.is_empty() {
                    contents.push_str(existing);
                    contents.push('\n');
                }
            }
            Err(e) => {
                warn!(path = %gitignore, error = %e, "could not read .gitignore");
            }
        }
    }

    contents.push_str(DEFAULT_IGNORE_FOOTER);
    contents
}

/// Creates the project's `.ignore` file with default contents if it does
/// not already exist. Returns `true` if the file was created.
///
/// # Errors
///
/// Returns [`ScanError::Write`] if the file cannot be written.
pub fn ensure_ignore_file(root: &Utf8Path) -> Result<bool, ScanError> {
    let ignore_path = root.join(rm_core::IGNORE_FILE_NAME);
    if ignore_path.exists() {
        return Ok(false);
    }
    let contents = default_ignore_contents(root);
    std::fs::write(&ignore_path, contents).map_err(|e| ScanError::write(&ignore_path, e))?;
    info!(path = %ignore_path, "created ignore file");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[test]
    fn test_generated_files_always_ignored() {
        let rules = IgnoreRules::default();
        assert!(rules.is_ignored("repomap.md", false));
        assert!(rules.is_ignored("sub/dir/.ignore", false));
        assert!(!rules.is_ignored("notes.md", false));
    }

    #[test]
    fn test_glob_matches_basename_anywhere() {
        let rules = IgnoreRules::parse("*.log\n");
        assert!(rules.is_ignored("debug.log", false));
        assert!(rules.is_ignored("logs/nested/app.log", false));
        assert!(!rules.is_ignored("app.rs", false));
    }

    #[test]
    fn test_negation_overrides_match() {
        let rules = IgnoreRules::parse("*.log\n!keep.log\n");
        assert!(rules.is_ignored("debug.log", false));
        assert!(!rules.is_ignored("keep.log", false));
        assert!(!rules.is_ignored("sub/keep.log", false));
    }

    #[test]
    fn test_directory_pattern_matches_dirs_only() {
        let rules = IgnoreRules::parse("build/\n");
        assert!(rules.is_ignored("build", true));
        assert!(!rules.is_ignored("build", false));
    }

    #[test]
    fn test_directory_pattern_matches_ancestors() {
        let rules = IgnoreRules::parse("node_modules/\n");
        assert!(rules.is_ignored("node_modules/pkg/index.js", false));
        assert!(rules.is_ignored("app/node_modules", true));
    }

    #[test]
    fn test_directory_pattern_not_negatable() {
        let rules = IgnoreRules::parse("build/\n!build\n");
        assert!(rules.is_ignored("build", true));
    }

    #[test]
    fn test_anchored_pattern_matches_root_only() {
        let rules = IgnoreRules::parse("/target\n");
        assert!(rules.is_ignored("target", true));
        assert!(rules.is_ignored("target/debug", true));
        assert!(!rules.is_ignored("sub/target", false));
    }

    #[test]
    fn test_globstar_prefix_suffix() {
        let rules = IgnoreRules::parse("docs/**\n**/generated.css\n");
        assert!(rules.is_ignored("docs/api/index.html", false));
        assert!(rules.is_ignored("theme/generated.css", false));
        assert!(!rules.is_ignored("src/index.html", false));
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let rules = IgnoreRules::parse("# a comment\n\n   \n*.tmp\n");
        assert!(rules.is_ignored("x.tmp", false));
        assert!(!rules.is_ignored("# a comment", false));
    }

    #[test]
    fn test_invalid_pattern_skipped() {
        let rules = IgnoreRules::parse("[invalid\n*.log\n");
        assert!(rules.is_ignored("a.log", false));
        assert!(!rules.is_ignored("[invalid", false));
    }

    #[test]
    fn test_missing_file_ignores_nothing() {
        let rules = IgnoreRules::load(Utf8Path::new("/nonexistent/.ignore"));
        assert!(!rules.is_ignored("anything.rs", false));
    }

    #[test]
    fn test_question_mark_glob() {
        let rules = IgnoreRules::parse("file?.txt\n");
        assert!(rules.is_ignored("file1.txt", false));
        assert!(!rules.is_ignored("file10.txt", false));
    }

    #[test]
    fn test_default_contents_merge_gitignore() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        std::fs::write(root.join(".gitignore"), "custom-dir/\n").unwrap();

        let contents = default_ignore_contents(&root);
        assert!(contents.contains("# Patterns copied from .gitignore:"));
        assert!(contents.contains("custom-dir/"));
        assert!(contents.contains("node_modules/"));
        assert!(contents.contains("package-lock.json"));
    }

    #[test]
    fn test_ensure_ignore_file_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

        assert!(ensure_ignore_file(&root).unwrap());
        std::fs::write(root.join(".ignore"), "only-mine/\n").unwrap();
        assert!(!ensure_ignore_file(&root).unwrap());
        let contents = std::fs::read_to_string(root.join(".ignore")).unwrap();
        assert_eq!(contents, "only-mine/\n");
    }

    #[test]
    fn test_default_rules_skip_common_noise() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let rules = IgnoreRules::parse(&default_ignore_contents(&root));

        assert!(rules.is_ignored("node_modules", true));
        assert!(rules.is_ignored("__pycache__/mod.pyc", false));
        assert!(rules.is_ignored(".git", true));
        assert!(rules.is_ignored("app.min.js", false));
        assert!(!rules.is_ignored("src/main.py", false));
    }
}
