//! Language and framework detection.
//!
//! Both detectors are table-driven. Language detection scores each known
//! language by summing the per-extension file counts gathered during the
//! walk; the highest score wins, with ties broken by table order.
//! Framework detection just probes the project root for well-known marker
//! files.

use camino::Utf8Path;

use rm_core::FxHashMap;

/// Known languages with their file extensions, in tie-break order.
pub const LANGUAGES: &[(&str, &[&str])] = &[
    ("Python", &[".py", ".pyw", ".pyi"]),
    ("JavaScript", &[".js", ".jsx", ".mjs"]),
    ("TypeScript", &[".ts", ".tsx"]),
    ("Java", &[".java"]),
    ("C++", &[".cpp", ".cc", ".cxx", ".hpp", ".h"]),
    ("C", &[".c", ".h"]),
    ("C#", &[".cs"]),
    ("Ruby", &[".rb"]),
    ("PHP", &[".php"]),
    ("Go", &[".go"]),
    ("Rust", &[".rs"]),
    ("Swift", &[".swift"]),
    ("Kotlin", &[".kt", ".kts"]),
    ("HTML", &[".html", ".htm"]),
    ("CSS", &[".css", ".scss", ".sass", ".less"]),
    ("Shell", &[".sh", ".bash", ".zsh"]),
    ("PowerShell", &[".ps1"]),
    ("YAML", &[".yml", ".yaml"]),
    ("JSON", &[".json"]),
    ("XML", &[".xml"]),
    ("Markdown", &[".md", ".markdown"]),
];

/// Frameworks with the root-level marker files that reveal them.
pub const FRAMEWORKS: &[(&str, &[&str])] = &[
    ("React", &["package.json"]),
    ("Vue", &["vue.config.js", "package.json"]),
    ("Angular", &["angular.json", "package.json"]),
    ("Django", &["manage.py", "settings.py"]),
    ("Flask", &["app.py", "application.py"]),
    ("FastAPI", &["main.py", "app.py"]),
    ("Spring", &["pom.xml", "build.gradle"]),
    ("Express", &["package.json"]),
    ("Laravel", &["composer.json", "artisan"]),
    ("Rails", &["Gemfile", "config.ru"]),
    ("Next.js", &["next.config.js", "package.json"]),
    ("Nuxt", &["nuxt.config.js", "package.json"]),
];

/// Picks the dominant language from per-extension file counts.
///
/// Extensions are expected lowercased with their leading dot, as the
/// walker records them. Returns `"Unknown"` when nothing scores.
///
/// # Examples
///
/// ```
/// use rm_core::FxHashMap;
/// use rm_scanner::detect_primary_language;
///
/// let mut counts = FxHashMap::default();
/// counts.insert(".py".to_owned(), 5_u64);
/// counts.insert(".md".to_owned(), 2_u64);
/// assert_eq!(detect_primary_language(&counts), "Python");
/// ```
#[must_use]
pub fn detect_primary_language(file_types: &FxHashMap<String, u64>) -> String {
    let mut best: Option<(&str, u64)> = None;
    for (language, extensions) in LANGUAGES {
        let score: u64 = extensions
            .iter()
            .filter_map(|ext| file_types.get(*ext))
            .sum();
        if score > 0 && best.is_none_or(|(_, top)| score > top) {
            best = Some((language, score));
        }
    }
    best.map_or_else(|| "Unknown".to_owned(), |(language, _)| language.to_owned())
}

/// Detects frameworks by probing the project root for marker files.
///
/// Every framework with at least one marker present is reported; a
/// `package.json` alone therefore lists several JavaScript frameworks,
/// matching the deliberately loose detection this tool has always done.
#[must_use]
pub fn detect_frameworks(root: &Utf8Path) -> Vec<String> {
    let mut detected = Vec::new();
    for (framework, markers) in FRAMEWORKS {
        if markers.iter().any(|marker| root.join(marker).exists()) {
            detected.push((*framework).to_owned());
        }
    }
    if detected.is_empty() {
        detected.push("None detected".to_owned());
    }
    detected
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    fn counts(pairs: &[(&str, u64)]) -> FxHashMap<String, u64> {
        pairs
            .iter()
            .map(|(ext, n)| ((*ext).to_owned(), *n))
            .collect()
    }

    #[test]
    fn test_primary_language_by_count() {
        let types = counts(&[(".py", 3), (".js", 1)]);
        assert_eq!(detect_primary_language(&types), "Python");
    }

    #[test]
    fn test_primary_language_unknown_when_empty() {
        assert_eq!(detect_primary_language(&FxHashMap::default()), "Unknown");
        let types = counts(&[(".xyz", 10)]);
        assert_eq!(detect_primary_language(&types), "Unknown");
    }

    #[test]
    fn test_tie_broken_by_table_order() {
        // .h counts for both C++ and C; C++ comes first.
        let types = counts(&[(".h", 4)]);
        assert_eq!(detect_primary_language(&types), "C++");
    }

    #[test]
    fn test_framework_markers() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        std::fs::write(root.join("manage.py"), "").unwrap();

        let frameworks = detect_frameworks(&root);
        assert!(frameworks.contains(&"Django".to_owned()));
        assert!(!frameworks.contains(&"React".to_owned()));
    }

    #[test]
    fn test_no_frameworks_detected() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        assert_eq!(detect_frameworks(&root), vec!["None detected".to_owned()]);
    }
}
