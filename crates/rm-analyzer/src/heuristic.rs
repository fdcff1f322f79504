//! Declaration-scanning analyzer.
//!
//! # Overview
//!
//! [`HeuristicAnalyzer`] extracts functions and classes by scanning for
//! declaration keywords at line starts. It understands no grammar beyond
//! that, which keeps it dependency-free and fast enough to run inline
//! during a scan. Nested declarations are reported flat, and anonymous
//! or assigned functions (arrow functions, lambdas) are not detected.

use camino::Utf8Path;

use rm_core::{ClassInfo, FileAnalysis, FunctionInfo};

use crate::error::AnalyzeError;
use crate::Analyzer;

/// Languages the heuristic analyzer can scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceLanguage {
    Python,
    JavaScript,
    Rust,
    Go,
    Java,
    CSharp,
    Ruby,
    Php,
    Kotlin,
    Swift,
}

impl SourceLanguage {
    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            ".py" | ".pyw" => Some(Self::Python),
            ".js" | ".jsx" | ".mjs" | ".ts" | ".tsx" => Some(Self::JavaScript),
            ".rs" => Some(Self::Rust),
            ".go" => Some(Self::Go),
            ".java" => Some(Self::Java),
            ".cs" => Some(Self::CSharp),
            ".rb" => Some(Self::Ruby),
            ".php" => Some(Self::Php),
            ".kt" | ".kts" => Some(Self::Kotlin),
            ".swift" => Some(Self::Swift),
            _ => None,
        }
    }
}

/// A grammar-free analyzer that finds declarations by keyword.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use rm_analyzer::{Analyzer, HeuristicAnalyzer};
///
/// let analyzer = HeuristicAnalyzer::new();
/// let analysis = analyzer
///     .analyze(Utf8Path::new("app.py"), "def main(argv) -> int:\n    return 0\n")?;
/// assert_eq!(analysis.functions[0].name, "main");
/// # Ok::<(), rm_analyzer::AnalyzeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct HeuristicAnalyzer {
    max_functions: usize,
}

impl HeuristicAnalyzer {
    /// Creates an analyzer with the default per-file function cap.
    #[must_use]
    pub const fn new() -> Self {
        Self { max_functions: 50 }
    }

    /// Sets the maximum number of functions reported per file.
    #[must_use]
    pub const fn with_max_functions(mut self, max_functions: usize) -> Self {
        self.max_functions = max_functions;
        self
    }
}

impl Default for HeuristicAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for HeuristicAnalyzer {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn supports_extension(&self, ext: &str) -> bool {
        SourceLanguage::from_extension(ext).is_some()
    }

    fn analyze(&self, path: &Utf8Path, contents: &str) -> Result<FileAnalysis, AnalyzeError> {
        let ext = path
            .extension()
            .map_or_else(String::new, |e| format!(".{}", e.to_lowercase()));
        let language = SourceLanguage::from_extension(&ext)
            .ok_or_else(|| AnalyzeError::Unsupported(path.to_owned()))?;

        let mut analysis = FileAnalysis::default();
        for (index, line) in contents.lines().enumerate() {
            let line_number = u32::try_from(index + 1).unwrap_or(u32::MAX);
            if analysis.functions.len() < self.max_functions {
                if let Some(function) = scan_function(language, line, line_number) {
                    analysis.functions.push(function);
                    continue;
                }
            }
            if let Some(class) = scan_class(language, line, line_number) {
                analysis.classes.push(class);
            }
        }
        Ok(analysis)
    }
}

fn scan_function(language: SourceLanguage, line: &str, line_number: u32) -> Option<FunctionInfo> {
    let trimmed = line.trim_start();
    let declaration = match language {
        SourceLanguage::Python => strip_any(trimmed, &["async def ", "def "])?,
        SourceLanguage::JavaScript => {
            let rest = strip_any(trimmed, &["export default ", "export "]).unwrap_or(trimmed);
            strip_any(rest, &["async function ", "function ", "async function*", "function* "])?
        }
        SourceLanguage::Rust => {
            let rest = strip_visibility_rust(trimmed);
            strip_any(rest, &["const fn ", "async fn ", "unsafe fn ", "fn "])?
        }
        SourceLanguage::Go => {
            let rest = trimmed.strip_prefix("func ")?;
            // Skip a method receiver: func (s *Server) name(...)
            if let Some(after) = rest.strip_prefix('(') {
                let (_, tail) = after.split_once(')')?;
                tail.trim_start()
            } else {
                rest
            }
        }
        SourceLanguage::Kotlin => {
            let rest = strip_any(trimmed, &["private ", "public ", "internal ", "protected "])
                .unwrap_or(trimmed);
            let rest = strip_any(rest, &["suspend ", "override "]).unwrap_or(rest);
            rest.strip_prefix("fun ")?
        }
        SourceLanguage::Swift => {
            let rest = strip_any(trimmed, &["private ", "public ", "internal ", "open "])
                .unwrap_or(trimmed);
            rest.strip_prefix("func ")?
        }
        SourceLanguage::Ruby => {
            let rest = trimmed.strip_prefix("def ")?;
            // Ruby defs may omit parentheses entirely.
            let name_end = rest
                .find(|c: char| c == '(' || c.is_whitespace())
                .unwrap_or(rest.len());
            let name = &rest[..name_end];
            if name.is_empty() {
                return None;
            }
            let parameters = rest
                .get(name_end..)
                .and_then(|tail| tail.trim_start().strip_prefix('('))
                .and_then(|tail| tail.split(')').next())
                .map(split_parameters)
                .unwrap_or_default();
            return Some(FunctionInfo {
                name: name.to_owned(),
                parameters,
                return_type: None,
                description: None,
                line_number: Some(line_number),
            });
        }
        SourceLanguage::Php => {
            let rest = strip_any(trimmed, &["public ", "private ", "protected ", "static "])
                .unwrap_or(trimmed);
            let rest = strip_any(rest, &["static "]).unwrap_or(rest);
            rest.strip_prefix("function ")?
        }
        SourceLanguage::Java | SourceLanguage::CSharp => return None,
    };

    let paren = declaration.find('(')?;
    let name = declaration[..paren].trim();
    if name.is_empty() || !is_identifier(name) {
        return None;
    }
    let after_params = declaration.get(paren + 1..)?;
    let close = after_params.rfind(')')?;
    let parameters = split_parameters(&after_params[..close]);
    let return_type = parse_return_type(language, after_params.get(close + 1..).unwrap_or(""));

    Some(FunctionInfo {
        name: name.to_owned(),
        parameters,
        return_type,
        description: None,
        line_number: Some(line_number),
    })
}

fn scan_class(language: SourceLanguage, line: &str, line_number: u32) -> Option<ClassInfo> {
    let trimmed = line.trim_start();
    let name_part = match language {
        SourceLanguage::Python => trimmed.strip_prefix("class ")?,
        SourceLanguage::JavaScript => {
            let rest = strip_any(trimmed, &["export default ", "export "]).unwrap_or(trimmed);
            rest.strip_prefix("class ")?
        }
        SourceLanguage::Rust => {
            let rest = strip_visibility_rust(trimmed);
            strip_any(rest, &["struct ", "enum ", "trait "])?
        }
        SourceLanguage::Go => {
            let rest = trimmed.strip_prefix("type ")?;
            if rest.contains("struct") || rest.contains("interface") {
                rest
            } else {
                return None;
            }
        }
        SourceLanguage::Java
        | SourceLanguage::CSharp
        | SourceLanguage::Kotlin
        | SourceLanguage::Swift => {
            let rest = strip_any(
                trimmed,
                &[
                    "public ", "private ", "protected ", "internal ", "abstract ", "final ",
                    "sealed ", "open ", "static ", "data ",
                ],
            )
            .unwrap_or(trimmed);
            let rest = strip_any(rest, &["abstract ", "data ", "sealed "]).unwrap_or(rest);
            strip_any(rest, &["class ", "interface ", "enum "])?
        }
        SourceLanguage::Ruby => trimmed.strip_prefix("class ")?,
        SourceLanguage::Php => {
            let rest = strip_any(trimmed, &["abstract ", "final "]).unwrap_or(trimmed);
            rest.strip_prefix("class ")?
        }
    };

    let name: String = name_part
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() || !name.chars().next().is_some_and(char::is_alphabetic) {
        return None;
    }
    Some(ClassInfo {
        name,
        description: None,
        line_number: Some(line_number),
    })
}

fn strip_any<'a>(line: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes.iter().find_map(|p| line.strip_prefix(p))
}

fn is_identifier(name: &str) -> bool {
    name.chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

fn strip_visibility_rust(line: &str) -> &str {
    if let Some(rest) = line.strip_prefix("pub") {
        if let Some(rest) = rest.strip_prefix('(') {
            if let Some((_, tail)) = rest.split_once(')') {
                return tail.trim_start();
            }
        }
        if let Some(rest) = rest.strip_prefix(' ') {
            return rest;
        }
    }
    line
}

fn split_parameters(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty() && *p != "self" && *p != "&self" && *p != "&mut self")
        .map(ToOwned::to_owned)
        .collect()
}

fn parse_return_type(language: SourceLanguage, after_close: &str) -> Option<String> {
    let after_close = after_close.trim();
    let marker = match language {
        SourceLanguage::Python
        | SourceLanguage::Rust
        | SourceLanguage::Php
        | SourceLanguage::Swift => "->",
        SourceLanguage::Kotlin => ":",
        _ => return None,
    };
    let rest = after_close.strip_prefix(marker)?.trim();
    let end = rest
        .find(|c: char| c == ':' || c == '{' || c == ';')
        .unwrap_or(rest.len());
    let ret = rest[..end].trim();
    if ret.is_empty() {
        None
    } else {
        Some(ret.to_owned())
    }
}
