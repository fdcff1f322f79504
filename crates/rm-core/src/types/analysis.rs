//! Per-file analysis results.

use serde::{Deserialize, Serialize};

/// One function found in an analyzed file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FunctionInfo {
    /// Function name.
    pub name: String,
    /// Parameter names, in declaration order.
    pub parameters: Vec<String>,
    /// Declared return type, if the source states one.
    pub return_type: Option<String>,
    /// Short description, if the analyzer produced one.
    pub description: Option<String>,
    /// 1-based line of the declaration.
    pub line_number: Option<u32>,
}

/// One class (or equivalent type) found in an analyzed file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassInfo {
    /// Class name.
    pub name: String,
    /// Short description, if the analyzer produced one.
    pub description: Option<String>,
    /// 1-based line of the declaration.
    pub line_number: Option<u32>,
}

/// Everything an analyzer extracted from one file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileAnalysis {
    /// One-line summary of the file.
    pub description: Option<String>,
    /// Functions found, in source order.
    pub functions: Vec<FunctionInfo>,
    /// Classes found, in source order.
    pub classes: Vec<ClassInfo>,
}

impl FileAnalysis {
    /// Returns `true` if nothing was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.functions.is_empty() && self.classes.is_empty()
    }

    /// Number of functions found.
    #[must_use]
    pub fn function_count(&self) -> u64 {
        self.functions.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_analysis() {
        let analysis = FileAnalysis::default();
        assert!(analysis.is_empty());
        assert_eq!(analysis.function_count(), 0);
    }

    #[test]
    fn test_function_count() {
        let analysis = FileAnalysis {
            functions: vec![
                FunctionInfo {
                    name: "main".to_owned(),
                    ..FunctionInfo::default()
                },
                FunctionInfo {
                    name: "helper".to_owned(),
                    ..FunctionInfo::default()
                },
            ],
            ..FileAnalysis::default()
        };
        assert!(!analysis.is_empty());
        assert_eq!(analysis.function_count(), 2);
    }
}
