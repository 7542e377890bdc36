//! Language identification and detection
//!
//! Detection order: explicit file-type tag, then file extension, then a
//! shebang line for files without an extension.

use std::path::Path;

/// Language identifiers known to the detector
///
/// Only [`LanguageId::Python`] carries a grammar; the others exist so a
/// buffer can be positively identified as *not* the target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LanguageId {
    #[default]
    PlainText,
    Python,
    Rust,
    JavaScript,
    Bash,
    Markdown,
    Yaml,
}

impl LanguageId {
    /// Map an explicit file-type tag (as a host would assign it)
    pub fn from_file_type(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "python" | "py" | "python3" => LanguageId::Python,
            "rust" | "rs" => LanguageId::Rust,
            "javascript" | "js" => LanguageId::JavaScript,
            "bash" | "sh" | "zsh" => LanguageId::Bash,
            "markdown" | "md" => LanguageId::Markdown,
            "yaml" | "yml" => LanguageId::Yaml,
            _ => LanguageId::PlainText,
        }
    }

    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "py" | "pyi" | "pyw" => LanguageId::Python,
            "rs" => LanguageId::Rust,
            "js" | "mjs" | "cjs" => LanguageId::JavaScript,
            "sh" | "bash" | "zsh" => LanguageId::Bash,
            "md" | "markdown" => LanguageId::Markdown,
            "yaml" | "yml" => LanguageId::Yaml,
            _ => LanguageId::PlainText,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(LanguageId::PlainText)
    }

    /// Detect language from a `#!` interpreter line
    ///
    /// Handles `#!/usr/bin/python3`, `#!/usr/bin/env python3` and
    /// `#!/usr/bin/env -S python3 -u`.
    pub fn from_shebang(first_line: &str) -> Self {
        let Some(rest) = first_line.strip_prefix("#!") else {
            return LanguageId::PlainText;
        };

        let mut tokens = rest.split_whitespace();
        let Some(program) = tokens.next() else {
            return LanguageId::PlainText;
        };

        let mut interpreter = basename(program);
        if interpreter == "env" {
            interpreter = match tokens.find(|t| !t.starts_with('-') && !t.contains('=')) {
                Some(t) => basename(t),
                None => return LanguageId::PlainText,
            };
        }

        // python3.12 -> python
        let name = interpreter.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.');
        match name {
            "python" | "pypy" => LanguageId::Python,
            "bash" | "sh" | "zsh" | "dash" => LanguageId::Bash,
            "node" | "deno" => LanguageId::JavaScript,
            _ => LanguageId::PlainText,
        }
    }

    /// Full detection chain: file-type tag, extension, shebang
    pub fn detect(file_type: Option<&str>, path: Option<&Path>, first_line: Option<&str>) -> Self {
        if let Some(tag) = file_type.filter(|t| !t.trim().is_empty()) {
            return Self::from_file_type(tag);
        }

        if let Some(path) = path {
            if path.extension().is_some() {
                return Self::from_path(path);
            }
        }

        first_line
            .map(Self::from_shebang)
            .unwrap_or(LanguageId::PlainText)
    }

    /// Get display name for the language
    pub fn display_name(&self) -> &'static str {
        match self {
            LanguageId::PlainText => "Plain Text",
            LanguageId::Python => "Python",
            LanguageId::Rust => "Rust",
            LanguageId::JavaScript => "JavaScript",
            LanguageId::Bash => "Bash",
            LanguageId::Markdown => "Markdown",
            LanguageId::Yaml => "YAML",
        }
    }

    /// Tree-sitter grammar, if one is bundled for this language
    pub fn grammar(&self) -> Option<tree_sitter::Language> {
        match self {
            LanguageId::Python => Some(tree_sitter_python::LANGUAGE.into()),
            _ => None,
        }
    }
}

fn basename(program: &str) -> &str {
    program.rsplit('/').next().unwrap_or(program)
}
