//! Scanner configuration.

use smol_str::SmolStr;

use crate::syntax::{COMMENT_KINDS, ParseOptions, TokenKind};

/// How sources are discovered, parsed and recorded.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "interchange", serde(default))]
pub struct ScanConfig {
    /// Token kinds the collector records. Comments by default; add
    /// [`TokenKind::Whitespace`] to keep layout as well.
    pub hidden_tokens: Vec<TokenKind>,
    /// File extensions scanned as Java source, without the dot.
    pub source_extensions: Vec<SmolStr>,
    /// Record every other file as plain text.
    pub text_fallback: bool,
    pub attach_comments: bool,
    /// Record field reads and writes from function bodies.
    pub record_accesses: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            hidden_tokens: COMMENT_KINDS.to_vec(),
            source_extensions: vec![SmolStr::new_static("java")],
            text_fallback: false,
            attach_comments: true,
            record_accesses: true,
        }
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hidden_tokens(mut self, kinds: impl IntoIterator<Item = TokenKind>) -> Self {
        self.hidden_tokens = kinds.into_iter().collect();
        self
    }

    pub fn with_source_extensions<S: Into<SmolStr>>(mut self, extensions: impl IntoIterator<Item = S>) -> Self {
        self.source_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_text_fallback(mut self, enabled: bool) -> Self {
        self.text_fallback = enabled;
        self
    }

    pub fn with_attach_comments(mut self, enabled: bool) -> Self {
        self.attach_comments = enabled;
        self
    }

    pub fn with_record_accesses(mut self, enabled: bool) -> Self {
        self.record_accesses = enabled;
        self
    }

    /// Whether a file with this extension is scanned as source.
    pub fn is_source_extension(&self, extension: &str) -> bool {
        self.source_extensions.iter().any(|ext| ext == extension)
    }

    pub fn parse_options(&self, source_name: &str) -> ParseOptions {
        ParseOptions {
            hidden: self.hidden_tokens.clone(),
            attach_comments: self.attach_comments,
            source_name: source_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_override_defaults() {
        let config = ScanConfig::new()
            .with_hidden_tokens([TokenKind::Whitespace, TokenKind::LineComment])
            .with_source_extensions(["java", "jav"])
            .with_text_fallback(true)
            .with_record_accesses(false);

        assert!(config.is_source_extension("jav"));
        assert!(!config.is_source_extension("txt"));
        assert!(config.text_fallback);
        assert!(!config.record_accesses);

        let options = config.parse_options("A.java");
        assert_eq!(options.hidden, vec![TokenKind::Whitespace, TokenKind::LineComment]);
        assert_eq!(options.source_name, "A.java");
    }

    #[cfg(feature = "interchange")]
    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: ScanConfig = serde_yaml::from_str("text_fallback: true\n").unwrap();

        assert!(config.text_fallback);
        assert!(config.attach_comments);
        assert_eq!(config.source_extensions, vec![SmolStr::new_static("java")]);
    }
}
