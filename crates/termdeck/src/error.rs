use thiserror::Error;

/// Structural problems found while compiling the document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unterminated frontmatter block starting at line 1")]
    UnterminatedFrontmatter,
}

/// A slide that cannot be drawn with the layout its content selects.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("{layout} slide must contain exactly one heading line, found extra content: {extra:?}")]
    ExtraContent { layout: &'static str, extra: String },

    #[error("image slide has no image reference outside code blocks")]
    MissingImage,
}

/// Recoverable per-image failures. Rendering substitutes a placeholder.
#[derive(Debug, Clone, Error)]
pub enum ResourceError {
    #[error("image not found: {0}")]
    NotFound(String),

    #[error("failed to decode image {source_name}: {reason}")]
    Decode { source_name: String, reason: String },

    #[error("failed to fetch {url}: {reason}")]
    Network { url: String, reason: String },
}

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("failed to read {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("failed to parse {path}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },

    #[error("no slides found in {0}")]
    Empty(String),

    #[error("slide {number} (line {line})")]
    Classify {
        number: usize,
        line: usize,
        #[source]
        source: ClassifyError,
    },

    #[error("strict validation failed with {} problem(s):\n{}", .0.len(), .0.join("\n"))]
    Validation(Vec<String>),

    #[error("terminal error")]
    Terminal(#[from] std::io::Error),
}

pub type Result<T, E = DeckError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_error_names_slide() {
        let err = DeckError::Classify {
            number: 3,
            line: 12,
            source: ClassifyError::MissingImage,
        };
        let msg = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(
            msg,
            "slide 3 (line 12): image slide has no image reference outside code blocks"
        );
    }

    #[test]
    fn test_validation_report_lists_every_problem() {
        let err = DeckError::Validation(vec!["slide 1: a".into(), "slide 4: b".into()]);
        let msg = err.to_string();
        assert!(msg.contains("2 problem(s)"));
        assert!(msg.contains("slide 4: b"));
    }
}
