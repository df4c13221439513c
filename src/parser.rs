use crate::lexer::{self, LexingError, Token};

/// Condition under which a segment runs, given the status of the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOp {
    /// First segment of a line, or one following `;`: always runs.
    Norm,
    /// Follows `&&`: runs only if the previous status is 0.
    And,
    /// Follows `||`: runs only if the previous status is non-zero.
    Or,
}

impl ChainOp {
    /// Whether a segment tagged with `self` runs after a command that returned `last_status`.
    pub fn should_run(self, last_status: i32) -> bool {
        match self {
            ChainOp::Norm => true,
            ChainOp::And => last_status == 0,
            ChainOp::Or => last_status != 0,
        }
    }
}

/// One chain-operator-delimited command unit within a single input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// The operator that preceded this segment.
    pub op: ChainOp,
    /// Command name followed by its arguments, not yet expanded.
    pub words: Vec<String>,
}

struct SegmentBuilder {
    tokens: std::vec::IntoIter<Token>,
    op: ChainOp,
    words: Vec<String>,
    out: Vec<Segment>,
}

impl SegmentBuilder {
    fn from(tokens: Vec<Token>) -> Self {
        SegmentBuilder {
            tokens: tokens.into_iter(),
            op: ChainOp::Norm,
            words: Vec::new(),
            out: Vec::new(),
        }
    }

    fn build(mut self) -> Vec<Segment> {
        while let Some(token) = self.tokens.next() {
            match token {
                Token::Word(w) => self.words.push(w),
                Token::Semicolon => self.close(ChainOp::Norm),
                Token::AndIf => self.close(ChainOp::And),
                Token::OrIf => self.close(ChainOp::Or),
            }
        }
        self.close(ChainOp::Norm);
        self.out
    }

    /// Ends the current segment and tags the next one with `next`.
    /// Empty segments are dropped; the next segment takes the latest operator.
    fn close(&mut self, next: ChainOp) {
        if !self.words.is_empty() {
            self.out.push(Segment {
                op: self.op,
                words: std::mem::take(&mut self.words),
            });
        }
        self.op = next;
    }
}

/// Groups a flat token stream into operator-tagged segments.
pub fn construct_segments(tokens: Vec<Token>) -> Vec<Segment> {
    SegmentBuilder::from(tokens).build()
}

/// Lexes `line` and groups it into segments.
pub fn parse_line(line: &str) -> Result<Vec<Segment>, LexingError> {
    Ok(construct_segments(lexer::split_into_tokens(line)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(op: ChainOp, words: &[&str]) -> Segment {
        Segment {
            op,
            words: words.iter().map(|w| w.to_string()).collect(),
        }
    }

    #[test]
    fn test_plain_line_is_one_norm_segment() {
        for line in ["ls", "ls -l /tmp", "  echo   a b c  ", "echo a&b|c"] {
            let segments = parse_line(line).unwrap();
            assert_eq!(segments.len(), 1, "line {:?}", line);
            assert_eq!(segments[0].op, ChainOp::Norm);
        }
    }

    #[test]
    fn test_operators_tag_following_segment() {
        let segments = parse_line("false ; echo A && echo B || echo C").unwrap();
        assert_eq!(
            segments,
            vec![
                seg(ChainOp::Norm, &["false"]),
                seg(ChainOp::Norm, &["echo", "A"]),
                seg(ChainOp::And, &["echo", "B"]),
                seg(ChainOp::Or, &["echo", "C"]),
            ]
        );
    }

    #[test]
    fn test_empty_segments_dropped() {
        let segments = parse_line(";; ls ;&& pwd ;").unwrap();
        assert_eq!(
            segments,
            vec![seg(ChainOp::Norm, &["ls"]), seg(ChainOp::And, &["pwd"])]
        );
    }

    #[test]
    fn test_empty_line_has_no_segments() {
        assert!(parse_line("").unwrap().is_empty());
        assert!(parse_line("   # comment").unwrap().is_empty());
    }

    #[test]
    fn test_should_run() {
        assert!(ChainOp::Norm.should_run(1));
        assert!(ChainOp::And.should_run(0));
        assert!(!ChainOp::And.should_run(1));
        assert!(ChainOp::Or.should_run(2));
        assert!(!ChainOp::Or.should_run(0));
    }
}
