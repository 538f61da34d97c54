//! Groups a token stream into a [`Pipeline`] of [`Stage`]s, extracting each
//! stage's redirections from its word list.

use crate::error::ParseError;
use crate::parser::tokens::{RedirectMode, Token};

/// A single command within a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stage {
    /// Argument words, `argv[0]` is the command name. May be empty for a
    /// redirection-only stage such as `> only.txt`.
    pub argv: Vec<String>,
    /// Redirections in source order; later entries on the same `target_fd`
    /// override earlier ones when applied.
    pub redirs: Vec<(i32, RedirectMode, String)>,
}

impl Stage {
    pub fn is_empty_noop(&self) -> bool {
        self.argv.is_empty()
    }
}

/// An ordered, non-empty sequence of pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
}

impl Pipeline {
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// True when this is a single stage with no pipe — the only shape
    /// eligible for the in-process builtin fast path.
    pub fn is_single_stage(&self) -> bool {
        self.stages.len() == 1
    }
}

/// Split `tokens` on `|` and extract redirections from each resulting
/// segment.
pub fn parse(tokens: Vec<Token>) -> Result<Pipeline, ParseError> {
    let segments = split_on_pipe(tokens)?;
    let stages = segments
        .into_iter()
        .map(parse_stage)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Pipeline { stages })
}

fn split_on_pipe(tokens: Vec<Token>) -> Result<Vec<Vec<Token>>, ParseError> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    let mut saw_any_token = false;
    let mut last_was_pipe = true; // true at start rejects a leading `|`

    for token in tokens {
        saw_any_token = true;
        if matches!(token, Token::Pipe) {
            if current.is_empty() {
                return Err(ParseError::EmptyPipelineSegment);
            }
            segments.push(std::mem::take(&mut current));
            last_was_pipe = true;
        } else {
            current.push(token);
            last_was_pipe = false;
        }
    }

    if last_was_pipe && saw_any_token {
        return Err(ParseError::EmptyPipelineSegment);
    }
    if !current.is_empty() {
        segments.push(current);
    }
    if segments.is_empty() {
        segments.push(Vec::new());
    }
    Ok(segments)
}

fn parse_stage(tokens: Vec<Token>) -> Result<Stage, ParseError> {
    let mut argv = Vec::new();
    let mut redirs = Vec::new();
    let mut iter = tokens.into_iter();

    while let Some(token) = iter.next() {
        match token {
            Token::Word(w) => argv.push(w),
            Token::Redirect(op) => {
                let filename = match iter.next() {
                    Some(Token::Word(name)) => name,
                    _ => return Err(ParseError::MissingFilename),
                };
                redirs.push((op.fd, op.mode, filename));
            }
            Token::Pipe => unreachable!("pipes are split out before parse_stage"),
        }
    }

    if argv.is_empty() && redirs.is_empty() {
        return Err(ParseError::EmptyCommand);
    }
    Ok(Stage { argv, redirs })
}
