use crate::error::{AggregatedError, ConstructionError};
use std::fmt;

/// Separates independent commands in the raw token stream.
pub const DELIMITER: char = ',';

/// One command invocation: a program followed by its arguments.
///
/// Never empty. The only way to build one is [`CommandGroup::new`], which
/// rejects an empty token list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandGroup {
    tokens: Vec<String>,
}

impl CommandGroup {
    pub fn new(tokens: Vec<String>) -> Result<Self, ConstructionError> {
        if tokens.is_empty() {
            return Err(ConstructionError::EmptyGroup);
        }
        Ok(Self { tokens })
    }

    /// The executable name, taken verbatim from the first token.
    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    /// Everything after the program.
    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

impl fmt::Display for CommandGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}

/// Result of a grouping pass: every item that could be built, plus the
/// failures of those that could not.
///
/// Both halves are always returned; deciding whether a non-empty error set
/// is fatal is left to the caller.
#[derive(Debug)]
pub struct Grouped<T> {
    pub items: Vec<T>,
    pub errors: AggregatedError,
}

impl<T> Grouped<T> {
    /// Fails if any group could not be constructed, discarding the rest.
    pub fn into_result(self) -> Result<Vec<T>, AggregatedError> {
        if self.errors.is_empty() {
            Ok(self.items)
        } else {
            Err(self.errors)
        }
    }
}

struct GroupBuilder<T, F> {
    pending: Vec<String>,
    items: Vec<T>,
    errors: AggregatedError,
    build: F,
}

impl<T, F> GroupBuilder<T, F>
where
    F: FnMut(Vec<String>) -> Result<T, ConstructionError>,
{
    fn new(build: F) -> Self {
        Self {
            pending: Vec::new(),
            items: Vec::new(),
            errors: AggregatedError::default(),
            build,
        }
    }

    fn feed(&mut self, token: String) {
        if !token.contains(DELIMITER) {
            self.pending.push(token);
            return;
        }

        // Every non-empty piece ends a group right where it stands.
        for piece in token.split(DELIMITER).filter(|piece| !piece.is_empty()) {
            self.pending.push(piece.to_string());
            self.close();
        }
    }

    /// Hand the pending buffer to the constructor. An empty buffer is dropped.
    fn close(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let tokens = std::mem::take(&mut self.pending);
        match (self.build)(tokens) {
            Ok(item) => self.items.push(item),
            Err(error) => self.errors.push(error),
        }
    }

    fn finish(mut self) -> Grouped<T> {
        self.close();
        Grouped {
            items: self.items,
            errors: self.errors,
        }
    }
}

/// Split `tokens` into command groups, building each one with `build`.
///
/// Scanning never stops on a construction failure: the error is recorded and
/// the remaining tokens are still grouped.
pub fn group_with<I, S, T, F>(tokens: I, build: F) -> Grouped<T>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    F: FnMut(Vec<String>) -> Result<T, ConstructionError>,
{
    let mut builder = GroupBuilder::new(build);
    for token in tokens {
        builder.feed(token.into());
    }
    builder.finish()
}

/// Split `tokens` into plain [`CommandGroup`]s.
pub fn group<I, S>(tokens: I) -> Grouped<CommandGroup>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    group_with(tokens, CommandGroup::new)
}

/// Flatten groups back into a token stream that [`group`] splits the same way.
///
/// The delimiter is glued to the last token of every group.
pub fn join(groups: &[CommandGroup]) -> Vec<String> {
    let mut tokens = Vec::new();
    for group in groups {
        let Some((last, init)) = group.tokens().split_last() else {
            continue;
        };
        tokens.extend(init.iter().cloned());
        tokens.push(format!("{last}{DELIMITER}"));
    }
    tokens
}
