//! Operator resolver
//!
//! Some legacy values can only be disambiguated by a human. Steps ask
//! through a [`Resolver`], which the caller injects: the CLI backs it with
//! the terminal, tests with a canned table.

use std::io::{self, BufRead, Write};

/// Synchronous prompt → answer exchange
pub trait Resolver {
    /// Ask `prompt` and block until an answer is available
    ///
    /// # Errors
    /// Returns error if no answer can be obtained
    fn resolve(&mut self, prompt: &str) -> io::Result<String>;
}

impl<F> Resolver for F
where
    F: FnMut(&str) -> io::Result<String>,
{
    fn resolve(&mut self, prompt: &str) -> io::Result<String> {
        self(prompt)
    }
}

/// Resolver for runs that must not need an operator
///
/// Every prompt fails, which halts the step asking it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

impl Resolver for NoResolver {
    fn resolve(&mut self, prompt: &str) -> io::Result<String> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("no operator available to answer: {}", prompt.trim()),
        ))
    }
}

/// Resolver reading answers line by line
///
/// Writes the prompt to `output`, reads one line from `input`.
#[derive(Debug)]
pub struct TerminalResolver<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalResolver<R, W> {
    /// Create resolver over a reader/writer pair
    #[inline]
    #[must_use]
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl TerminalResolver<io::StdinLock<'static>, io::Stderr> {
    /// Resolver on the process terminal (prompts on stderr)
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Resolver for TerminalResolver<R, W> {
    fn resolve(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "operator input closed"));
        }
        Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn closure_resolver() {
        let mut resolver =
            |prompt: &str| -> io::Result<String> { Ok(format!("answer to {prompt}")) };
        assert_eq!(resolver.resolve("q").unwrap(), "answer to q");
    }

    #[test]
    fn no_resolver_fails() {
        let err = NoResolver.resolve("Type for \"BBNAPS1\"").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }

    #[test]
    fn terminal_resolver_reads_lines() {
        let mut output = Vec::new();
        let mut resolver = TerminalResolver::new(Cursor::new("2\r\n3\n"), &mut output);

        assert_eq!(resolver.resolve("first? ").unwrap(), "2");
        assert_eq!(resolver.resolve("second? ").unwrap(), "3");
        let err = resolver.resolve("third? ").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

        drop(resolver);
        assert_eq!(String::from_utf8(output).unwrap(), "first? second? third? ");
    }
}
