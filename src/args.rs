use std::{iter::Peekable, str::CharIndices};

/// Iterates over the whitespace-separated arguments of a command line.
///
/// Runs of whitespace separate arguments and no quoting is recognized. If the line ends in
/// whitespace after at least one argument, a final empty argument is produced, which is what
/// completion expects while the user is about to type a new argument.
pub struct ArgumentTraverser<'cmd> {
    command: &'cmd str,
    chars: Peekable<CharIndices<'cmd>>,
    anchor: usize,
    yielded_any: bool,
    done: bool,
}

impl<'cmd> ArgumentTraverser<'cmd> {
    /// Creates a traverser over the given command line.
    pub fn new(command: &'cmd str) -> Self {
        let mut traverser = ArgumentTraverser {
            command,
            chars: command.char_indices().peekable(),
            anchor: 0,
            yielded_any: false,
            done: false,
        };
        traverser.skip_leading_whitespace();
        traverser
    }

    /// Returns the unread portion of the line, starting at the next argument.
    pub fn remaining(&mut self) -> &'cmd str {
        self.skip_leading_whitespace();
        match self.chars.peek() {
            Some(&(index, _)) => &self.command[index ..],
            None => "",
        }
    }

    /// Returns the start of the argument which was last read.
    pub fn anchor(&self) -> usize {
        self.anchor
    }

    fn skip_leading_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some((_, ch)) if ch.is_whitespace()) {
            self.chars.next();
        }
    }
}

impl<'cmd> Iterator for ArgumentTraverser<'cmd> {
    type Item = &'cmd str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.skip_leading_whitespace();

        let start = match self.chars.peek() {
            Some(&(index, _)) => index,
            None => {
                self.done = true;
                // Trailing whitespace opens a new, still empty argument
                let trailing = self.command.ends_with(char::is_whitespace);
                return if self.yielded_any && trailing {
                    self.anchor = self.command.len();
                    Some("")
                } else {
                    None
                };
            }
        };

        let end = loop {
            match self.chars.peek() {
                Some(&(index, ch)) if ch.is_whitespace() => break index,
                Some(_) => {
                    self.chars.next();
                }
                None => break self.command.len(),
            }
        };

        self.anchor = start;
        self.yielded_any = true;
        Some(&self.command[start .. end])
    }
}

/// Splits a command line into owned arguments with [`ArgumentTraverser`].
pub fn split_arguments(command: &str) -> Vec<String> {
    ArgumentTraverser::new(command).map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace_runs() {
        assert_eq!(split_arguments("internal  player1\tx"), vec![
            "internal", "player1", "x"
        ]);
        assert_eq!(split_arguments("   lead"), vec!["lead"]);
    }

    #[test]
    fn trailing_whitespace_opens_empty_argument() {
        assert_eq!(split_arguments("internal "), vec!["internal", ""]);
        assert_eq!(split_arguments("internal   "), vec!["internal", ""]);
    }

    #[test]
    fn blank_lines_have_no_arguments() {
        assert!(split_arguments("").is_empty());
        assert!(split_arguments("    ").is_empty());
    }

    #[test]
    fn remaining_and_anchor() {
        let mut args = ArgumentTraverser::new("a bb ccc");
        assert_eq!(args.next(), Some("a"));
        assert_eq!(args.next(), Some("bb"));
        assert_eq!(args.anchor(), 2);
        assert_eq!(args.remaining(), "ccc");
        assert_eq!(args.next(), Some("ccc"));
        assert_eq!(args.next(), None);
        assert_eq!(args.next(), None);
    }
}
