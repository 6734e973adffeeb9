//! Operator console: progress lines and the y/N confirmation prompt.
//!
//! Workflows write to a [`Console`] instead of stdout directly so the
//! interactive gate can be driven from tests.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};

use crate::Result;

/// Human-facing input and output for an interactive command.
#[async_trait]
pub trait Console: Send {
    /// Print a line to standard output
    fn println(&mut self, msg: &str);

    /// Print a line to standard error
    fn errorln(&mut self, msg: &str);

    /// Print without a trailing newline and flush, for prompts
    async fn prompt(&mut self, msg: &str) -> Result<()>;

    /// Read one line of input with surrounding whitespace trimmed
    async fn read_line(&mut self) -> Result<String>;
}

/// Console bound to the process's stdin, stdout and stderr.
pub struct StdConsole {
    stdin: BufReader<Stdin>,
}

impl StdConsole {
    /// Create a console over the process streams
    pub fn new() -> Self {
        Self {
            stdin: BufReader::new(tokio::io::stdin()),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for StdConsole {
    fn println(&mut self, msg: &str) {
        println!("{msg}");
    }

    fn errorln(&mut self, msg: &str) {
        eprintln!("{msg}");
    }

    async fn prompt(&mut self, msg: &str) -> Result<()> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(msg.as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String> {
        let mut input = String::new();
        self.stdin.read_line(&mut input).await?;
        Ok(input.trim().to_string())
    }
}

/// Whether operator input confirms an action. Only `y` and `yes`
/// (case-insensitive) count; everything else, including empty input, declines.
pub fn is_affirmative(input: &str) -> bool {
    let input = input.trim();
    input.eq_ignore_ascii_case("y") || input.eq_ignore_ascii_case("yes")
}

/// Show `question`, read one line and report whether it was affirmative.
pub async fn confirm(console: &mut dyn Console, question: &str) -> Result<bool> {
    console.prompt(question).await?;
    let input = match console.read_line().await {
        Ok(input) => input,
        Err(e) => {
            console.errorln("Failed to read user input");
            return Err(e);
        }
    };
    Ok(is_affirmative(&input))
}

#[cfg(any(test, feature = "testing"))]
pub use scripted::ScriptedConsole;

#[cfg(any(test, feature = "testing"))]
mod scripted {
    use std::collections::VecDeque;

    use async_trait::async_trait;

    use super::Console;
    use crate::Result;

    /// Console that replays canned input and records everything written.
    #[derive(Debug, Default)]
    pub struct ScriptedConsole {
        input: VecDeque<String>,
        /// Lines written with `println`
        pub stdout: Vec<String>,
        /// Lines written with `errorln`
        pub stderr: Vec<String>,
        /// Prompts shown, in order
        pub prompts: Vec<String>,
    }

    impl ScriptedConsole {
        /// Console that answers successive reads with `answers`
        pub fn with_input<I, S>(answers: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                input: answers.into_iter().map(Into::into).collect(),
                ..Default::default()
            }
        }

        /// Whether any stdout line contains `needle`
        pub fn printed(&self, needle: &str) -> bool {
            self.stdout.iter().any(|l| l.contains(needle))
        }

        /// Whether any stderr line contains `needle`
        pub fn warned(&self, needle: &str) -> bool {
            self.stderr.iter().any(|l| l.contains(needle))
        }
    }

    #[async_trait]
    impl Console for ScriptedConsole {
        fn println(&mut self, msg: &str) {
            self.stdout.push(msg.to_string());
        }

        fn errorln(&mut self, msg: &str) {
            self.stderr.push(msg.to_string());
        }

        async fn prompt(&mut self, msg: &str) -> Result<()> {
            self.prompts.push(msg.to_string());
            Ok(())
        }

        async fn read_line(&mut self) -> Result<String> {
            self.input.pop_front().map(|s| s.trim().to_string()).ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "no scripted input")
                    .into()
            })
        }
    }
}
