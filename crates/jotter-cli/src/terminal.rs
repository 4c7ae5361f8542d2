//! Line-oriented terminal I/O and the presenters built on it.

use std::io::{self, BufRead, Write};

use jotter_core::screens::{ConfirmPrompt, Presenter};
use tokio::sync::{mpsc, Mutex};

const LINE_BUFFER: usize = 64;

/// Source of input lines shared by the app loop and its prompts.
pub struct Terminal {
    lines: Mutex<mpsc::Receiver<String>>,
    prompts: std::sync::Mutex<Box<dyn Write + Send>>,
}

impl Terminal {
    /// Read stdin on a dedicated thread so the app loop can `select!` on it.
    pub fn stdin() -> Self {
        let (sender, receiver) = mpsc::channel(LINE_BUFFER);
        std::thread::spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if sender.blocking_send(line).is_err() {
                    break;
                }
            }
        });
        Self {
            lines: Mutex::new(receiver),
            prompts: std::sync::Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Scripted input; reads return `None` once the lines run out.
    pub fn scripted<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines = lines.into_iter().map(Into::into).collect::<Vec<String>>();
        let (sender, receiver) = mpsc::channel(lines.len().max(1));
        for line in lines {
            if sender.try_send(line).is_err() {
                break;
            }
        }
        Self {
            lines: Mutex::new(receiver),
            prompts: std::sync::Mutex::new(Box::new(io::sink())),
        }
    }

    /// Send prompt text somewhere other than the default.
    #[must_use]
    pub fn with_prompt_output(self, output: impl Write + Send + 'static) -> Self {
        Self {
            prompts: std::sync::Mutex::new(Box::new(output)),
            ..self
        }
    }

    /// Next line without its terminator. `None` at end of input.
    pub async fn read_line(&self) -> Option<String> {
        let mut lines = self.lines.lock().await;
        lines
            .recv()
            .await
            .map(|line| line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Write `text` without a newline and flush it so it shows before input is read.
    pub fn show_prompt(&self, text: &str) -> io::Result<()> {
        let mut output = self
            .prompts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        output.write_all(text.as_bytes())?;
        output.flush()
    }

    pub async fn prompt(&self, label: &str) -> io::Result<Option<String>> {
        self.show_prompt(&format!("{label}: "))?;
        Ok(self.read_line().await)
    }
}

/// Alerts go to stdout; confirmations read the answer from the terminal.
pub struct TerminalPresenter<'a> {
    terminal: &'a Terminal,
}

impl<'a> TerminalPresenter<'a> {
    pub const fn new(terminal: &'a Terminal) -> Self {
        Self { terminal }
    }
}

impl Presenter for TerminalPresenter<'_> {
    fn alert(&self, title: &str, message: &str) {
        println!("[{title}] {message}");
    }

    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        println!("{}", prompt.title);
        println!("{}", prompt.message);
        let label = format!("{} / {}", prompt.cancel_label, prompt.confirm_label);
        match self.terminal.prompt(&label).await {
            Ok(Some(answer)) => is_confirming_answer(&answer, prompt),
            Ok(None) => false,
            Err(error) => {
                tracing::warn!("Failed to show confirmation prompt: {}", error);
                false
            }
        }
    }
}

/// Non-interactive presenter: alerts go to stderr, confirmations are accepted.
pub struct AssumeYes;

impl Presenter for AssumeYes {
    fn alert(&self, title: &str, message: &str) {
        eprintln!("[{title}] {message}");
    }

    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        tracing::debug!(title = %prompt.title, "confirmation assumed");
        true
    }
}

/// Only the confirming label (or its first letter) confirms; anything else cancels.
pub fn is_confirming_answer(answer: &str, prompt: &ConfirmPrompt) -> bool {
    let answer = answer.trim().to_lowercase();
    let label = prompt.confirm_label.to_lowercase();
    if answer.is_empty() {
        return false;
    }
    answer == label || (answer.chars().count() == 1 && label.starts_with(&answer))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn only_the_confirm_label_confirms() {
        let prompt = ConfirmPrompt::delete_note();
        assert!(is_confirming_answer("Delete", &prompt));
        assert!(is_confirming_answer(" d ", &prompt));
        assert!(!is_confirming_answer("", &prompt));
        assert!(!is_confirming_answer("cancel", &prompt));
        assert!(!is_confirming_answer("del", &prompt));
        assert!(!is_confirming_answer("yes", &prompt));
    }

    #[tokio::test]
    async fn scripted_terminal_yields_lines_then_ends() {
        let terminal = Terminal::scripted(["first\r", "second"]);
        assert_eq!(terminal.read_line().await.as_deref(), Some("first"));
        assert_eq!(terminal.read_line().await.as_deref(), Some("second"));
        assert_eq!(terminal.read_line().await, None);
    }

    #[tokio::test]
    async fn confirm_reads_the_answer() {
        let terminal = Terminal::scripted(["Cancel", "delete"]);
        let presenter = TerminalPresenter::new(&terminal);
        let prompt = ConfirmPrompt::delete_note();
        assert!(!presenter.confirm(&prompt).await);
        assert!(presenter.confirm(&prompt).await);
        assert!(!presenter.confirm(&prompt).await);
    }
}
