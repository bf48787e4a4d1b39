use crate::errors::Result;
use std::io::{BufRead, Write};

/// Interactive questions asked on the terminal
pub trait Prompt {
    fn ask(&mut self, question: &str) -> Result<String>;
    fn ask_secret(&mut self, question: &str) -> Result<String>;

    /// Ask a `[y/n]` question, anything but `y` is a no
    fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(&format!("{} [y/n]\n", question))?;
        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }
}

/// Questions go to stderr so that stdout only carries the report
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn ask(&mut self, question: &str) -> Result<String> {
        let mut stderr = std::io::stderr();
        stderr.write_all(question.as_bytes())?;
        stderr.flush()?;

        let mut answer = String::new();
        std::io::stdin().lock().read_line(&mut answer)?;
        Ok(answer.trim_end_matches(['\r', '\n']).to_string())
    }

    fn ask_secret(&mut self, question: &str) -> Result<String> {
        Ok(rpassword::prompt_password(question)?)
    }
}

/// Answers questions from a fixed script and records what was asked
#[cfg(test)]
#[derive(Default)]
pub struct ScriptedPrompt {
    pub answers: std::collections::VecDeque<String>,
    pub questions: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompt {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            questions: Vec::new(),
        }
    }

    fn next(&mut self, question: &str) -> Result<String> {
        self.questions.push(question.to_string());
        self.answers.pop_front().ok_or_else(|| {
            crate::errors::AppError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("no scripted answer for {:?}", question),
            ))
        })
    }
}

#[cfg(test)]
impl Prompt for ScriptedPrompt {
    fn ask(&mut self, question: &str) -> Result<String> {
        self.next(question)
    }

    fn ask_secret(&mut self, question: &str) -> Result<String> {
        self.next(question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_accepts_y_only() {
        let mut prompt = ScriptedPrompt::new(&["y", " Y \n", "yes", "n", ""]);

        assert!(prompt.confirm("Store?").unwrap());
        assert!(prompt.confirm("Store?").unwrap());
        assert!(!prompt.confirm("Store?").unwrap());
        assert!(!prompt.confirm("Store?").unwrap());
        assert!(!prompt.confirm("Store?").unwrap());
        assert_eq!(prompt.questions[0], "Store? [y/n]\n");
    }

    #[test]
    fn test_missing_answer_is_an_error() {
        let mut prompt = ScriptedPrompt::new(&[]);
        assert!(prompt.ask("Name: ").is_err());
    }
}
