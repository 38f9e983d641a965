//! Interactive chat loop: the presentation layer over the answering pipeline.
//!
//! The REPL owns the [`ChatSession`] and lends it to the orchestrator for each
//! question. Lines starting with `/` are commands; anything else is a question.

use std::io::{self, BufRead, Write};

use milkdoc_chat::{category_choices, AnsweringOrchestrator, CategoryCatalog, ChatSession, TurnOutcome};
use milkdoc_core::types::ALL_CATEGORIES;

pub const DISCLAIMER: &str = "\
The information provided is taken from various reference sources. It is provided as a guideline.
No responsibility can be taken by the author or BfN for the way in which the information is used.
Clinical decisions remain the responsibility of medical and breastfeeding practitioners.
The data presented here is intended to provide some information but cannot replace input from professionals.";

const HELP: &str = "\
Commands:
  /reset            start over with an empty conversation
  /model [ID]       show or select the completion model
  /category [NAME]  show or select the category filter (ALL for none)
  /categories       list document categories
  /models           list completion models
  /history          print the conversation so far
  /remember         toggle use of chat history
  /debug            toggle debug output
  /help             show this message
  /quit             leave";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Question(String),
    Reset,
    Model(Option<String>),
    Category(Option<String>),
    Categories,
    Models,
    History,
    Remember,
    Debug,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Self::Question(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg.trim().to_string()).filter(|a| !a.is_empty())),
            None => (rest, None),
        };
        match name {
            "reset" => Self::Reset,
            "model" => Self::Model(arg),
            "category" => Self::Category(arg),
            "categories" => Self::Categories,
            "models" => Self::Models,
            "history" => Self::History,
            "remember" => Self::Remember,
            "debug" => Self::Debug,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Write an answer followed by its document links, plus debug artifacts
/// when requested.
pub fn render_outcome<W: Write>(out: &mut W, outcome: &TurnOutcome, debug: bool) -> io::Result<()> {
    writeln!(out, "{}", outcome.answer)?;
    if let Some(docs) = outcome.docs_line() {
        writeln!(out)?;
        writeln!(out, "{}", docs)?;
    }
    if debug {
        if let Some(query) = &outcome.reformulated_query {
            writeln!(out, "[debug] reformulated query: {}", query)?;
        }
        let raw = serde_json::to_string_pretty(&outcome.raw_retrieval)
            .unwrap_or_else(|_| outcome.raw_retrieval.to_string());
        writeln!(out, "[debug] search response:\n{}", raw)?;
        let stages = serde_json::to_string(&outcome.stages).unwrap_or_default();
        writeln!(out, "[debug] stages: {}", stages)?;
    }
    Ok(())
}

pub struct Repl<'a> {
    orchestrator: &'a AnsweringOrchestrator,
    catalog: &'a dyn CategoryCatalog,
    session: ChatSession,
}

impl<'a> Repl<'a> {
    pub fn new(
        orchestrator: &'a AnsweringOrchestrator,
        catalog: &'a dyn CategoryCatalog,
        session: ChatSession,
    ) -> Self {
        Self {
            orchestrator,
            catalog,
            session,
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Read lines from `input` until end of input or `/quit`.
    pub async fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", DISCLAIMER)?;
        writeln!(out)?;
        self.write_selection(out)?;
        writeln!(out, "Type /help for commands.")?;

        let mut lines = input.lines();
        loop {
            write!(out, "> ")?;
            out.flush()?;
            let Some(line) = lines.next() else {
                break;
            };
            if !self.handle(ReplCommand::parse(&line?), out).await? {
                break;
            }
        }
        writeln!(out)?;
        Ok(())
    }

    /// Execute one command. Returns `false` when the loop should stop.
    async fn handle<W: Write>(&mut self, command: ReplCommand, out: &mut W) -> io::Result<bool> {
        match command {
            ReplCommand::Empty => {}
            ReplCommand::Quit => return Ok(false),
            ReplCommand::Question(question) => {
                match self.orchestrator.answer(&mut self.session, &question).await {
                    Ok(outcome) => render_outcome(out, &outcome, self.session.config.debug)?,
                    Err(e) => writeln!(out, "Error: {}", e)?,
                }
            }
            ReplCommand::Reset => {
                self.session.reset();
                writeln!(out, "Conversation cleared.")?;
            }
            ReplCommand::Model(None) => writeln!(out, "Model: {}", self.session.config.model)?,
            ReplCommand::Model(Some(model)) => match self.session.config.select_model(&model) {
                Ok(()) => writeln!(out, "Model: {}", model)?,
                Err(e) => writeln!(out, "Error: {}", e)?,
            },
            ReplCommand::Category(None) => {
                writeln!(out, "Category: {}", self.session.config.category)?
            }
            ReplCommand::Category(Some(label)) => self.select_category(&label, out).await?,
            ReplCommand::Categories => match category_choices(self.catalog).await {
                Ok(choices) => {
                    for choice in choices {
                        writeln!(out, "  {}", choice)?;
                    }
                }
                Err(e) => writeln!(out, "Error: {}", e)?,
            },
            ReplCommand::Models => {
                for model in self.session.config.available_models() {
                    let marker = if *model == self.session.config.model { "*" } else { " " };
                    writeln!(out, "{} {}", marker, model)?;
                }
            }
            ReplCommand::History => {
                if self.session.transcript.is_empty() {
                    writeln!(out, "(no messages)")?;
                }
                for turn in self.session.transcript.turns() {
                    writeln!(out, "{}: {}", turn.role, turn.content)?;
                }
            }
            ReplCommand::Remember => {
                self.session.config.use_chat_history = !self.session.config.use_chat_history;
                let state = if self.session.config.use_chat_history { "on" } else { "off" };
                writeln!(out, "Chat history {}.", state)?;
            }
            ReplCommand::Debug => {
                self.session.config.debug = !self.session.config.debug;
                let state = if self.session.config.debug { "on" } else { "off" };
                writeln!(out, "Debug output {}.", state)?;
            }
            ReplCommand::Help => writeln!(out, "{}", HELP)?,
            ReplCommand::Unknown(name) => {
                writeln!(out, "Unknown command /{}. Type /help for commands.", name)?
            }
        }
        Ok(true)
    }

    async fn select_category<W: Write>(&mut self, label: &str, out: &mut W) -> io::Result<()> {
        if label != ALL_CATEGORIES {
            match category_choices(self.catalog).await {
                Ok(choices) if !choices.iter().any(|c| c == label) => {
                    return writeln!(out, "Unknown category: {}", label);
                }
                Ok(_) => {}
                Err(e) => return writeln!(out, "Error: {}", e),
            }
        }
        self.session.config.select_category(label);
        writeln!(out, "Category: {}", self.session.config.category)
    }

    fn write_selection<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "Model: {}  Category: {}",
            self.session.config.model, self.session.config.category
        )
    }
}
