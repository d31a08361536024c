//! Interactive registration
//!
//! Walks a flow one step at a time on the terminal. Every answer goes through
//! the session, so drafts, validation and conditional fields behave exactly
//! as in any other front end. `:back` returns to the previous step and
//! `:quit` leaves with the draft kept.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{bail, Result};
use colored::Colorize;
use connecta_forms::application::suggestions::collection_for;
use connecta_forms::application::{
    ErrorBoundary, RegistrationSession, RemoteSuggester, Rendered, StepOutcome, SubmissionAdapter, SubmitOutcome,
    Suggestions,
};
use connecta_forms::ports::{DraftStore, SystemClock};
use connecta_forms::wizard::{FieldKind, FieldSpec, Step};
use connecta_forms::{FieldValue, FlowKind};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use super::Context;
use crate::output;

enum Answer {
    Value(String),
    Back,
    Quit,
}

struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    async fn ask(&mut self, question: &str) -> Result<Answer> {
        println!("{}", question.bold());
        print!("> ");
        use std::io::Write as _;
        std::io::stdout().flush()?;
        let Some(line) = self.lines.next_line().await? else {
            return Ok(Answer::Quit);
        };
        Ok(match line.trim() {
            ":back" => Answer::Back,
            ":quit" => Answer::Quit,
            other => Answer::Value(other.to_string()),
        })
    }
}

fn current(session: &RegistrationSession) -> Step {
    session.with_wizard(|w| w.current_step())
}

fn render_header(session: &RegistrationSession) -> Step {
    let view = session.view();
    let step = current(session);
    println!();
    println!(
        "{} {}",
        format!("Step {} of {} ({:.0}%)", view.step + 1, view.total_steps, view.progress).dimmed(),
        step.title.cyan().bold()
    );
    step
}

fn describe(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(s) => s.clone(),
        FieldValue::Flag(b) => if *b { "yes" } else { "no" }.into(),
        FieldValue::Many(items) => items.join(", "),
    }
}

/// Match a typed answer against an option list by number, value or label.
fn pick_option(spec: &FieldSpec, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<usize>() {
        return spec.options.get(n.checked_sub(1)?).map(|o| o.value.clone());
    }
    spec.options
        .iter()
        .find(|o| o.value.eq_ignore_ascii_case(raw) || o.label.eq_ignore_ascii_case(raw))
        .map(|o| o.value.clone())
}

fn parse_answer(spec: &FieldSpec, raw: &str) -> Option<FieldValue> {
    match spec.kind {
        FieldKind::Checkbox => match raw.to_lowercase().as_str() {
            "y" | "yes" => Some(FieldValue::Flag(true)),
            "n" | "no" => Some(FieldValue::Flag(false)),
            _ => None,
        },
        FieldKind::Select => pick_option(spec, raw).map(FieldValue::Text),
        FieldKind::MultiSelect => {
            let picked: Option<Vec<String>> = raw
                .split(',')
                .filter(|part| !part.trim().is_empty())
                .map(|part| pick_option(spec, part))
                .collect();
            picked.map(FieldValue::Many)
        }
        _ => Some(FieldValue::Text(raw.to_string())),
    }
}

fn field_question(spec: &FieldSpec, current: Option<&FieldValue>) -> String {
    let mut question = spec.label.clone();
    if !spec.options.is_empty() {
        let listed: Vec<String> = spec
            .options
            .iter()
            .enumerate()
            .map(|(i, o)| format!("  {}. {}", i + 1, o.label))
            .collect();
        question = format!("{}\n{}", question, listed.join("\n"));
    }
    match spec.kind {
        FieldKind::MultiSelect => question.push_str("\n(comma-separated)"),
        FieldKind::Checkbox => question.push_str(" [y/n]"),
        FieldKind::Date => question.push_str(" (YYYY-MM-DD)"),
        _ => {}
    }
    if let Some(value) = current.filter(|v| !v.is_blank()) {
        question = format!("{}\n[enter keeps: {}]", question, describe(value));
    }
    question
}

enum StepResult {
    Filled,
    Back,
    Quit,
}

struct Runner {
    session: Arc<RegistrationSession>,
    suggester: RemoteSuggester,
    prompt: Prompt,
}

impl Runner {
    async fn choose(&mut self) -> Result<StepResult> {
        let Some(discriminator) = self.session.flow().definition.discriminator().cloned() else {
            bail!("flow has no choice step");
        };
        loop {
            let listed: Vec<String> = discriminator
                .branches
                .iter()
                .enumerate()
                .map(|(i, b)| format!("  {}. {}", i + 1, b.label))
                .collect();
            let question = format!("{}\n{}", discriminator.question, listed.join("\n"));
            let raw = match self.prompt.ask(&question).await? {
                Answer::Value(raw) => raw,
                Answer::Back => continue,
                Answer::Quit => return Ok(StepResult::Quit),
            };
            let picked = raw
                .parse::<usize>()
                .ok()
                .and_then(|n| discriminator.branches.get(n.checked_sub(1)?))
                .or_else(|| discriminator.branch(&raw));
            match picked {
                Some(branch) => {
                    self.session.choose(&branch.value)?;
                    return Ok(StepResult::Filled);
                }
                None => output::field_error("choice", "Please pick one of the listed options"),
            }
        }
    }

    async fn suggest(&mut self, spec: &FieldSpec, typed: &str) -> Result<Option<String>> {
        let education = self.session.with_wizard(|w| w.form().text("educationDegree").to_string());
        let names = match self.suggester.suggest(collection_for(&education), typed).await {
            Suggestions::Found(names) if !names.is_empty() => names,
            _ => return Ok(Some(typed.to_string())),
        };
        let listed: Vec<String> = names.iter().enumerate().map(|(i, n)| format!("  {}. {}", i + 1, n)).collect();
        let question = format!("Did you mean ({}):\n{}\n[enter keeps: {}]", spec.label, listed.join("\n"), typed);
        Ok(match self.prompt.ask(&question).await? {
            Answer::Value(raw) if raw.is_empty() => Some(typed.to_string()),
            Answer::Value(raw) => Some(
                raw.parse::<usize>()
                    .ok()
                    .and_then(|n| names.get(n.checked_sub(1)?).cloned())
                    .unwrap_or(raw),
            ),
            Answer::Back | Answer::Quit => None,
        })
    }

    /// Prompt one field until it validates.
    async fn fill_field(&mut self, name: &str) -> Result<Option<StepResult>> {
        let definition = self.session.flow().definition.clone();
        let Some(spec) = definition.field(name) else {
            return Ok(None);
        };
        loop {
            let existing = self.session.with_wizard(|w| w.form().get(name).cloned());
            let raw = match self.prompt.ask(&field_question(spec, existing.as_ref())).await? {
                Answer::Value(raw) => raw,
                Answer::Back => return Ok(Some(StepResult::Back)),
                Answer::Quit => return Ok(Some(StepResult::Quit)),
            };

            let value = if raw.is_empty() {
                existing.clone().unwrap_or_else(|| spec.default.clone())
            } else if spec.kind == FieldKind::Autocomplete {
                match self.suggest(spec, &raw).await? {
                    Some(text) => FieldValue::Text(text),
                    None => continue,
                }
            } else {
                match parse_answer(spec, &raw) {
                    Some(value) => value,
                    None => {
                        output::field_error(&spec.label, "Please pick one of the listed options");
                        continue;
                    }
                }
            };

            let cleared = self.session.set_value(name, value)?;
            for field in cleared {
                println!("    {}", format!("{} no longer applies and was cleared", field).dimmed());
            }
            match self.session.blur(name)? {
                Some(message) => output::field_error(&spec.label, &message),
                None => return Ok(None),
            }
        }
    }

    /// Prompt each visible field of the current step once; fields revealed
    /// by earlier answers are picked up as they appear.
    async fn fill_step(&mut self) -> Result<StepResult> {
        let mut asked: HashSet<String> = HashSet::new();
        loop {
            let next = current(&self.session).fields.into_iter().find(|f| !asked.contains(f));
            let Some(field) = next else {
                return Ok(StepResult::Filled);
            };
            if let Some(result) = self.fill_field(&field).await? {
                return Ok(result);
            }
            asked.insert(field);
        }
    }

    async fn submit(&mut self) -> Result<bool> {
        match self.session.submit().await {
            SubmitOutcome::Submitted(notice) => {
                output::notice(&notice);
                Ok(true)
            }
            SubmitOutcome::Failed(notice) => {
                output::notice(&notice);
                let view = self.session.view();
                for (field, message) in view.errors.iter() {
                    output::field_error(field, message);
                }
                Ok(false)
            }
            SubmitOutcome::Refused(e) => {
                output::field_error("form", &e.to_string());
                Ok(false)
            }
            SubmitOutcome::AlreadySubmitting => Ok(false),
            SubmitOutcome::Detached => Ok(true),
        }
    }

    fn go_home(&self) {
        while let Ok(step) = self.session.retreat() {
            if step == 0 {
                break;
            }
        }
    }

    async fn run(&mut self, boundary: &ErrorBoundary) -> Result<()> {
        loop {
            let step = match boundary.render(|| render_header(&self.session)) {
                Rendered::Ok(step) => step,
                Rendered::Recovered(screen) => {
                    output::recovery(&screen);
                    match self.prompt.ask("[t]ry again / [g]o home").await? {
                        Answer::Value(a) if a.eq_ignore_ascii_case("g") => self.go_home(),
                        Answer::Quit => return Ok(()),
                        _ => {}
                    }
                    continue;
                }
            };

            let filled = if step.is_choice {
                self.choose().await?
            } else {
                self.fill_step().await?
            };
            match filled {
                StepResult::Quit => {
                    self.session.teardown();
                    println!("{}", "Progress saved. Run the same command to continue.".dimmed());
                    return Ok(());
                }
                StepResult::Back => {
                    self.session.retreat()?;
                    continue;
                }
                StepResult::Filled if step.is_choice => continue,
                StepResult::Filled => {}
            }

            match self.session.advance().await? {
                StepOutcome::Moved(_) | StepOutcome::ChoiceRequired => {}
                StepOutcome::Blocked(fields) => {
                    let view = self.session.view();
                    for field in fields {
                        output::field_error(&field, view.errors.get(&field).unwrap_or("Invalid value"));
                    }
                }
                StepOutcome::Notice(notice) => output::notice(&notice),
                StepOutcome::AtLastStep => {
                    if self.submit().await? {
                        return Ok(());
                    }
                }
                StepOutcome::Detached => return Ok(()),
            }
        }
    }
}

pub async fn handle(context: &Context, kind: FlowKind, fresh: bool) -> Result<()> {
    let flow = context.config.forms.flow(kind);
    let store = context.store()?;
    let drafts: Arc<dyn DraftStore> = Arc::new(context.drafts()?);
    let title = flow.definition.title.clone();
    let session = Arc::new(RegistrationSession::new(
        flow,
        Arc::new(SubmissionAdapter::new(store.clone())),
        drafts,
        Arc::new(SystemClock),
    ));

    println!("{}", title.magenta().bold());
    println!("{}", "Type :back for the previous step, :quit to stop.".dimmed());
    if fresh {
        session.clear_draft();
    } else if let Some(restored) = session.restore_draft() {
        let saved = restored.saved_at.format("%Y-%m-%d %H:%M UTC");
        if restored.stale {
            println!("{}", format!("Restored a draft from {} (over a week old).", saved).yellow());
        } else {
            println!("{}", format!("Restored your draft from {}.", saved).green());
        }
    }

    let mut runner = Runner {
        session,
        suggester: RemoteSuggester::new(store, context.config.forms.suggestion_settings()),
        prompt: Prompt::new(),
    };
    runner.run(&ErrorBoundary::new(context.dev)).await
}
