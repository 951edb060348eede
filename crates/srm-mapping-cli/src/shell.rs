//! A small interactive shell for editing a mapping session.
//!
//! By default we use `rustyline` for line editing and tab completion.
//! A minimal stdin-based fallback exists behind `--no-default-features`.

use crate::render;
use anyhow::{anyhow, bail, Result};
use colored::Colorize;
use srm_mapping::{MappingSession, OntologyId, SessionOutcome, SrmId};
use std::fs;
use std::io;
use std::io::Read;
#[cfg(not(feature = "shell-rustyline"))]
use std::io::Write;
use std::path::Path;

#[cfg(feature = "shell-rustyline")]
const COMMANDS: &[&str] = &[
    "list", "pool", "edit", "pick", "abandon", "clear", "restore", "done", "cancel", "help",
    "exit",
];

pub fn cmd_shell(session: MappingSession) -> Result<()> {
    #[cfg(feature = "shell-rustyline")]
    {
        return cmd_shell_rustyline(session);
    }
    #[cfg(not(feature = "shell-rustyline"))]
    {
        return cmd_shell_simple(session);
    }
}

pub fn cmd_script(
    session: MappingSession,
    script: Option<&Path>,
    commands: &[String],
    continue_on_error: bool,
    quiet: bool,
) -> Result<()> {
    let mut state = ShellState::new(session);
    let mut lines: Vec<String> = Vec::new();

    if let Some(script_path) = script {
        let text = if script_path.as_os_str() == "-" {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        } else {
            fs::read_to_string(script_path)?
        };
        lines.extend(text.lines().map(str::to_string));
    }
    lines.extend(commands.iter().cloned());

    for (idx, raw_line) in lines.iter().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !quiet {
            println!("srm-map> {line}");
        }

        match execute_line(&mut state, line) {
            Ok(true) => break,
            Ok(false) => {}
            Err(e) if continue_on_error => {
                tracing::debug!(line = idx + 1, command = %line, "script command failed");
                report(&e);
            }
            Err(e) => return Err(anyhow!("script failed at line {}: {e}", idx + 1)),
        }
    }

    Ok(())
}

#[cfg(not(feature = "shell-rustyline"))]
fn cmd_shell_simple(session: MappingSession) -> Result<()> {
    let mut state = ShellState::new(session);
    print_banner(&state);

    let stdin = io::stdin();
    loop {
        print!("{}", prompt(&state).as_str().cyan().bold());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }

        match execute_line(&mut state, line.trim()) {
            Ok(true) => break,
            Ok(false) => {}
            Err(e) => report(&e),
        }
    }

    Ok(())
}

#[cfg(feature = "shell-rustyline")]
fn cmd_shell_rustyline(session: MappingSession) -> Result<()> {
    use rustyline::error::ReadlineError;
    use rustyline::Editor;

    let mut state = ShellState::new(session);
    print_banner(&state);

    let helper = ShellLineHelper::new(&state.session);
    let mut rl: Editor<ShellLineHelper, rustyline::history::DefaultHistory> =
        Editor::new().map_err(|e| anyhow!("failed to init rustyline: {e}"))?;
    rl.set_helper(Some(helper));

    loop {
        let line = match rl.readline(&prompt(&state)) {
            Ok(l) => l,
            Err(ReadlineError::Eof) => break,
            Err(ReadlineError::Interrupted) => continue,
            Err(e) => return Err(anyhow!("readline error: {e}")),
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        rl.add_history_entry(line)
            .map_err(|e| anyhow!("failed to record history: {e}"))?;

        match execute_line(&mut state, line) {
            Ok(true) => break,
            Ok(false) => {}
            Err(e) => report(&e),
        }
    }

    Ok(())
}

fn print_banner(state: &ShellState) {
    println!("{}", "SRM mapping shell".green().bold());
    println!("Type `help` for commands. Type `exit` to quit.\n");
    print!("{}", render::render_session(&state.session));
}

fn prompt(state: &ShellState) -> String {
    match state.session.selection() {
        Some(scope) => format!("srm-map [{}]> ", scope.target()),
        None => "srm-map> ".to_string(),
    }
}

/// Runs one input line. Returns `true` once the session has finished.
fn execute_line(state: &mut ShellState, line: &str) -> Result<bool> {
    match dispatch(state, &split_command_line(line))? {
        ShellControl::Continue => Ok(false),
        ShellControl::Exit(outcome) => {
            print_outcome(&outcome)?;
            Ok(true)
        }
    }
}

fn report(err: &anyhow::Error) {
    eprintln!("{} {err}", "error:".red().bold());
}

fn print_outcome(outcome: &SessionOutcome) -> Result<()> {
    match outcome {
        SessionOutcome::Done(mapping) => println!("{}", mapping.to_json_string()?),
        SessionOutcome::Cancelled => println!("{}", "cancelled".yellow()),
    }
    Ok(())
}

// =============================================================================
// Dispatch
// =============================================================================

struct ShellState {
    session: MappingSession,
}

impl ShellState {
    fn new(session: MappingSession) -> Self {
        Self { session }
    }
}

#[derive(Debug)]
enum ShellControl {
    Continue,
    Exit(SessionOutcome),
}

fn dispatch(state: &mut ShellState, tokens: &[String]) -> Result<ShellControl> {
    let Some((cmd, args)) = tokens.split_first() else {
        return Ok(ShellControl::Continue);
    };
    let session = &mut state.session;

    match cmd.as_str() {
        "help" | "?" => print!("{}", help_text()),
        "list" | "ls" => print!("{}", render::render_session(session)),
        "pool" => print!("{}", render::render_pool(session)),
        "edit" => {
            let id = srm_arg(args)?;
            match session.open_edit(&id)? {
                Some(scope) => print!("{}", render::render_dialog(scope)),
                None => {
                    let msg = format!("nothing to offer for `{id}`");
                    println!("{}", msg.as_str().yellow());
                }
            }
        }
        "pick" => {
            let chosen = pick_arg(session, args)?;
            let target = session
                .selection()
                .map(|scope| scope.target().clone())
                .ok_or_else(|| anyhow!("no selection is open; use `edit <srm-id>` first"))?;
            session.commit(chosen.clone())?;
            println!("{target} → {chosen}");
        }
        "abandon" => {
            if !session.abandon() {
                println!("{}", "no selection is open".dimmed());
            }
        }
        "clear" => {
            let id = srm_arg(args)?;
            session.clear(&id)?;
        }
        "restore" => {
            let id = srm_arg(args)?;
            session.restore_default(&id)?;
        }
        "done" => return Ok(ShellControl::Exit(session.done()?)),
        "cancel" | "exit" | "quit" => return Ok(ShellControl::Exit(session.cancel())),
        other => bail!("unknown command `{other}` (try `help`)"),
    }

    Ok(ShellControl::Continue)
}

fn srm_arg(args: &[String]) -> Result<SrmId> {
    match args {
        [id] => Ok(SrmId::new(id.as_str())),
        _ => bail!("expected exactly one SRM id"),
    }
}

/// Resolves the argument of `pick`. An offered id always wins; otherwise a
/// number selects the n-th offered choice (`pick 2`).
fn pick_arg(session: &MappingSession, args: &[String]) -> Result<OntologyId> {
    let [arg] = args else {
        bail!("expected a choice number or an ontology id");
    };
    if let Some(scope) = session.selection() {
        if let Some(choice) = scope.choices().iter().find(|c| c.as_str() == arg.as_str()) {
            return Ok(choice.clone());
        }
        if let Ok(n) = arg.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(|i| scope.choices().get(i))
                .cloned()
                .ok_or_else(|| {
                    anyhow!("choice {n} is out of range 1..={}", scope.choices().len())
                });
        }
    }
    Ok(OntologyId::new(arg.as_str())?)
}

fn help_text() -> String {
    [
        "list                 show the mapping table",
        "pool                 show assignable ontology ids",
        "edit <srm-id>        open the selection for an element",
        "pick <n|id>          commit a choice of the open selection",
        "abandon              close the selection without changes",
        "clear <srm-id>       remove an element's ontology id",
        "restore <srm-id>     restore an element's initial ontology id",
        "done                 finish and print the mapping",
        "cancel               finish without a mapping",
        "",
    ]
    .join("\n")
}

/// Splits a command line on whitespace. Single or double quotes group words
/// (`edit "my class"`, and `''` is an empty token); a backslash escapes the
/// next character.
fn split_command_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut token: Option<String> = None;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (None, '"' | '\'') => {
                quote = Some(c);
                token.get_or_insert_with(String::new);
            }
            (_, '\\') => token.get_or_insert_with(String::new).extend(chars.next()),
            (None, c) if c.is_whitespace() => tokens.extend(token.take()),
            (_, c) => token.get_or_insert_with(String::new).push(c),
        }
    }

    tokens.extend(token);
    tokens
}

// =============================================================================
// Tab completion (rustyline)
// =============================================================================

#[cfg(feature = "shell-rustyline")]
struct ShellLineHelper {
    commands: Vec<String>,
    srm_ids: Vec<String>,
    ontology_ids: Vec<String>,
}

#[cfg(feature = "shell-rustyline")]
impl ShellLineHelper {
    fn new(session: &MappingSession) -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
            srm_ids: session.mapping().keys().map(|id| id.to_string()).collect(),
            ontology_ids: session
                .store()
                .ontology_ids()
                .iter()
                .map(|id| id.to_string())
                .collect(),
        }
    }

    fn pairs_from_prefix(items: &[String], prefix: &str) -> Vec<rustyline::completion::Pair> {
        items
            .iter()
            .filter(|item| item.starts_with(prefix))
            .map(|item| rustyline::completion::Pair {
                display: item.clone(),
                replacement: item.clone(),
            })
            .collect()
    }
}

#[cfg(feature = "shell-rustyline")]
impl rustyline::Helper for ShellLineHelper {}

#[cfg(feature = "shell-rustyline")]
impl rustyline::highlight::Highlighter for ShellLineHelper {}

#[cfg(feature = "shell-rustyline")]
impl rustyline::hint::Hinter for ShellLineHelper {
    type Hint = String;
    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        None
    }
}

#[cfg(feature = "shell-rustyline")]
impl rustyline::validate::Validator for ShellLineHelper {}

#[cfg(feature = "shell-rustyline")]
impl rustyline::completion::Completer for ShellLineHelper {
    type Candidate = rustyline::completion::Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        let start = line[..pos]
            .char_indices()
            .rfind(|(_, c)| c.is_whitespace())
            .map_or(0, |(i, c)| i + c.len_utf8());
        let word = &line[start..pos];
        let tokens: Vec<&str> = line[..start].split_whitespace().collect();

        let items = match tokens.first() {
            None => &self.commands,
            Some(&("edit" | "clear" | "restore")) => &self.srm_ids,
            Some(&"pick") => &self.ontology_ids,
            Some(_) => return Ok((start, Vec::new())),
        };
        Ok((start, Self::pairs_from_prefix(items, word)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use srm_mapping::{Mapping, SchemaCatalog, SessionLabels};

    fn state() -> ShellState {
        let catalog = SchemaCatalog::builder()
            .class("c1", "A")
            .class("c2", "B")
            .build()
            .unwrap();
        let initial = Mapping::from_json_str(r#"{"c1": "x1", "c2": ""}"#).unwrap();
        let ids = ["x1", "x2", "x3"].map(|s| OntologyId::new(s).unwrap());
        ShellState::new(MappingSession::new(catalog, ids, initial, SessionLabels::default()).unwrap())
    }

    fn run(state: &mut ShellState, line: &str) -> Result<ShellControl> {
        dispatch(state, &split_command_line(line))
    }

    #[test]
    fn split_command_line_handles_quotes_and_escapes() {
        assert_eq!(split_command_line(r#"edit "my class""#), vec!["edit", "my class"]);
        assert_eq!(split_command_line(r"pick a\ b"), vec!["pick", "a b"]);
        assert!(split_command_line("   ").is_empty());
        assert_eq!(split_command_line("edit 'a \"b\"'"), vec!["edit", "a \"b\""]);
        assert_eq!(split_command_line("pick ''"), vec!["pick", ""]);
    }

    #[test]
    fn pick_by_number_and_by_id() {
        let mut state = state();
        run(&mut state, "edit c2").unwrap();
        run(&mut state, "pick 2").unwrap();
        assert_eq!(state.session.mapping().value(&"c2".into()).unwrap().as_str(), "x3");

        run(&mut state, "edit c2").unwrap();
        run(&mut state, "pick x2").unwrap();
        assert_eq!(state.session.mapping().value(&"c2".into()).unwrap().as_str(), "x2");
    }

    #[test]
    fn pick_prefers_offered_id_over_position() {
        let catalog = SchemaCatalog::builder()
            .class("c1", "A")
            .class("c2", "B")
            .build()
            .unwrap();
        let initial = Mapping::from_json_str(r#"{"c1": "1", "c2": ""}"#).unwrap();
        let ids = ["1", "2", "3"].map(|s| OntologyId::new(s).unwrap());
        let mut state = ShellState::new(
            MappingSession::new(catalog, ids, initial, SessionLabels::default()).unwrap(),
        );

        run(&mut state, "edit c2").unwrap();
        let offered: Vec<&str> = state
            .session
            .selection()
            .unwrap()
            .choices()
            .iter()
            .map(|c| c.as_str())
            .collect();
        assert_eq!(offered, vec!["2", "3"]);

        run(&mut state, "pick 2").unwrap();
        assert_eq!(state.session.mapping().value(&"c2".into()).unwrap().as_str(), "2");

        // "1" is held by c1 and not offered, so it falls back to the first choice.
        run(&mut state, "edit c2").unwrap();
        run(&mut state, "pick 1").unwrap();
        assert_eq!(state.session.mapping().value(&"c2".into()).unwrap().as_str(), "2");
        assert_eq!(state.session.mapping().value(&"c1".into()).unwrap().as_str(), "1");
    }

    #[cfg(feature = "shell-rustyline")]
    #[test]
    fn completion_handles_multibyte_whitespace() {
        use rustyline::completion::Completer;
        use rustyline::history::DefaultHistory;

        let state = state();
        let helper = ShellLineHelper::new(&state.session);
        let history = DefaultHistory::new();
        let ctx = rustyline::Context::new(&history);

        let line = "edit\u{3000}c";
        let (start, pairs) = helper.complete(line, line.len(), &ctx).unwrap();
        assert_eq!(&line[start..], "c");
        let names: Vec<&str> = pairs.iter().map(|p| p.replacement.as_str()).collect();
        assert_eq!(names, vec!["c1", "c2"]);
    }

    #[test]
    fn pick_out_of_range_keeps_selection_open() {
        let mut state = state();
        run(&mut state, "edit c2").unwrap();
        assert!(run(&mut state, "pick 9").is_err());
        assert!(run(&mut state, "pick 0").is_err());
        assert!(state.session.selection().is_some());
    }

    #[test]
    fn pick_without_selection_fails() {
        let mut state = state();
        assert!(run(&mut state, "pick x2").is_err());
    }

    #[test]
    fn done_and_cancel_exit() {
        let mut state = state();
        run(&mut state, "clear c1").unwrap();
        match run(&mut state, "done").unwrap() {
            ShellControl::Exit(SessionOutcome::Done(mapping)) => {
                assert_eq!(mapping.value(&"c1".into()), None);
            }
            other => panic!("unexpected control: {other:?}"),
        }
        assert!(matches!(
            run(&mut state, "cancel").unwrap(),
            ShellControl::Exit(SessionOutcome::Cancelled)
        ));
    }

    #[test]
    fn unknown_command_and_bad_arity_are_errors() {
        let mut state = state();
        assert!(run(&mut state, "frobnicate").is_err());
        assert!(run(&mut state, "clear").is_err());
        assert!(run(&mut state, "restore c1 c2").is_err());
        assert!(run(&mut state, "clear nope").is_err());
    }

    #[test]
    fn script_runs_until_done() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("edits.txt");
        fs::write(&script, "# assign c2\nedit c2\npick x2\n\nrestore c1\n").unwrap();

        let state = state();
        cmd_script(
            state.session,
            Some(script.as_path()),
            &["done".to_string(), "clear c1".to_string()],
            false,
            true,
        )
        .unwrap();
    }

    #[test]
    fn script_reports_failing_line() {
        let state = state();
        let err = cmd_script(
            state.session,
            None,
            &["edit c2".to_string(), "clear c1".to_string()],
            false,
            true,
        )
        .unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
