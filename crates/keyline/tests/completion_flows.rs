//! Tab-completion flows: attempt chaining, alternatives display, and the
//! resets that bound a completion run.

use keyline::{
    Completer, CompletionRequest, CompletionResponse, LineEditor, NamedKey, ReadOutcome,
    ScriptedTerminal,
};
use std::cell::RefCell;
use std::rc::Rc;

const PROMPT: &str = "> ";

/// Replays a canned response per call and records every request it saw.
struct ScriptCompleter {
    responses: Vec<CompletionResponse>,
    calls: Rc<RefCell<Vec<(String, u32)>>>,
}

impl ScriptCompleter {
    fn new(responses: Vec<CompletionResponse>) -> (Self, Rc<RefCell<Vec<(String, u32)>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let completer = Self {
            responses,
            calls: Rc::clone(&calls),
        };
        (completer, calls)
    }
}

impl Completer for ScriptCompleter {
    fn complete(&mut self, request: &CompletionRequest<'_>) -> CompletionResponse {
        let call = self.calls.borrow().len();
        self.calls
            .borrow_mut()
            .push((request.fragment.to_string(), request.attempt));
        self.responses
            .get(call)
            .cloned()
            .unwrap_or_else(CompletionResponse::none)
    }
}

#[test]
fn inserts_completion_suffix_at_cursor() {
    let mut term = ScriptedTerminal::new(80);
    term.type_str("fo");
    term.push_named(NamedKey::Tab);
    term.push_named(NamedKey::Enter);
    let (completer, calls) = ScriptCompleter::new(vec![CompletionResponse::insert("o")]);
    let mut editor = LineEditor::new(term);
    editor.set_completer(completer);

    assert_eq!(
        editor.read_line(PROMPT).unwrap(),
        ReadOutcome::Line("foo".to_string())
    );
    assert_eq!(*calls.borrow(), vec![("fo".to_string(), 0)]);
}

#[test]
fn repeated_tabs_chain_attempts_and_replace_insertion() {
    let mut term = ScriptedTerminal::new(80);
    term.type_str("fo");
    term.push_named(NamedKey::Tab);
    term.push_named(NamedKey::Tab);
    term.push_named(NamedKey::Enter);
    let (completer, calls) = ScriptCompleter::new(vec![
        CompletionResponse::insert("o"),
        CompletionResponse::insert("obar"),
    ]);
    let mut editor = LineEditor::new(term);
    editor.set_completer(completer);

    // The second attempt's splice replaces the first, not stacks on it.
    assert_eq!(
        editor.read_line(PROMPT).unwrap(),
        ReadOutcome::Line("foobar".to_string())
    );
    // The fragment is captured once per run; only the attempt advances.
    assert_eq!(
        *calls.borrow(),
        vec![("fo".to_string(), 0), ("fo".to_string(), 1)]
    );
}

#[test]
fn typing_resets_the_attempt_sequence() {
    let mut term = ScriptedTerminal::new(80);
    term.type_str("fo");
    term.push_named(NamedKey::Tab);
    term.type_str("x");
    term.push_named(NamedKey::Tab);
    term.push_named(NamedKey::Enter);
    let (completer, calls) = ScriptCompleter::new(vec![
        CompletionResponse::insert("o"),
        CompletionResponse::insert("!"),
    ]);
    let mut editor = LineEditor::new(term);
    editor.set_completer(completer);

    assert_eq!(
        editor.read_line(PROMPT).unwrap(),
        ReadOutcome::Line("foox!".to_string())
    );
    // The edit between Tabs recaptured the fragment and restarted at zero.
    assert_eq!(
        *calls.borrow(),
        vec![("fo".to_string(), 0), ("foox".to_string(), 0)]
    );
}

#[test]
fn cursor_motion_between_tabs_still_replaces_the_tracked_span() {
    let mut term = ScriptedTerminal::new(80);
    term.type_str("fo");
    term.push_named(NamedKey::Tab);
    term.push_named(NamedKey::Home); // pure motion keeps the run alive
    term.push_named(NamedKey::Tab);
    term.push_named(NamedKey::Enter);
    let (completer, calls) = ScriptCompleter::new(vec![
        CompletionResponse::insert("o"),
        CompletionResponse::insert("obar"),
    ]);
    let mut editor = LineEditor::new(term);
    editor.set_completer(completer);

    // The second splice removes the first at its recorded position, not at
    // wherever the cursor happens to sit.
    assert_eq!(
        editor.read_line(PROMPT).unwrap(),
        ReadOutcome::Line("foobar".to_string())
    );
    assert_eq!(
        *calls.borrow(),
        vec![("fo".to_string(), 0), ("fo".to_string(), 1)]
    );
}

#[test]
fn alternatives_are_listed_and_editing_resumes() {
    let mut term = ScriptedTerminal::new(80);
    term.type_str("fo");
    term.push_named(NamedKey::Tab);
    term.push_named(NamedKey::Enter);
    let (completer, _) = ScriptCompleter::new(vec![CompletionResponse::with_alternatives(vec![
        "foobar".to_string(),
        "foobaz".to_string(),
    ])]);
    let mut editor = LineEditor::new(term);
    editor.set_completer(completer);

    assert_eq!(
        editor.read_line(PROMPT).unwrap(),
        ReadOutcome::Line("fo".to_string())
    );
    let output = editor.terminal().output();
    assert!(output.contains("foobar"));
    assert!(output.contains("foobaz"));
    // The prompt and line are repainted below the listing.
    assert_eq!(output.matches(PROMPT).count(), 2);
}

#[test]
fn alternatives_keep_the_run_alive() {
    let mut term = ScriptedTerminal::new(80);
    term.type_str("fo");
    term.push_named(NamedKey::Tab);
    term.push_named(NamedKey::Tab);
    term.push_named(NamedKey::Enter);
    let (completer, calls) = ScriptCompleter::new(vec![
        CompletionResponse::with_alternatives(vec!["foobar".to_string()]),
        CompletionResponse::insert("obar"),
    ]);
    let mut editor = LineEditor::new(term);
    editor.set_completer(completer);

    assert_eq!(
        editor.read_line(PROMPT).unwrap(),
        ReadOutcome::Line("foobar".to_string())
    );
    assert_eq!(
        *calls.borrow(),
        vec![("fo".to_string(), 0), ("fo".to_string(), 1)]
    );
}

#[test]
fn error_response_beeps_and_restarts_at_attempt_zero() {
    let mut term = ScriptedTerminal::new(80);
    term.type_str("fo");
    term.push_named(NamedKey::Tab);
    term.push_named(NamedKey::Tab);
    term.push_named(NamedKey::Enter);
    let (completer, calls) = ScriptCompleter::new(vec![
        CompletionResponse::error(),
        CompletionResponse::insert("o"),
    ]);
    let mut editor = LineEditor::new(term);
    editor.set_completer(completer);

    assert_eq!(
        editor.read_line(PROMPT).unwrap(),
        ReadOutcome::Line("foo".to_string())
    );
    assert_eq!(editor.terminal().bell_count(), 1);
    assert_eq!(
        *calls.borrow(),
        vec![("fo".to_string(), 0), ("fo".to_string(), 0)]
    );
}

#[test]
fn empty_response_beeps_but_continues_the_sequence() {
    let mut term = ScriptedTerminal::new(80);
    term.type_str("f");
    term.push_named(NamedKey::Tab);
    term.push_named(NamedKey::Tab);
    term.push_named(NamedKey::Enter);
    let (completer, calls) = ScriptCompleter::new(vec![
        CompletionResponse::none(),
        CompletionResponse::insert("x"),
    ]);
    let mut editor = LineEditor::new(term);
    editor.set_completer(completer);

    assert_eq!(
        editor.read_line(PROMPT).unwrap(),
        ReadOutcome::Line("fx".to_string())
    );
    assert_eq!(editor.terminal().bell_count(), 1);
    assert_eq!(
        *calls.borrow(),
        vec![("f".to_string(), 0), ("f".to_string(), 1)]
    );
}

#[test]
fn fragment_is_empty_after_a_word_break() {
    let mut term = ScriptedTerminal::new(80);
    term.type_str("echo ");
    term.push_named(NamedKey::Tab);
    term.push_named(NamedKey::Enter);
    let (completer, calls) = ScriptCompleter::new(vec![CompletionResponse::insert("ls")]);
    let mut editor = LineEditor::new(term);
    editor.set_completer(completer);

    assert_eq!(
        editor.read_line(PROMPT).unwrap(),
        ReadOutcome::Line("echo ls".to_string())
    );
    assert_eq!(*calls.borrow(), vec![(String::new(), 0)]);
}

#[test]
fn from_output_drives_whole_word_completion() {
    let mut term = ScriptedTerminal::new(80);
    term.type_str("fo");
    term.push_named(NamedKey::Tab);
    term.push_named(NamedKey::Enter);
    let mut editor = LineEditor::new(term);
    editor.set_completer(|request: &CompletionRequest<'_>| {
        match CompletionResponse::from_output(request.fragment, "forward") {
            Ok(response) => response,
            Err(_) => CompletionResponse::error(),
        }
    });

    assert_eq!(
        editor.read_line(PROMPT).unwrap(),
        ReadOutcome::Line("forward".to_string())
    );
}

#[test]
fn clearing_the_completer_restores_literal_tab() {
    let mut term = ScriptedTerminal::new(80);
    term.push_named(NamedKey::Tab);
    term.push_named(NamedKey::Enter);
    let (completer, calls) = ScriptCompleter::new(vec![]);
    let mut editor = LineEditor::new(term);
    editor.set_completer(completer);
    editor.clear_completer();

    assert_eq!(
        editor.read_line(PROMPT).unwrap(),
        ReadOutcome::Line("\t".to_string())
    );
    assert!(calls.borrow().is_empty());
}
