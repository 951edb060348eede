//! Text rendering of the mapping table and the selection dialog.

use colored::Colorize;
use srm_mapping::{MappingRow, MappingSession, SelectionScope};
use std::fmt::Write;

pub fn render_session(session: &MappingSession) -> String {
    let mut out = String::new();
    let labels = session.labels();
    let _ = writeln!(out, "{}", labels.heading.as_str().bold());
    out.push_str(&render_rows(&session.rows()));
    out.push_str(&render_pool(session));

    let done = if session.can_done() {
        labels.done_button.as_str().green().to_string()
    } else {
        labels.done_button.as_str().dimmed().to_string()
    };
    let _ = writeln!(out, "\n[{done}] [{}]", labels.cancel_button);

    if let Some(scope) = session.selection() {
        out.push('\n');
        out.push_str(&render_dialog(scope));
    }
    out
}

pub fn render_rows(rows: &[MappingRow]) -> String {
    let width = rows.iter().map(|r| r.label.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for row in rows {
        let value = match &row.value {
            Some(v) => v.as_str().cyan().to_string(),
            None => "-".dimmed().to_string(),
        };
        let _ = writeln!(
            out,
            "  {:<width$}  {:<12}  {} {} {}  ({})",
            row.label,
            value,
            action("edit", row.can_edit),
            action("restore", row.can_restore),
            action("clear", row.can_clear),
            row.srm_id,
            width = width,
        );
    }
    out
}

pub fn render_pool(session: &MappingSession) -> String {
    let pool = session.store().assignable_pool();
    if pool.is_empty() {
        return format!("{}\n", "No assignable ontology ids".dimmed());
    }
    let ids: Vec<&str> = pool.iter().map(|id| id.as_str()).collect();
    format!("Assignable: {}\n", ids.join(", "))
}

pub fn render_dialog(scope: &SelectionScope) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", scope.title().bold());
    let _ = writeln!(out, "{}", scope.prompt());
    for (idx, choice) in scope.choices().iter().enumerate() {
        let marker = if scope.preselected() == Some(choice) { "*" } else { " " };
        let _ = writeln!(out, " {marker}{:>3}. {choice}", idx + 1);
    }
    out.push_str("Use `pick <n|id>` or `abandon`.\n");
    out
}

fn action(name: &str, enabled: bool) -> String {
    if enabled {
        name.to_string()
    } else {
        name.dimmed().strikethrough().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use srm_mapping::{Mapping, OntologyId, SchemaCatalog, SessionLabels};

    fn session() -> MappingSession {
        let catalog = SchemaCatalog::builder()
            .class("c1", "A")
            .class("c2", "B")
            .build()
            .unwrap();
        let initial = Mapping::from_json_str(r#"{"c1": "x1", "c2": ""}"#).unwrap();
        let ids = ["x1", "x2"].map(|s| OntologyId::new(s).unwrap());
        MappingSession::new(catalog, ids, initial, SessionLabels::default()).unwrap()
    }

    #[test]
    fn test_render_table_and_pool() {
        colored::control::set_override(false);
        let text = render_session(&session());
        assert!(text.starts_with("SRM mapping\n"));
        assert!(text.contains("  A  x1"));
        assert!(text.contains("Assignable: x2\n"));
        assert!(text.contains("[Done] [Cancel]"));
    }

    #[test]
    fn test_render_dialog_marks_preselected() {
        colored::control::set_override(false);
        let mut session = session();
        session.open_edit(&"c1".into()).unwrap();
        let text = render_dialog(session.selection().unwrap());
        assert!(text.contains("Select ontology equivalent"));
        assert!(text.contains("for SRM class A."));
        assert!(text.contains(" *  1. x1"));
        assert!(text.contains("    2. x2"));
    }
}
