//! Document display for the CLI.
//!
//! `horcrux show` reads the corpus file directly through the store;
//! `horcrux fetch` goes through the [`RetrievalPolicy`] the same way a web
//! page would, and prints either the raw JSON or a short summary.

use anyhow::Result;
use horcrux_core::store::CorpusStore;
use horcrux_core::CorpusDocument;
use serde_json::Value;

use crate::config::Config;
use crate::file_store::FileStore;
use crate::retrieval::{LoadState, RetrievalPolicy};

/// Meta fields shown in summaries, in display order.
const META_FIELDS: &[(&str, &str)] = &[
    ("name", "Name"),
    ("title", "Title"),
    ("location", "Location"),
    ("updated", "Updated"),
    ("version", "Version"),
];

/// Top-level sections counted in summaries.
const SECTIONS: &[(&str, &str)] = &[
    ("skills", "Skills"),
    ("projects", "Projects"),
    ("interviews", "Interviews"),
    ("learning_goals", "Learning goals"),
    ("availability", "Availability"),
];

/// CLI entry point for `horcrux show`.
pub async fn run_show(config: &Config) -> Result<()> {
    let store = FileStore::new(&config.corpus.path);
    let doc = store.get_document().await?;
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

/// CLI entry point for `horcrux fetch`.
pub async fn run_fetch(config: &Config, raw_json: bool) -> Result<()> {
    let policy = RetrievalPolicy::from_config(config)?;

    let mut state = LoadState::default();
    if !raw_json {
        print_state(&state);
    }
    state = policy.load().await;

    match &state {
        LoadState::Loaded(doc) if raw_json => {
            println!("{}", serde_json::to_string_pretty(doc)?);
        }
        LoadState::Failed(msg) => {
            eprintln!("Failed to load: {}", msg);
            std::process::exit(1);
        }
        _ => print_state(&state),
    }

    Ok(())
}

fn print_state(state: &LoadState) {
    match state {
        LoadState::Loading => eprintln!("Loading…"),
        LoadState::Loaded(doc) => {
            for line in summarize(doc) {
                println!("{}", line);
            }
        }
        LoadState::Failed(msg) => eprintln!("Failed to load: {}", msg),
    }
}

/// Human-readable summary lines for a document.
///
/// Documents that keep their descriptive fields under `content` rather than
/// at the top level are summarized from there.
pub fn summarize(doc: &CorpusDocument) -> Vec<String> {
    let mut lines = vec!["--- Meta ---".to_string()];

    let meta = doc.meta().or_else(|| {
        doc.content()
            .and_then(|c| c.get("meta"))
            .and_then(Value::as_object)
    });
    if let Some(meta) = meta {
        for (key, label) in META_FIELDS {
            match meta.get(*key) {
                Some(Value::String(s)) => lines.push(format!("{:<10} {}", label, s)),
                Some(Value::Number(n)) => lines.push(format!("{:<10} {}", label, n)),
                _ => {}
            }
        }
    }

    lines.push("--- Sections ---".to_string());
    for (key, label) in SECTIONS {
        if let Some(value) = doc.section(key) {
            lines.push(format!("{:<16} {}", label, describe_size(value)));
        }
    }
    lines.push(format!("{:<16} {}", "Notes", doc.notes_count()));

    lines
}

fn describe_size(value: &Value) -> String {
    match value {
        Value::Array(items) => format!("{} entries", items.len()),
        Value::Object(map) => format!("{} fields", map.len()),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
