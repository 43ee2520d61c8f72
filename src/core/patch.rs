//! Idempotent startup-file patching.
//!
//! The application's startup file must register a health-check service and
//! map the `/health` route before the container is deployed. Each required
//! statement is described by a [`PatchRule`]: a marker that makes the rule a
//! no-op when already present, a primary insertion anchor, and an optional
//! fallback anchor. Rules are applied in order against the file content and
//! the file is rewritten only when something actually changed.

use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};

/// Where to splice inserted text relative to an anchor.
#[derive(Debug, Clone)]
pub enum Anchor {
    /// Insert on a new line immediately after the first occurrence of this
    /// literal statement.
    AfterLiteral(&'static str),
    /// Insert (preceded by a blank line) after the last match of this
    /// regex pattern.
    AfterLastMatch(&'static str),
    /// Insert (followed by a blank line) immediately before the first
    /// occurrence of this literal statement.
    BeforeLiteral(&'static str),
}

/// One required statement and where to put it when missing.
#[derive(Debug, Clone)]
pub struct PatchRule {
    /// Verbatim token whose presence means the rule is already satisfied.
    pub marker: &'static str,
    pub anchor: Anchor,
    pub fallback: Option<Anchor>,
    pub insert: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchOutcome {
    /// All markers were already present; file bytes untouched.
    Unchanged,
    Patched,
}

/// Rules for the health-check endpoint: register the service next to the
/// controller registration, map the route after the last controller route
/// (falling back to just before the run invocation).
pub fn health_endpoint_rules() -> Vec<PatchRule> {
    vec![
        PatchRule {
            marker: "AddHealthChecks()",
            anchor: Anchor::AfterLiteral("builder.Services.AddControllersWithViews();"),
            fallback: None,
            insert: "builder.Services.AddHealthChecks();",
        },
        PatchRule {
            marker: "MapHealthChecks(\"/health\")",
            anchor: Anchor::AfterLastMatch(r"app\.MapControllerRoute\([^)]*\);"),
            fallback: Some(Anchor::BeforeLiteral("app.Run();")),
            insert: "app.MapHealthChecks(\"/health\");",
        },
    ]
}

/// Apply `rules` to `content`, returning the patched text or `None` when
/// every marker was already present.
///
/// A rule whose marker is absent and whose anchors (primary and fallback)
/// are both missing is a hard error: silently skipping it would report
/// success on a file this tool does not actually manage.
pub fn apply_rules(content: &str, rules: &[PatchRule]) -> Result<Option<String>> {
    let mut patched = content.to_string();
    let mut changed = false;

    for rule in rules {
        if patched.contains(rule.marker) {
            continue;
        }

        let inserted = match insert_at(&patched, &rule.anchor, rule.insert) {
            Some(text) => Some(text),
            None => rule
                .fallback
                .as_ref()
                .and_then(|fb| insert_at(&patched, fb, rule.insert)),
        };

        match inserted {
            Some(text) => {
                patched = text;
                changed = true;
            }
            None => {
                return Err(Error::patch(format!(
                    "no insertion anchor found for '{}'",
                    rule.marker
                )))
            }
        }
    }

    Ok(changed.then_some(patched))
}

fn insert_at(content: &str, anchor: &Anchor, insert: &str) -> Option<String> {
    match anchor {
        Anchor::AfterLiteral(literal) => {
            let pos = content.find(literal)?;
            let end = pos + literal.len();
            Some(format!("{}\n{}{}", &content[..end], insert, &content[end..]))
        }
        Anchor::AfterLastMatch(pattern) => {
            // Anchor patterns are fixed at compile time
            let re = Regex::new(pattern).ok()?;
            let last = re.find_iter(content).last()?;
            let end = last.end();
            Some(format!(
                "{}\n\n{}{}",
                &content[..end],
                insert,
                &content[end..]
            ))
        }
        Anchor::BeforeLiteral(literal) => {
            let pos = content.find(literal)?;
            Some(format!(
                "{}{}\n\n{}",
                &content[..pos],
                insert,
                &content[pos..]
            ))
        }
    }
}

/// Ensure the startup file at `path` satisfies all health-endpoint rules.
/// Rewrites the file in place only when a statement had to be inserted.
pub fn patch_file(path: &str) -> Result<PatchOutcome> {
    let file = Path::new(path);
    let content = fs::read_to_string(file)
        .map_err(|e| Error::patch(format!("failed to read {}: {}", path, e)))?;

    match apply_rules(&content, &health_endpoint_rules())? {
        None => {
            log_status!("patch", "Health endpoint already configured in {}", path);
            Ok(PatchOutcome::Unchanged)
        }
        Some(patched) => {
            fs::write(file, patched)
                .map_err(|e| Error::patch(format!("failed to write {}: {}", path, e)))?;
            log_status!("patch", "Health endpoint added to {}", path);
            Ok(PatchOutcome::Patched)
        }
    }
}
