//! Summary handler: the navigation list with live counts.

use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::Tabled;

use headdeck_core::{NavEntry, ResourceKind};

use crate::cli::{GlobalOpts, SummaryArgs};
use crate::error::CliError;
use crate::output;

use super::Session;

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "")]
    marker: &'static str,
    #[tabled(rename = "Section")]
    label: &'static str,
    #[tabled(rename = "Path")]
    path: &'static str,
    #[tabled(rename = "Count")]
    count: usize,
}

#[derive(Debug, Serialize)]
struct Summary {
    path: String,
    selected: Option<NavEntry>,
    entries: Vec<NavEntry>,
}

fn detail(summary: &Summary) -> String {
    let rows: Vec<EntryRow> = summary
        .entries
        .iter()
        .map(|e| EntryRow {
            marker: if summary.selected.as_ref().is_some_and(|s| s.kind == e.kind) {
                ">"
            } else {
                ""
            },
            label: e.label,
            path: e.path,
            count: e.count,
        })
        .collect();
    output::render_table(&rows)
}

fn plain(summary: &Summary) -> String {
    summary
        .entries
        .iter()
        .map(|e| format!("{}\t{}", e.path, e.count))
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn handle(
    session: &Session,
    args: &SummaryArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let agg = &session.aggregator;
    agg.navigation().navigate(&args.path);
    session.fetch_checked(agg.fetch_all()).await?;

    if !global.quiet {
        for kind in ResourceKind::iter() {
            if let Some(err) = agg.error(kind) {
                eprintln!("warning: {} could not be refreshed: {err}", kind.label());
            }
        }
    }

    let summary = Summary {
        path: agg.navigation().current_path(),
        selected: agg.selected(),
        entries: agg.nav_entries().as_ref().clone(),
    };
    let out = output::render_single(&global.output, &summary, detail, plain)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use headdeck_core::{NavCounts, nav_entries, select};

    use super::*;

    fn summary(path: &str) -> Summary {
        let entries = nav_entries(&NavCounts {
            nodes: 3,
            ..NavCounts::default()
        });
        Summary {
            path: path.into(),
            selected: select(&entries, path),
            entries,
        }
    }

    #[test]
    fn table_marks_the_selected_entry() {
        let out = detail(&summary("/nodes"));
        let marked: Vec<_> = out.lines().filter(|l| l.contains('>')).collect();
        assert_eq!(marked.len(), 1);
        assert!(marked[0].contains("/nodes"));
    }

    #[test]
    fn plain_lists_path_and_count() {
        let out = plain(&summary("/"));
        assert_eq!(out.lines().count(), 4);
        assert!(out.contains("/nodes\t3"));
    }
}
