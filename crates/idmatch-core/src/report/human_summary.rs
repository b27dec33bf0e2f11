//! Human-readable review summary of a reconciliation run.

use crate::reconcile::Reconciliation;

/// At most this many updates are listed field by field.
pub const DETAILED_UPDATE_LIMIT: usize = 10;

/// Render a Markdown summary of a [`Reconciliation`] for review.
///
/// Informational only; the output table and structured reports are the
/// source of truth.
pub fn render_human_summary(r: &Reconciliation) -> String {
    let s = &r.summary;
    let mut out = String::new();

    out.push_str("## Reconciliation Summary\n\n");
    out.push_str(&format!(
        "**Run**: `{}`  \n**Executed at**: {}  \n**Snapshot**: {}\n\n",
        s.run_id,
        s.run_at.to_rfc3339(),
        r.snapshot_status.describe()
    ));

    // Counts
    out.push_str("### Classification\n\n");
    out.push_str(&format!(
        "| Operation | Records |\n\
         |---|---|\n\
         | NEW | {} |\n\
         | UPDATED | {} |\n\
         | UNCHANGED | {} |\n\
         | **Total output** | {} |\n\n",
        s.new, s.updated, s.unchanged, s.output_rows
    ));
    out.push_str(&format!(
        "Batch rows: {}. Records to write (NEW + UPDATED): {}.\n\n",
        s.input_rows,
        s.pending_writes()
    ));

    // Anomalies
    if s.has_anomalies() {
        out.push_str("### Warnings\n\n");
        if s.empty_key_records > 0 {
            out.push_str(&format!(
                "- **Empty natural key**: {} records (rows {})\n",
                s.empty_key_records,
                join_rows(&r.empty_key_rows())
            ));
        }
        if s.snapshot_duplicates > 0 {
            out.push_str(&format!(
                "- **Snapshot duplicates**: {} rows share a fingerprint with an earlier row\n",
                s.snapshot_duplicates
            ));
            for d in &r.snapshot_duplicates {
                out.push_str(&format!(
                    "  - `{}` kept `{}` (row {}), ignored `{}` (row {})\n",
                    d.fingerprint, d.kept_identifier, d.kept_row, d.dropped_identifier, d.dropped_row
                ));
            }
        }
        if s.snapshot_rows_without_identifier > 0 {
            out.push_str(&format!(
                "- **Snapshot rows without identifier**: {}\n",
                s.snapshot_rows_without_identifier
            ));
        }
        if s.dropped_duplicates > 0 {
            out.push_str(&format!(
                "- **Dropped for duplicate identifier**: {}\n",
                s.dropped_duplicates
            ));
            for d in &r.uniqueness.dropped {
                out.push_str(&format!(
                    "  - `{}`: dropped row {} ({}), kept row {} ({})\n",
                    d.identifier,
                    d.source_row,
                    d.classification,
                    d.kept_source_row,
                    d.kept_classification
                ));
            }
        }
        out.push('\n');
    }

    // Integrity
    let findings = r.integrity.warnings();
    if !findings.is_empty() {
        out.push_str("### Integrity\n\n");
        for f in &findings {
            out.push_str(&format!("- {}\n", f));
        }
        out.push('\n');
    }

    // Updates
    if s.updated > 0 {
        out.push_str("### Updates\n\n");
        if s.updated <= DETAILED_UPDATE_LIMIT {
            for m in r.updates() {
                out.push_str(&format!("- `{}` (row {})\n", m.identifier, m.row));
                for (field, change) in &m.changes {
                    out.push_str(&format!(
                        "  - **{}**: `{}` → `{}`\n",
                        field, change.old, change.new
                    ));
                }
            }
        } else {
            out.push_str(&format!(
                "_{} updates; see the run report for per-field changes._\n",
                s.updated
            ));
        }
        out.push('\n');
    }

    if !s.has_anomalies() && findings.is_empty() {
        out.push_str("_No anomalies detected._\n");
    }

    out
}

fn join_rows(rows: &[usize]) -> String {
    rows.iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
