//! End-of-run error export
//!
//! Failed tickets are the only externally visible artifact of the
//! partial-failure policy: one CSV row per abandoned ticket, every field
//! quoted, CRLF line endings, written next to the run's other outputs.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use super::FailedTicket;

/// File name prefix of the error export.
pub const ERROR_CSV_PREFIX: &str = "dispatch_errors_";

const HEADER: [&str; 7] = [
    "ticket",
    "contractor_name",
    "contract_id",
    "contact_phone",
    "rank",
    "stage",
    "reason",
];

/// Write the error CSV into `dir`, named with the run timestamp.
/// Returns the path of the written file.
pub fn write_error_csv(
    dir: &Path,
    at: DateTime<Utc>,
    failures: &[FailedTicket],
) -> std::io::Result<PathBuf> {
    let file_name = format!("{}{}.csv", ERROR_CSV_PREFIX, at.format("%Y%m%d%H%M%S"));
    let path = dir.join(file_name);
    let mut file = std::fs::File::create(&path)?;

    write_row(&mut file, HEADER.iter().map(|s| s.to_string()))?;
    for failure in failures {
        write_row(
            &mut file,
            [
                failure.ticket.0.to_string(),
                failure.contractor_name.clone().unwrap_or_default(),
                failure.contract_id.clone().unwrap_or_default(),
                failure.contact_phone.clone().unwrap_or_default(),
                failure.rank.map(|r| r.to_string()).unwrap_or_default(),
                failure.stage.to_string(),
                failure.reason.clone(),
            ]
            .into_iter(),
        )?;
    }

    info!(path = %path.display(), rows = failures.len(), "error CSV written");
    Ok(path)
}

fn write_row<W: Write>(
    writer: &mut W,
    fields: impl Iterator<Item = String>,
) -> std::io::Result<()> {
    let quoted: Vec<String> = fields
        .map(|f| format!("\"{}\"", f.replace('"', "\"\"")))
        .collect();
    write!(writer, "{}\r\n", quoted.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::FailureStage;
    use crate::rank::Rank;
    use crate::ticket::TicketId;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn failure(reason: &str) -> FailedTicket {
        FailedTicket {
            ticket: TicketId(Uuid::from_u128(5)),
            contractor_name: Some("Acme \"East\"".to_string()),
            contract_id: Some("C-001".to_string()),
            contact_phone: None,
            rank: Some(Rank::B),
            stage: FailureStage::Commit,
            reason: reason.to_string(),
        }
    }

    #[test]
    fn writes_header_and_quoted_rows() {
        let dir = tempfile::tempdir().unwrap();
        let at = Utc.with_ymd_and_hms(2024, 6, 10, 9, 30, 0).unwrap();

        let path = write_error_csv(dir.path(), at, &[failure("update rejected")]).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "dispatch_errors_20240610093000.csv"
        );

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.split("\r\n").filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("\"ticket\""));
        // Embedded quotes are doubled, all fields quoted.
        assert!(lines[1].contains("\"Acme \"\"East\"\"\""));
        assert!(lines[1].contains("\"commit\""));
        assert!(lines[1].contains("\"B\""));
    }

    #[test]
    fn empty_failure_list_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let at = Utc.with_ymd_and_hms(2024, 6, 10, 9, 30, 0).unwrap();

        let path = write_error_csv(dir.path(), at, &[]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("\r\n").count(), 1);
    }
}
