//! Bulk-recipient parsing for admin newsletter broadcasts. Input is a CSV
//! with `name,company,email` columns (a header row naming them, or exactly
//! that order without one).

use futures::future::join_all;
use serde::Serialize;
use tracing::warn;

use crate::mailer::templates;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct NewsletterSummary {
    pub targeted: usize,
    pub sent: usize,
    pub failed: usize,
    pub dropped_rows: usize,
}

/// Rows without an address containing `@` are dropped; a row with an empty
/// name but a non-empty company uses the company as display name.
pub fn parse_recipients(csv: &str) -> (Vec<Recipient>, usize) {
    let mut lines = csv.lines().filter(|line| !line.trim().is_empty());

    let Some(first) = lines.next() else {
        return (Vec::new(), 0);
    };

    let first_fields = split_csv_line(first);
    let header = column_indices(&first_fields);

    let mut recipients = Vec::new();
    let mut dropped = 0;

    let mut handle_row = |fields: &[String]| {
        let (name_idx, company_idx, email_idx) = header.unwrap_or((0, 1, 2));

        let field = |idx: usize| fields.get(idx).map(|f| f.trim()).unwrap_or("");
        let email = field(email_idx);
        if !looks_like_email(email) {
            dropped += 1;
            return;
        }

        let name = field(name_idx);
        let company = field(company_idx);
        let display_name = if !name.is_empty() {
            name.to_string()
        } else if !company.is_empty() {
            company.to_string()
        } else {
            email.to_string()
        };

        recipients.push(Recipient {
            email: email.to_string(),
            display_name,
        });
    };

    if header.is_none() {
        handle_row(&first_fields);
    }
    for line in lines {
        handle_row(&split_csv_line(line));
    }

    (recipients, dropped)
}

pub fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// `(name, company, email)` column positions if the first row is a header.
fn column_indices(fields: &[String]) -> Option<(usize, usize, usize)> {
    let find = |wanted: &str| {
        fields
            .iter()
            .position(|f| f.trim().eq_ignore_ascii_case(wanted))
    };

    let email = find("email")?;
    let name = find("name").unwrap_or(0);
    let company = find("company").unwrap_or(1);
    Some((name, company, email))
}

/// Minimal quote-aware splitter: double quotes wrap fields, `""` escapes a
/// quote inside a quoted field.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            other => current.push(other),
        }
    }
    fields.push(current);
    fields
}

/// Same independent fan-out as job broadcasts: one failure never aborts the
/// remaining recipients.
pub async fn send_newsletter(
    state: &AppState,
    subject: &str,
    body_html: &str,
    csv: &str,
) -> NewsletterSummary {
    let (recipients, dropped_rows) = parse_recipients(csv);
    let targeted = recipients.len();

    let sends = recipients.into_iter().map(|recipient| {
        let mailer = state.mailer.clone();
        let mail = templates::newsletter(&recipient.email, &recipient.display_name, subject, body_html);
        async move { (recipient.email, mailer.send(mail).await) }
    });

    let mut sent = 0;
    let mut failed = 0;
    for (email, result) in join_all(sends).await {
        match result {
            Ok(()) => sent += 1,
            Err(err) => {
                failed += 1;
                warn!(recipient = %email, error = %err, "newsletter delivery failed");
            }
        }
    }

    NewsletterSummary {
        targeted,
        sent,
        failed,
        dropped_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::{looks_like_email, parse_recipients, split_csv_line};

    #[test]
    fn rows_without_valid_email_are_dropped() {
        let csv = "name,company,email\n\
                   Alice,Acme,alice@example.com\n\
                   Bob,Beta,not-an-email\n\
                   Carol,Gamma,\n";
        let (recipients, dropped) = parse_recipients(csv);

        assert_eq!(recipients.len(), 1);
        assert_eq!(recipients[0].email, "alice@example.com");
        assert_eq!(dropped, 2);
    }

    #[test]
    fn empty_name_falls_back_to_company() {
        let csv = "name,company,email\n,Acme Logistics,ops@acme.example\n";
        let (recipients, _) = parse_recipients(csv);

        assert_eq!(recipients[0].display_name, "Acme Logistics");
    }

    #[test]
    fn empty_name_and_company_fall_back_to_address() {
        let csv = "name,company,email\n,,solo@example.com\n";
        let (recipients, _) = parse_recipients(csv);

        assert_eq!(recipients[0].display_name, "solo@example.com");
    }

    #[test]
    fn headerless_input_is_treated_positionally() {
        let csv = "Dana,Delta GmbH,dana@delta.example\n";
        let (recipients, dropped) = parse_recipients(csv);

        assert_eq!(recipients.len(), 1);
        assert_eq!(recipients[0].display_name, "Dana");
        assert_eq!(dropped, 0);
    }

    #[test]
    fn quoted_fields_may_contain_commas() {
        let fields = split_csv_line("\"Miller, Jane\",Acme,jane@acme.example");
        assert_eq!(fields[0], "Miller, Jane");
        assert_eq!(fields[2], "jane@acme.example");
    }

    #[test]
    fn email_heuristic() {
        assert!(looks_like_email("a@b.example"));
        assert!(!looks_like_email("ab.example"));
        assert!(!looks_like_email("@b"));
        assert!(!looks_like_email("a@"));
    }
}
