use chrono::{DateTime, Utc};
use sea_orm::TransactionTrait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MAX_IMPORT_BYTES, MAX_IMPORT_ERRORS, NewTransaction, ResultEngine,
    TransactionFilter,
    csv_io::{RowError, parse_csv, write_csv},
    report::TransactionEntry,
};

use super::{Engine, with_tx};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: usize,
}

fn reject(mut errors: Vec<RowError>) -> EngineError {
    errors.sort();
    let total = errors.len();
    let messages: Vec<String> = errors
        .iter()
        .take(MAX_IMPORT_ERRORS)
        .map(ToString::to_string)
        .collect();
    tracing::warn!(errors = total, "csv import rejected");
    EngineError::ImportRejected(messages)
}

impl Engine {
    /// The filtered transactions as CSV, newest first.
    pub async fn export_csv(&self, user_id: Uuid, filter: &TransactionFilter) -> ResultEngine<Vec<u8>> {
        let entries = with_tx!(self, |db_tx| {
            let items = self.filtered_transactions(&db_tx, user_id, filter).await?;
            let categories = self.categories_by_id(&db_tx, user_id).await?;
            Ok::<_, EngineError>(
                items
                    .into_iter()
                    .map(|tx| TransactionEntry::new(tx, &categories))
                    .collect::<Vec<_>>(),
            )
        })?;
        write_csv(&entries)
    }

    /// Imports every row of `input` or none of them.
    ///
    /// Category names are matched against the user's categories of the same
    /// type; an empty category leaves the transaction uncategorized.
    pub async fn import_csv(
        &self,
        user_id: Uuid,
        input: &[u8],
        now: DateTime<Utc>,
    ) -> ResultEngine<ImportSummary> {
        if input.len() > MAX_IMPORT_BYTES {
            return Err(EngineError::ImportRejected(vec![format!(
                "file is larger than {} MiB",
                MAX_IMPORT_BYTES / (1024 * 1024)
            )]));
        }
        let parsed = parse_csv(input)?;
        if parsed.row_count == 0 {
            return Err(EngineError::ImportRejected(vec![
                "no transactions found in the CSV file".to_string(),
            ]));
        }

        with_tx!(self, |db_tx| {
            let categories = self.categories_by_id(&db_tx, user_id).await?;
            let mut errors = parsed.errors;
            let mut commands = Vec::with_capacity(parsed.rows.len());

            for row in parsed.rows {
                let mut cmd = NewTransaction::new(user_id, row.kind, row.amount, row.date);
                if let Some(name) = row.category.as_deref() {
                    match Self::find_category_by_name(&categories, name, row.kind) {
                        Ok(Some(category)) => cmd = cmd.category(category.id),
                        _ => {
                            errors.push(RowError {
                                line: row.line,
                                message: format!(
                                    "unknown {} category '{name}'",
                                    row.kind.as_str()
                                ),
                            });
                            continue;
                        }
                    }
                }
                if let Some(note) = row.note {
                    cmd = cmd.note(note);
                }
                commands.push(cmd);
            }

            if !errors.is_empty() {
                return Err(reject(errors));
            }

            let imported = commands.len();
            for cmd in commands {
                self.insert_transaction(&db_tx, cmd, now).await?;
            }
            tracing::info!(user_id = %user_id, imported, "csv import completed");
            Ok(ImportSummary { imported })
        })
    }
}
