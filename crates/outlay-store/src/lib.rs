//! Expense persistence
//!
//! JSON files on disk, one for records and one for the monthly budget,
//! behind the [`ExpenseStore`] trait so callers never touch the filesystem
//! directly. Writes go through a temp file and rename, with a backup copy
//! of the previous records file kept alongside.

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info, warn};
use outlay_core::models;
use outlay_core::{CoreError, CoreResult, Expense};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod error;

pub use error::{StoreError, StoreResult};

/// Store reference type
pub type StoreRef = Arc<dyn ExpenseStore>;

/// Column order for CSV exports
const CSV_HEADERS: [&str; 6] = ["id", "name", "amount", "date", "category", "note"];

/// Export file name inside the exports directory
const EXPORT_FILE: &str = "expenses_export.csv";

// ==================== Store Trait ====================

/// Storage abstraction over expense records and the monthly budget
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Snapshot of all records in insertion order
    async fn list_expenses(&self) -> Vec<Expense>;

    /// Look up a single record by id
    async fn expense(&self, id: &str) -> StoreResult<Expense>;

    /// Append a record and persist
    async fn add_expense(&self, expense: Expense) -> StoreResult<Expense>;

    /// Apply a partial update to a record and persist
    async fn update_expense(&self, id: &str, patch: ExpensePatch) -> StoreResult<Expense>;

    /// Remove a record and persist, returning the removed record
    async fn delete_expense(&self, id: &str) -> StoreResult<Expense>;

    /// Current monthly budget, if one has been set
    async fn budget(&self) -> Option<Decimal>;

    /// Replace the monthly budget and persist
    async fn set_budget(&self, budget: Decimal) -> StoreResult<Decimal>;

    /// Export all records to the CSV export file. Append mode skips
    /// records already present; otherwise the file is rewritten from
    /// scratch.
    async fn export_csv(&self, append: bool) -> StoreResult<ExportOutcome>;

    /// Persist current state to disk
    async fn flush(&self) -> StoreResult<()>;
}

// ==================== Patch Type ====================

/// Partial update to an expense record. Absent fields are left untouched;
/// a blank note clears the note.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpensePatch {
    pub name: Option<String>,
    #[serde(alias = "price")]
    pub amount: Option<Decimal>,
    #[serde(alias = "expense_date", alias = "date")]
    pub occurred_on: Option<NaiveDate>,
    pub category: Option<String>,
    pub note: Option<String>,
}

impl ExpensePatch {
    /// Whether the patch changes anything at all
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.amount.is_none()
            && self.occurred_on.is_none()
            && self.category.is_none()
            && self.note.is_none()
    }

    /// Apply to a record, validating each supplied field
    pub fn apply(&self, expense: &mut Expense) -> CoreResult<()> {
        if let Some(name) = &self.name {
            expense.name = models::normalize_label(name, "name")?;
        }
        if let Some(amount) = self.amount {
            expense.amount = models::validate_amount(amount)?;
        }
        if let Some(date) = self.occurred_on {
            expense.occurred_on = date;
        }
        if let Some(category) = &self.category {
            expense.category = models::normalize_label(category, "category")?;
        }
        if let Some(note) = &self.note {
            let trimmed = note.trim();
            expense.note = if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            };
        }
        Ok(())
    }
}

/// Result of a CSV export run
#[derive(Debug, Clone, Serialize)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub new_rows: usize,
    pub appended: bool,
}

// ==================== JSON Store ====================

/// File layout for a [`JsonStore`]
#[derive(Debug, Clone)]
pub struct StoreLayout {
    pub data_dir: PathBuf,
    pub expenses_file: String,
    pub budget_file: String,
    pub export_dir: String,
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            expenses_file: "expenses.json".to_string(),
            budget_file: "budget.json".to_string(),
            export_dir: "exports".to_string(),
        }
    }
}

impl StoreLayout {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }
}

/// On-disk shape of the budget file
#[derive(Debug, Serialize, Deserialize)]
struct BudgetFile {
    monthly_budget: Decimal,
}

#[derive(Debug)]
struct StoreState {
    expenses: Vec<Expense>,
    budget: Option<Decimal>,
}

/// JSON-file-backed store. State lives in memory behind a lock; every
/// mutation persists before returning, rolling back on failure.
#[derive(Debug)]
pub struct JsonStore {
    layout: StoreLayout,
    expenses_path: PathBuf,
    backup_path: PathBuf,
    budget_path: PathBuf,
    exports_dir: PathBuf,
    state: RwLock<StoreState>,
}

impl JsonStore {
    /// Open a store, creating the data directory and loading any existing
    /// files
    pub async fn open(layout: StoreLayout) -> StoreResult<Self> {
        tokio::fs::create_dir_all(&layout.data_dir).await?;
        let expenses_path = layout.data_dir.join(&layout.expenses_file);
        let budget_path = layout.data_dir.join(&layout.budget_file);
        let exports_dir = layout.data_dir.join(&layout.export_dir);
        let backup_path = backup_path_for(&expenses_path);

        let expenses = read_expenses(&expenses_path).await?;
        let budget = read_budget(&budget_path).await?;
        info!(
            "Loaded {} expense record(s) from {}",
            expenses.len(),
            expenses_path.display()
        );

        Ok(Self {
            layout,
            expenses_path,
            backup_path,
            budget_path,
            exports_dir,
            state: RwLock::new(StoreState { expenses, budget }),
        })
    }

    /// Directory holding the store's files
    pub fn data_dir(&self) -> &Path {
        &self.layout.data_dir
    }

    async fn persist_expenses(&self, expenses: &[Expense]) -> StoreResult<()> {
        if self.expenses_path.exists() {
            if let Err(err) = tokio::fs::copy(&self.expenses_path, &self.backup_path).await {
                warn!(
                    "Could not back up {}: {}",
                    self.expenses_path.display(),
                    err
                );
            }
        }
        let payload = serde_json::to_string_pretty(expenses)?;
        write_atomic(&self.expenses_path, payload.as_bytes()).await?;
        debug!(
            "Saved {} expense record(s) to {}",
            expenses.len(),
            self.expenses_path.display()
        );
        Ok(())
    }

    async fn persist_budget(&self, budget: Decimal) -> StoreResult<()> {
        let payload = serde_json::to_string_pretty(&BudgetFile {
            monthly_budget: budget,
        })?;
        write_atomic(&self.budget_path, payload.as_bytes()).await?;
        debug!("Saved monthly budget to {}", self.budget_path.display());
        Ok(())
    }
}

#[async_trait]
impl ExpenseStore for JsonStore {
    async fn list_expenses(&self) -> Vec<Expense> {
        self.state.read().await.expenses.clone()
    }

    async fn expense(&self, id: &str) -> StoreResult<Expense> {
        let state = self.state.read().await;
        state
            .expenses
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    async fn add_expense(&self, expense: Expense) -> StoreResult<Expense> {
        let mut state = self.state.write().await;
        state.expenses.push(expense.clone());
        if let Err(err) = self.persist_expenses(&state.expenses).await {
            state.expenses.pop();
            return Err(err);
        }
        Ok(expense)
    }

    async fn update_expense(&self, id: &str, patch: ExpensePatch) -> StoreResult<Expense> {
        let mut state = self.state.write().await;
        let index = state
            .expenses
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        let mut updated = state.expenses[index].clone();
        patch.apply(&mut updated)?;

        let previous = std::mem::replace(&mut state.expenses[index], updated.clone());
        if let Err(err) = self.persist_expenses(&state.expenses).await {
            state.expenses[index] = previous;
            return Err(err);
        }
        Ok(updated)
    }

    async fn delete_expense(&self, id: &str) -> StoreResult<Expense> {
        let mut state = self.state.write().await;
        let index = state
            .expenses
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        let removed = state.expenses.remove(index);
        if let Err(err) = self.persist_expenses(&state.expenses).await {
            state.expenses.insert(index, removed);
            return Err(err);
        }
        Ok(removed)
    }

    async fn budget(&self) -> Option<Decimal> {
        self.state.read().await.budget
    }

    async fn set_budget(&self, budget: Decimal) -> StoreResult<Decimal> {
        if budget <= Decimal::ZERO {
            return Err(CoreError::InvalidBudget {
                value: budget.to_string(),
            }
            .into());
        }
        let mut normalized = budget.round_dp(2);
        normalized.rescale(2);

        let mut state = self.state.write().await;
        let previous = state.budget;
        state.budget = Some(normalized);
        if let Err(err) = self.persist_budget(normalized).await {
            state.budget = previous;
            return Err(err);
        }
        Ok(normalized)
    }

    async fn export_csv(&self, append: bool) -> StoreResult<ExportOutcome> {
        let state = self.state.read().await;
        tokio::fs::create_dir_all(&self.exports_dir).await?;
        let path = self.exports_dir.join(EXPORT_FILE);

        let mut existing = String::new();
        let mut existing_ids: HashSet<String> = HashSet::new();
        if append && path.exists() {
            existing = tokio::fs::read_to_string(&path).await?;
            let mut reader = csv::Reader::from_reader(existing.as_bytes());
            let id_column = reader.headers()?.iter().position(|h| h == "id");
            for record in reader.records() {
                let record = record?;
                if let Some(column) = id_column {
                    if let Some(id) = record.get(column) {
                        existing_ids.insert(id.to_string());
                    }
                }
            }
        }

        let appended = !existing.is_empty();
        let mut writer = csv::Writer::from_writer(Vec::new());
        if !appended {
            writer.write_record(CSV_HEADERS)?;
        }
        let mut new_rows = 0usize;
        for expense in state.expenses.iter() {
            if existing_ids.contains(&expense.id) {
                continue;
            }
            let amount = expense.amount.to_string();
            let date = expense.occurred_on.to_string();
            writer.write_record([
                expense.id.as_str(),
                expense.name.as_str(),
                amount.as_str(),
                date.as_str(),
                expense.category.as_str(),
                expense.note.as_deref().unwrap_or(""),
            ])?;
            new_rows += 1;
        }
        let rows = writer
            .into_inner()
            .map_err(|err| StoreError::IoError(err.into_error()))?;

        // Hand-edited exports may be missing the trailing newline
        if !existing.is_empty() && !existing.ends_with('\n') {
            existing.push('\n');
        }
        let mut contents = existing.into_bytes();
        contents.extend_from_slice(&rows);
        write_atomic(&path, &contents).await?;

        info!("Exported {} new row(s) to {}", new_rows, path.display());
        Ok(ExportOutcome {
            path,
            new_rows,
            appended,
        })
    }

    async fn flush(&self) -> StoreResult<()> {
        let state = self.state.read().await;
        self.persist_expenses(&state.expenses).await?;
        if let Some(budget) = state.budget {
            self.persist_budget(budget).await?;
        }
        Ok(())
    }
}

// ==================== File Helpers ====================

async fn read_expenses(path: &Path) -> StoreResult<Vec<Expense>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!(
                "No expense file at {}; starting with no records",
                path.display()
            );
            return Ok(Vec::new());
        }
        Err(err) => return Err(err.into()),
    };
    serde_json::from_str(&content).map_err(|err| StoreError::Corrupt {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

async fn read_budget(path: &Path) -> StoreResult<Option<Decimal>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let file: BudgetFile = serde_json::from_str(&content).map_err(|err| StoreError::Corrupt {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    Ok(Some(file.monthly_budget))
}

/// Write through a temp file and rename so readers never see a partial file
async fn write_atomic(path: &Path, contents: &[u8]) -> StoreResult<()> {
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

fn backup_path_for(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("expenses");
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_backup.{}", stem, ext),
        None => format!("{}_backup", stem),
    };
    path.with_file_name(name)
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn expense(name: &str, amount: &str, date: &str, category: &str) -> Expense {
        Expense::parse(name, amount, date, category).unwrap()
    }

    async fn open_store(dir: &TempDir) -> JsonStore {
        JsonStore::open(StoreLayout::new(dir.path().join("data")))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_open_empty_dir_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        assert!(store.list_expenses().await.is_empty());
        assert!(store.budget().await.is_none());
    }

    #[tokio::test]
    async fn test_add_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let added = store
            .add_expense(expense("Coffee", "4.50", "2025-10-01", "Food"))
            .await
            .unwrap();

        let reopened = open_store(&dir).await;
        let records = reopened.list_expenses().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, added.id);
        assert_eq!(records[0].amount.to_string(), "4.50");
    }

    #[tokio::test]
    async fn test_save_keeps_backup_of_previous_file() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let backup = dir.path().join("data").join("expenses_backup.json");

        store
            .add_expense(expense("Coffee", "4.50", "2025-10-01", "Food"))
            .await
            .unwrap();
        assert!(!backup.exists());

        store
            .add_expense(expense("Rent", "1200.00", "2025-10-01", "Housing"))
            .await
            .unwrap();
        assert!(backup.exists());

        let previous: Vec<Expense> =
            serde_json::from_str(&std::fs::read_to_string(&backup).unwrap()).unwrap();
        assert_eq!(previous.len(), 1);
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        store
            .add_expense(expense("Coffee", "4.50", "2025-10-01", "Food"))
            .await
            .unwrap();

        assert!(dir.path().join("data").join("expenses.json").exists());
        assert!(!dir.path().join("data").join("expenses.tmp").exists());
    }

    #[tokio::test]
    async fn test_update_applies_patch_fields() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let added = store
            .add_expense(expense("Coffee", "4.50", "2025-10-01", "Food"))
            .await
            .unwrap();

        let patch = ExpensePatch {
            amount: Some("6".parse::<Decimal>().unwrap()),
            note: Some("oat milk".to_string()),
            ..Default::default()
        };
        let updated = store.update_expense(&added.id, patch).await.unwrap();

        assert_eq!(updated.amount.to_string(), "6.00");
        assert_eq!(updated.note.as_deref(), Some("oat milk"));
        assert_eq!(updated.name, "Coffee");
        assert_eq!(updated.occurred_on.to_string(), "2025-10-01");
    }

    #[tokio::test]
    async fn test_update_clears_note_on_blank() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let added = store
            .add_expense(expense("Coffee", "4.50", "2025-10-01", "Food").with_note("small"))
            .await
            .unwrap();

        let patch = ExpensePatch {
            note: Some("  ".to_string()),
            ..Default::default()
        };
        let updated = store.update_expense(&added.id, patch).await.unwrap();
        assert!(updated.note.is_none());
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_amount_and_keeps_record() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let added = store
            .add_expense(expense("Coffee", "4.50", "2025-10-01", "Food"))
            .await
            .unwrap();

        let patch = ExpensePatch {
            amount: Some("-1".parse::<Decimal>().unwrap()),
            ..Default::default()
        };
        let err = store.update_expense(&added.id, patch).await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));

        let unchanged = store.expense(&added.id).await.unwrap();
        assert_eq!(unchanged.amount.to_string(), "4.50");
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        assert!(matches!(
            store.expense("nope").await.unwrap_err(),
            StoreError::NotFound { .. }
        ));
        assert!(matches!(
            store
                .update_expense("nope", ExpensePatch::default())
                .await
                .unwrap_err(),
            StoreError::NotFound { .. }
        ));
        assert!(matches!(
            store.delete_expense("nope").await.unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_and_persists() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let first = store
            .add_expense(expense("Coffee", "4.50", "2025-10-01", "Food"))
            .await
            .unwrap();
        store
            .add_expense(expense("Rent", "1200.00", "2025-10-01", "Housing"))
            .await
            .unwrap();

        let removed = store.delete_expense(&first.id).await.unwrap();
        assert_eq!(removed.name, "Coffee");

        let reopened = open_store(&dir).await;
        let records = reopened.list_expenses().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Rent");
    }

    #[tokio::test]
    async fn test_budget_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let saved = store.set_budget("500".parse::<Decimal>().unwrap()).await.unwrap();
        assert_eq!(saved.to_string(), "500.00");

        let reopened = open_store(&dir).await;
        assert_eq!(reopened.budget().await.unwrap().to_string(), "500.00");
    }

    #[tokio::test]
    async fn test_set_budget_rejects_non_positive() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let err = store.set_budget(Decimal::ZERO).await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
        assert!(store.budget().await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_expenses_file_errors() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        std::fs::create_dir_all(&data).unwrap();
        std::fs::write(data.join("expenses.json"), "not json").unwrap();

        let err = JsonStore::open(StoreLayout::new(data)).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_legacy_field_names_load() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        std::fs::create_dir_all(&data).unwrap();
        std::fs::write(
            data.join("expenses.json"),
            r#"[{"id":"abc","name":"Coffee","price":4.5,"expense_date":"2025-10-01","category":"Food"}]"#,
        )
        .unwrap();

        let store = JsonStore::open(StoreLayout::new(data)).await.unwrap();
        let records = store.list_expenses().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount.to_string(), "4.5");
        assert_eq!(records[0].occurred_on.to_string(), "2025-10-01");
    }

    #[tokio::test]
    async fn test_export_writes_then_dedupes() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        store
            .add_expense(expense("Coffee", "4.50", "2025-10-01", "Food"))
            .await
            .unwrap();
        store
            .add_expense(expense("Rent", "1200.00", "2025-10-01", "Housing"))
            .await
            .unwrap();

        let first = store.export_csv(true).await.unwrap();
        assert_eq!(first.new_rows, 2);
        assert!(!first.appended);

        let second = store.export_csv(true).await.unwrap();
        assert_eq!(second.new_rows, 0);
        assert!(second.appended);

        store
            .add_expense(expense("Coffee", "5.00", "2025-09-15", "Food"))
            .await
            .unwrap();
        let third = store.export_csv(true).await.unwrap();
        assert_eq!(third.new_rows, 1);

        let content = std::fs::read_to_string(&third.path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "id,name,amount,date,category,note");
        assert!(lines[1].contains("Coffee"));
    }

    #[tokio::test]
    async fn test_export_overwrite_discards_stale_rows() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let kept = store
            .add_expense(expense("Coffee", "4.50", "2025-10-01", "Food"))
            .await
            .unwrap();
        let dropped = store
            .add_expense(expense("Rent", "1200.00", "2025-10-01", "Housing"))
            .await
            .unwrap();
        store.export_csv(true).await.unwrap();

        store.delete_expense(&dropped.id).await.unwrap();
        let rewrite = store.export_csv(false).await.unwrap();
        assert_eq!(rewrite.new_rows, 1);
        assert!(!rewrite.appended);

        let content = std::fs::read_to_string(&rewrite.path).unwrap();
        assert!(content.contains(&kept.id));
        assert!(!content.contains(&dropped.id));
    }
}
