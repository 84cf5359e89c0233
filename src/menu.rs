//! Interactive terminal menu
//!
//! Covers the same operations as the HTTP surface: view, add, update, and
//! delete expenses, budget get/set, search, the reports submenu, quick
//! glance with optional text export, and CSV export.

use anyhow::{Context, Result};
use outlay_config::Config;
use outlay_core::models;
use outlay_core::{
    annual_summary, average_daily_spending_by_month, monthly_budget_comparison,
    monthly_summary_by_category, quick_glance, search_filter, weekly_summary, Expense,
    QuickGlance, SearchQuery,
};
use outlay_store::{ExpensePatch, ExpenseStore, StoreRef};
use outlay_utils::format_amount;
use rust_decimal::Decimal;
use std::io::{self, Write};

/// Category choices offered by the add and search prompts
const CATEGORIES: [&str; 6] = ["Food", "Travel", "Ent", "Misc", "Clothing", "Others"];

/// Run the menu loop until the user exits
pub async fn run(config: Config, store: StoreRef) -> Result<()> {
    let count = store.list_expenses().await.len();
    println!("Loaded {} expense(s).", count);

    loop {
        println!();
        println!("=== Outlay Menu ===");
        println!("1. View Expenses");
        println!("2. Add Expense");
        println!("3. Update Expense");
        println!("4. Delete Expense");
        println!("5. Set Monthly Budget");
        println!("6. View Monthly Budget");
        println!("7. Search & Filter");
        println!("8. Reports");
        println!("9. Quick Glance");
        println!("10. Export to CSV");
        println!("X. Exit");

        let choice = prompt("Select an option: ")?;
        match choice.to_lowercase().as_str() {
            "1" => view_expenses(&store, &config).await?,
            "2" => add_expense(&store).await?,
            "3" => update_expense(&store).await?,
            "4" => delete_expense(&store).await?,
            "5" => set_budget(&store).await?,
            "6" => view_budget(&store).await?,
            "7" => search(&store, &config).await?,
            "8" => reports_menu(&store).await?,
            "9" => quick_glance_menu(&store, &config).await?,
            "10" => export_to_csv(&store).await?,
            "x" | "exit" => {
                store.flush().await?;
                println!("Goodbye! Data saved.");
                break;
            }
            _ => println!("Invalid option, please try again."),
        }
    }
    Ok(())
}

// ==================== Prompting ====================

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line.trim().to_string())
}

fn print_categories() {
    println!();
    println!("Available categories:");
    for (index, category) in CATEGORIES.iter().enumerate() {
        println!("{}. {}", index + 1, category);
    }
}

/// List expenses and let the user pick one by number
async fn pick_expense(store: &StoreRef, action: &str) -> Result<Option<Expense>> {
    let expenses = store.list_expenses().await;
    if expenses.is_empty() {
        println!("No expenses available to {}.", action);
        return Ok(None);
    }

    println!();
    println!("Expenses List:");
    for (index, expense) in expenses.iter().enumerate() {
        println!("{}. {}", index + 1, expense);
    }

    let choice = prompt(&format!("\nEnter the number of the expense to {}: ", action))?;
    let Some(index) = choice.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) else {
        println!("Please enter a valid number.");
        return Ok(None);
    };
    match expenses.into_iter().nth(index) {
        Some(expense) => Ok(Some(expense)),
        None => {
            println!("Invalid expense number.");
            Ok(None)
        }
    }
}

// ==================== Expense Handlers ====================

async fn view_expenses(store: &StoreRef, config: &Config) -> Result<()> {
    let expenses = store.list_expenses().await;
    if expenses.is_empty() {
        println!("No expenses recorded.");
        return Ok(());
    }

    println!();
    println!("Expenses List:");
    let page_size = config.pagination.records_per_page.max(1);
    for (index, expense) in expenses.iter().enumerate() {
        println!("{}. {}", index + 1, expense);
        let at_page_break = (index + 1) % page_size == 0 && index + 1 < expenses.len();
        if at_page_break {
            let answer = prompt("-- Enter for more, q to stop -- ")?;
            if answer.eq_ignore_ascii_case("q") {
                break;
            }
        }
    }
    Ok(())
}

async fn add_expense(store: &StoreRef) -> Result<()> {
    let name = prompt("Name: ")?;
    let amount = prompt("Amount: ")?;
    let date = prompt("Date (YYYY-MM-DD): ")?;

    print_categories();
    let category_choice = prompt(&format!("Category (1-{}): ", CATEGORIES.len()))?;
    let category = category_choice
        .parse::<usize>()
        .ok()
        .and_then(|number| CATEGORIES.get(number.checked_sub(1)?))
        .copied()
        .unwrap_or("Misc");

    let note = prompt("Note (optional): ")?;

    let expense = match Expense::parse(&name, &amount, &date, category) {
        Ok(expense) => expense.with_note(&note),
        Err(err) => {
            println!("Could not add expense:\n{}", err.to_details());
            return Ok(());
        }
    };

    store.add_expense(expense).await?;
    println!("Expense added successfully.");
    Ok(())
}

async fn update_expense(store: &StoreRef) -> Result<()> {
    let Some(target) = pick_expense(store, "update").await? else {
        return Ok(());
    };

    println!("Leave a field blank to keep the current value.");
    let name = prompt(&format!("Name [{}]: ", target.name))?;
    let amount = prompt(&format!("Amount [{}]: ", target.amount))?;
    let date = prompt(&format!("Date [{}]: ", target.occurred_on))?;
    let category = prompt(&format!("Category [{}]: ", target.category))?;
    let note = prompt(&format!(
        "Note [{}]: ",
        target.note.as_deref().unwrap_or("-")
    ))?;

    let mut patch = ExpensePatch::default();
    if !name.is_empty() {
        patch.name = Some(name);
    }
    if !amount.is_empty() {
        let Ok(value) = amount.parse::<Decimal>() else {
            println!("Invalid amount format.");
            return Ok(());
        };
        patch.amount = Some(value);
    }
    if !date.is_empty() {
        match models::parse_date(&date) {
            Ok(value) => patch.occurred_on = Some(value),
            Err(err) => {
                println!("{}", err);
                return Ok(());
            }
        }
    }
    if !category.is_empty() {
        patch.category = Some(category);
    }
    if !note.is_empty() {
        patch.note = Some(note);
    }

    if patch.is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }

    match store.update_expense(&target.id, patch).await {
        Ok(updated) => println!("Updated: {}", updated),
        Err(err) if err.is_client_error() => println!("Could not update: {}", err),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

async fn delete_expense(store: &StoreRef) -> Result<()> {
    let Some(target) = pick_expense(store, "delete").await? else {
        return Ok(());
    };

    let confirm = prompt(&format!(
        "Are you sure you want to delete '{}'? (y/n): ",
        target.name
    ))?;
    if !confirm.eq_ignore_ascii_case("y") {
        println!("Deletion cancelled.");
        return Ok(());
    }

    store.delete_expense(&target.id).await?;
    println!("Expense deleted successfully.");
    Ok(())
}

// ==================== Budget Handlers ====================

async fn set_budget(store: &StoreRef) -> Result<()> {
    let input = prompt("\nEnter your monthly budget ($): ")?;
    let Ok(budget) = input.parse::<Decimal>() else {
        println!("Invalid input. Please enter a numeric value.");
        return Ok(());
    };
    match store.set_budget(budget).await {
        Ok(saved) => println!("Monthly budget set to ${}", format_amount(saved)),
        Err(err) if err.is_client_error() => println!("{}", err),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

async fn view_budget(store: &StoreRef) -> Result<()> {
    match store.budget().await {
        Some(budget) => println!("\nCurrent monthly budget: ${}", format_amount(budget)),
        None => println!("No monthly budget set yet."),
    }
    Ok(())
}

// ==================== Search ====================

async fn search(store: &StoreRef, config: &Config) -> Result<()> {
    println!();
    println!("Search & Filter");
    let name = prompt("Enter name to search (or leave blank): ")?;

    print_categories();
    let category_input = prompt("Enter category numbers (comma-separated, or leave blank): ")?;
    let categories: Vec<String> = category_input
        .split(',')
        .filter_map(|token| token.trim().parse::<usize>().ok())
        .filter_map(|number| number.checked_sub(1))
        .filter_map(|index| CATEGORIES.get(index))
        .map(|category| category.to_string())
        .collect();

    let date = prompt("Enter date (YYYY-MM-DD, YYYY-MM, or YYYY) to filter (or leave blank): ")?;

    let query = SearchQuery {
        name: if name.is_empty() { None } else { Some(name) },
        categories,
        date: if date.is_empty() { None } else { Some(date) },
        fuzzy_threshold: config.search.fuzzy_threshold,
    };

    let expenses = store.list_expenses().await;
    let results = search_filter(&expenses, &query);
    if results.is_empty() {
        println!();
        println!("No matching expenses found.");
    } else {
        println!();
        println!("Matching expenses:");
        for (index, expense) in results.iter().enumerate() {
            println!("{}. {}", index + 1, expense);
        }
    }
    Ok(())
}

// ==================== Reports ====================

async fn reports_menu(store: &StoreRef) -> Result<()> {
    let expenses = store.list_expenses().await;
    if expenses.is_empty() {
        println!("No expenses found to summarize.");
        return Ok(());
    }

    println!();
    println!("Reports Menu:");
    println!("1. Monthly Summary (vs Budget)");
    println!("2. Monthly Summary by Category");
    println!("3. Weekly Summary");
    println!("4. Annual Summary");
    println!("5. Average Daily Spending");
    let choice = prompt("Select report type (1-5): ")?;

    match choice.as_str() {
        "1" => {
            let Some(budget) = store.budget().await else {
                println!("No budget data found. Please set a monthly budget first.");
                return Ok(());
            };
            println!();
            println!("Monthly Summary vs Budget:");
            for (key, comparison) in monthly_budget_comparison(&expenses, budget) {
                let position = if comparison.is_over() { "over" } else { "under" };
                println!(
                    "-> {}: ${} of ${} ({}% of budget, {})",
                    key.label(),
                    format_amount(comparison.total),
                    format_amount(comparison.budget),
                    comparison.percent_of_budget,
                    position
                );
            }
        }
        "2" => {
            println!();
            println!("Monthly Summary by Category:");
            for (key, breakdown) in monthly_summary_by_category(&expenses) {
                println!();
                println!("{}:", key.label());
                for (category, total) in &breakdown.by_category {
                    println!("   {:<12} ${}", category, format_amount(*total));
                }
            }
        }
        "3" => {
            println!();
            println!("Weekly Summary:");
            for (key, week) in weekly_summary(&expenses) {
                println!(
                    "Week {} of {} ({} to {}): ${}",
                    key.week,
                    key.year,
                    week.start,
                    week.end,
                    format_amount(week.total)
                );
            }
        }
        "4" => {
            println!();
            println!("Annual Summary:");
            for (year, total) in annual_summary(&expenses) {
                println!("{}: ${}", year, format_amount(total));
            }
        }
        "5" => {
            println!();
            println!("Average Daily Spending by Month:");
            for (key, daily) in average_daily_spending_by_month(&expenses) {
                println!(
                    "{}: ${}/day over {} days (Total ${})",
                    key.label(),
                    format_amount(daily.average),
                    daily.days,
                    format_amount(daily.total)
                );
            }
        }
        _ => println!("Invalid choice."),
    }
    Ok(())
}

// ==================== Quick Glance ====================

async fn quick_glance_menu(store: &StoreRef, config: &Config) -> Result<()> {
    let expenses = store.list_expenses().await;
    if expenses.is_empty() {
        println!("No expenses found to analyze.");
        return Ok(());
    }

    let year_input = prompt("Enter year (e.g. 2025): ")?;
    let month_input = prompt("Enter month (1-12): ")?;
    let (Ok(year), Ok(month)) = (year_input.parse::<i32>(), month_input.parse::<u32>()) else {
        println!("Invalid input; please enter numbers for year and month.");
        return Ok(());
    };
    if !(1..=12).contains(&month) {
        println!("Month must be between 1 and 12.");
        return Ok(());
    }

    let Some(budget) = store.budget().await else {
        println!("No budget data found. Please set a monthly budget first.");
        return Ok(());
    };

    let glance = match quick_glance(&expenses, year, month, budget) {
        Ok(glance) => glance,
        Err(err) => {
            println!("{}", err);
            return Ok(());
        }
    };

    let lines = glance_lines(&glance);
    println!();
    println!("QUICK GLANCE REPORT");
    println!("{}", "-".repeat(40));
    for line in &lines {
        println!("{}", line);
    }

    let export = prompt("\nWould you like to export this report to a text file? (y/n): ")?;
    if export.eq_ignore_ascii_case("y") {
        let reports_dir = config.data.path.join("reports");
        std::fs::create_dir_all(&reports_dir)
            .with_context(|| format!("Failed to create {}", reports_dir.display()))?;
        let path = reports_dir.join(format!("Quick_Glance_Report_{}_{:02}.txt", year, month));
        std::fs::write(&path, lines.join("\n"))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Report saved to {}", path.display());
    }
    Ok(())
}

fn glance_lines(glance: &QuickGlance) -> Vec<String> {
    vec![
        glance
            .indicator
            .as_ref()
            .map(|metric| metric.headline())
            .unwrap_or_else(|| "No expenses found for that month.".to_string()),
        glance
            .top_category
            .as_ref()
            .map(|metric| metric.headline())
            .unwrap_or_else(|| "No expenses for this month.".to_string()),
        glance
            .month_change
            .as_ref()
            .map(|metric| metric.headline())
            .unwrap_or_else(|| "Not enough data to compare.".to_string()),
        glance
            .burn_rate
            .as_ref()
            .map(|metric| metric.headline())
            .unwrap_or_else(|| "No expenses to calculate daily burn rate.".to_string()),
    ]
}

// ==================== Export ====================

async fn export_to_csv(store: &StoreRef) -> Result<()> {
    let expenses = store.list_expenses().await;
    if expenses.is_empty() {
        println!("No expenses recorded to export.");
        return Ok(());
    }

    let confirm = prompt("Export all expenses to CSV? (y/n): ")?;
    if !confirm.eq_ignore_ascii_case("y") {
        println!("Export canceled.");
        return Ok(());
    }

    let outcome = store.export_csv(true).await?;
    println!(
        "Exported {} new row(s) to {}",
        outcome.new_rows,
        outcome.path.display()
    );
    Ok(())
}
