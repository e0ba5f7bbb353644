//! Reading and writing labeled transactions as CSV, plus a small illustrative corpus.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::classifier::{CategorizerError, Result};
use crate::record::{LabeledRecord, TransactionRecord};

pub const REQUIRED_COLUMNS: [&str; 2] = ["description", "category"];

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    merchant: Option<String>,
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    category: Option<String>,
}

/// Reads labeled transactions from CSV with a header row.
///
/// Required columns are checked before any row is parsed. Empty cells become absent
/// values. Category labels are not checked against a registry here; unknown labels are
/// filtered when training.
///
/// # Errors
/// - `SchemaValidation` for a missing required column, an unparsable amount, or a negative
///   amount
pub fn read_records<R: Read>(reader: R) -> Result<Vec<LabeledRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(CategorizerError::SchemaValidation(format!(
                "Missing required column: {}",
                column
            )));
        }
    }

    let mut records = Vec::new();
    for (i, row) in rdr.deserialize::<CsvRow>().enumerate() {
        // header is line 1
        let line = i + 2;
        let row = row.map_err(|e| CategorizerError::SchemaValidation(format!("line {}: {}", line, e)))?;
        let record = TransactionRecord {
            description: row.description.unwrap_or_default(),
            merchant: row.merchant.filter(|m| !m.is_empty()),
            amount: row.amount,
        };
        if let Err(CategorizerError::SchemaValidation(msg)) = record.validate() {
            return Err(CategorizerError::SchemaValidation(format!("line {}: {}", line, msg)));
        }
        records.push(LabeledRecord::new(record, row.category.unwrap_or_default()));
    }
    Ok(records)
}

pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<LabeledRecord>> {
    let path = path.as_ref();
    info!("Loading data from {}...", path.display());
    let records = read_records(File::open(path)?)?;
    info!("Loaded {} transactions", records.len());
    Ok(records)
}

pub fn write_records<W: Write>(writer: W, records: &[LabeledRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for r in records {
        wtr.serialize(CsvRow {
            description: Some(r.record.description.clone()),
            merchant: r.record.merchant.clone(),
            amount: r.record.amount,
            category: Some(r.category.clone()),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv<P: AsRef<Path>>(path: P, records: &[LabeledRecord]) -> Result<()> {
    write_records(File::create(path)?, records)
}

/// One illustrative transaction: description, merchant, amount, category.
const SYNTHETIC: &[(&str, &str, f64, &str)] = &[
    ("Swiggy food delivery bangalore biryani", "Swiggy", 450.0, "Food & Dining"),
    ("Zomato restaurant dinner pizza", "Zomato", 680.0, "Food & Dining"),
    ("McDonald burger meal combo", "McDonalds", 350.0, "Food & Dining"),
    ("Starbucks coffee latte morning", "Starbucks", 320.0, "Food & Dining"),
    ("KFC chicken bucket family meal", "KFC", 750.0, "Food & Dining"),
    ("BigBasket grocery vegetables fruits", "BigBasket", 2500.0, "Groceries"),
    ("DMart weekly shopping household", "DMart", 3200.0, "Groceries"),
    ("Blinkit instant delivery milk bread", "Blinkit", 650.0, "Groceries"),
    ("Supermarket monthly groceries atta", "Supermarket", 2800.0, "Groceries"),
    ("Uber ride airport cab", "Uber", 650.0, "Transportation"),
    ("Ola cab office commute", "Ola", 280.0, "Transportation"),
    ("Petrol pump fuel car", "IOCL", 2500.0, "Transportation"),
    ("Metro card recharge travel", "Metro", 800.0, "Transportation"),
    ("Amazon online electronics order", "Amazon", 3500.0, "Shopping"),
    ("Flipkart mobile phone purchase", "Flipkart", 18000.0, "Shopping"),
    ("Myntra clothing fashion", "Myntra", 2200.0, "Shopping"),
    ("Nykaa beauty cosmetics", "Nykaa", 1500.0, "Shopping"),
    ("Netflix subscription streaming", "Netflix", 649.0, "Entertainment"),
    ("BookMyShow movie tickets", "BookMyShow", 600.0, "Entertainment"),
    ("Spotify music premium", "Spotify", 119.0, "Entertainment"),
    ("Electricity bill payment monthly", "BSES", 1800.0, "Bills & Utilities"),
    ("Mobile recharge Airtel prepaid", "Airtel", 499.0, "Bills & Utilities"),
    ("Internet broadband bill", "Jio", 999.0, "Bills & Utilities"),
    ("Gym membership monthly fitness", "Fitness First", 3000.0, "Health & Fitness"),
    ("Doctor consultation medical", "Clinic", 800.0, "Health & Fitness"),
    ("Apollo pharmacy medicines", "Apollo", 950.0, "Health & Fitness"),
    ("Udemy course online learning", "Udemy", 499.0, "Education"),
    ("Book store textbooks purchase", "Crossword", 1200.0, "Education"),
    ("Tuition fees coaching", "Coaching", 8000.0, "Education"),
];

const SYNTHETIC_REPEATS: usize = 3;

/// The illustrative corpus: 29 transactions over 8 categories, each repeated three times.
pub fn synthetic_records() -> Vec<LabeledRecord> {
    (0..SYNTHETIC_REPEATS)
        .flat_map(|_| SYNTHETIC.iter())
        .map(|&(description, merchant, amount, category)| {
            LabeledRecord::new(
                TransactionRecord::new(description)
                    .with_merchant(merchant)
                    .with_amount(amount),
                category,
            )
        })
        .collect()
}

/// Writes the illustrative corpus to `path` and returns it.
pub fn create_synthetic_csv<P: AsRef<Path>>(path: P) -> Result<Vec<LabeledRecord>> {
    let records = synthetic_records();
    write_csv(&path, &records)?;
    info!(
        "Created {} synthetic examples in {}",
        records.len(),
        path.as_ref().display()
    );
    Ok(records)
}
