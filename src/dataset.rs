//! Titanic dataset provider: loaded once at startup, copied per request.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

/// Columns the prompt contract promises to generated code. Loading fails if
/// any of them is missing from the source file.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "PassengerId",
    "Survived",
    "Pclass",
    "Name",
    "Sex",
    "Age",
    "SibSp",
    "Parch",
    "Ticket",
    "Fare",
    "Cabin",
    "Embarked",
];

/// In-memory snapshot of the passenger table. The canonical instance is
/// created once per process and never mutated; each request works on its own
/// [`Dataset::copy`].
#[derive(Debug, Clone)]
pub struct Dataset {
    headers: Vec<String>,
    rows: usize,
    raw: String,
}

impl Dataset {
    /// Read and validate the CSV source. There is no fallback data, so any
    /// failure here is fatal to the process.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dataset at {}", path.display()))?;
        let dataset = Self::from_csv(&raw)
            .with_context(|| format!("malformed dataset at {}", path.display()))?;
        info!(
            rows = dataset.rows,
            columns = dataset.headers.len(),
            "Titanic dataset loaded"
        );
        Ok(dataset)
    }

    /// Parse CSV text, checking the fixed schema and that every record is
    /// well formed.
    pub fn from_csv(raw: &str) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(raw.as_bytes());
        let headers: Vec<String> = reader
            .headers()
            .context("failed to read CSV header")?
            .iter()
            .map(str::to_string)
            .collect();

        for col in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == col) {
                bail!("dataset is missing required column: {col}");
            }
        }

        let mut rows = 0usize;
        for record in reader.records() {
            record.context("failed to parse CSV record")?;
            rows += 1;
        }
        if rows == 0 {
            bail!("dataset contains no records");
        }

        Ok(Self { headers, rows, raw: raw.to_string() })
    }

    /// Independent snapshot for one request's sandbox namespace.
    pub fn copy(&self) -> Dataset {
        self.clone()
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Raw CSV text, used to hand the table to the execution sandbox.
    pub fn as_csv(&self) -> &str {
        &self.raw
    }

    /// First `n` rows rendered as a markdown table (CLI preview).
    pub fn preview(&self, n: usize) -> String {
        let mut reader = csv::Reader::from_reader(self.raw.as_bytes());
        let mut out = String::new();
        out.push_str(&format!("| {} |\n", self.headers.join(" | ")));
        out.push_str(&format!(
            "|{}\n",
            "---|".repeat(self.headers.len())
        ));
        for record in reader.records().take(n).map_while(Result::ok) {
            let cells: Vec<&str> = record.iter().collect();
            out.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) const SAMPLE: &str = "\
PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked
1,0,3,\"Braund, Mr. Owen Harris\",male,22,1,0,A/5 21171,7.25,,S
2,1,1,\"Cumings, Mrs. John Bradley\",female,38,1,0,PC 17599,71.2833,C85,C
3,1,3,\"Heikkinen, Miss. Laina\",female,26,0,0,STON/O2. 3101282,7.925,,S
";

    #[test]
    fn parses_valid_csv() {
        let ds = Dataset::from_csv(SAMPLE).unwrap();
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.headers().len(), 12);
    }

    #[test]
    fn rejects_missing_column() {
        let bad = "PassengerId,Survived\n1,0\n";
        let err = Dataset::from_csv(bad).unwrap_err();
        assert!(err.to_string().contains("missing required column"));
    }

    #[test]
    fn rejects_empty_table() {
        let header_only = SAMPLE.lines().next().unwrap().to_string() + "\n";
        assert!(Dataset::from_csv(&header_only).is_err());
    }

    #[test]
    fn copy_is_independent_snapshot() {
        let ds = Dataset::from_csv(SAMPLE).unwrap();
        let copy = ds.copy();
        assert_eq!(copy.as_csv(), ds.as_csv());
        assert_eq!(copy.row_count(), ds.row_count());
        // Dropping the copy leaves the canonical table intact.
        drop(copy);
        assert_eq!(ds.row_count(), 3);
    }

    #[test]
    fn preview_renders_markdown() {
        let ds = Dataset::from_csv(SAMPLE).unwrap();
        let table = ds.preview(2);
        assert!(table.starts_with("| PassengerId |"));
        assert_eq!(table.lines().count(), 4); // header + separator + 2 rows
    }
}
