// Fixed-width text rendering for tabular data (CSV files and spreadsheet sheets)

/// Cells are right-aligned to the widest value in their column and columns
/// are separated by two spaces.
#[derive(Debug, Clone, Default)]
pub struct TextTable {
    header: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
    index: bool,
    missing: String,
}

impl TextTable {
    pub fn new() -> Self {
        Self {
            missing: "NaN".to_string(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, header: Vec<String>) -> Self {
        self.header = Some(header);
        self
    }

    /// Prefix every data row with its 0-based position
    pub fn with_index(mut self) -> Self {
        self.index = true;
        self
    }

    /// Text used for cells a short row does not have
    pub fn with_missing(mut self, missing: impl Into<String>) -> Self {
        self.missing = missing.into();
        self
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(self.header.iter().map(Vec::len))
            .max()
            .unwrap_or(0);

        if self.rows.is_empty() {
            let names = self.header.as_deref().unwrap_or(&[]).join(", ");
            return format!("Empty DataFrame\nColumns: [{}]\nIndex: []", names);
        }

        let mut lines: Vec<Vec<String>> = Vec::with_capacity(self.rows.len() + 1);
        if let Some(header) = &self.header {
            let mut line = Vec::with_capacity(columns + 1);
            if self.index {
                line.push(String::new());
            }
            for col in 0..columns {
                line.push(header.get(col).cloned().unwrap_or_default());
            }
            lines.push(line);
        }
        for (position, row) in self.rows.iter().enumerate() {
            let mut line = Vec::with_capacity(columns + 1);
            if self.index {
                line.push(position.to_string());
            }
            for col in 0..columns {
                line.push(row.get(col).cloned().unwrap_or_else(|| self.missing.clone()));
            }
            lines.push(line);
        }

        let width = lines.first().map(Vec::len).unwrap_or(0);
        let widths: Vec<usize> = (0..width)
            .map(|col| {
                lines
                    .iter()
                    .map(|line| line[col].chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        lines
            .iter()
            .map(|line| {
                line.iter()
                    .zip(&widths)
                    .map(|(cell, w)| format!("{:>width$}", cell, width = *w))
                    .collect::<Vec<_>>()
                    .join("  ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
