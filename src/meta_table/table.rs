use super::TableError;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Column-oriented meta table.
///
/// Field order and row order are part of the data: downstream stages identify a
/// record by its row index, so nothing here ever reorders either.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    fields: Vec<String>,
    columns: Vec<Vec<String>>,
    rows: usize,
}

impl Table {
    /// Create a table with no fields and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a tab-delimited snapshot.
    pub fn read(path: &Path) -> Result<Self, TableError> {
        let content = fs::read_to_string(path).map_err(|e| TableError::io(path, e))?;
        Self::parse(&content)
    }

    /// Parse tab-delimited text: a header line, then one line per record.
    pub fn parse(content: &str) -> Result<Self, TableError> {
        let mut lines: Vec<&str> = content.split('\n').collect();
        // A trailing newline leaves one empty element behind.
        if lines.last() == Some(&"") {
            lines.pop();
        }

        let mut lines = lines.into_iter().map(|l| l.strip_suffix('\r').unwrap_or(l));
        let header = match lines.next() {
            Some(header) if !header.is_empty() => header,
            _ => return Err(TableError::Format("missing header line".to_string())),
        };

        let mut table = Table::new();
        for name in header.split('\t') {
            if table.has_field(name) {
                return Err(TableError::Format(format!("duplicate field {:?}", name)));
            }
            table.fields.push(name.to_string());
            table.columns.push(Vec::new());
        }

        for (idx, line) in lines.enumerate() {
            let values: Vec<&str> = line.split('\t').collect();
            if values.len() != table.fields.len() {
                return Err(TableError::Format(format!(
                    "line {}: expected {} values, found {}",
                    idx + 2,
                    table.fields.len(),
                    values.len()
                )));
            }
            for (column, value) in table.columns.iter_mut().zip(values) {
                column.push(value.to_string());
            }
            table.rows += 1;
        }

        Ok(table)
    }

    /// Write the table atomically: the previous file at `path` stays untouched
    /// unless the whole table was written.
    pub fn write(&self, path: &Path) -> Result<(), TableError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let tmp = NamedTempFile::new_in(dir).map_err(|e| TableError::io(dir, e))?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            self.write_to(&mut writer)
                .map_err(|e| TableError::io(tmp.path(), e))?;
            writer.flush().map_err(|e| TableError::io(tmp.path(), e))?;
        }
        tmp.persist(path)
            .map_err(|e| TableError::io(path, e.error))?;
        Ok(())
    }

    /// Serialize header and rows, every line terminated by `\n`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "{}", self.fields.join("\t"))?;
        for n in 0..self.rows {
            let line = self
                .columns
                .iter()
                .map(|column| column[n].as_str())
                .collect::<Vec<_>>()
                .join("\t");
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    }

    /// Append a field. The values must line up with the existing rows.
    ///
    /// The first field added to an empty table defines the row count.
    pub fn add_column<S: Into<String>>(
        &mut self,
        name: &str,
        values: Vec<S>,
    ) -> Result<(), TableError> {
        if self.has_field(name) {
            return Err(TableError::Format(format!("duplicate field {:?}", name)));
        }
        if !self.fields.is_empty() && values.len() != self.rows {
            return Err(TableError::Shape {
                field: name.to_string(),
                expected: self.rows,
                found: values.len(),
            });
        }
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values
            .iter()
            .any(|v| v.contains(|c: char| c == '\t' || c == '\n' || c == '\r'))
        {
            return Err(TableError::Format(format!(
                "field {:?} has a value containing a tab or line break",
                name
            )));
        }

        self.rows = values.len();
        self.fields.push(name.to_string());
        self.columns.push(values);
        Ok(())
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column(&self, name: &str) -> Result<&[String], TableError> {
        self.fields
            .iter()
            .position(|f| f == name)
            .map(|idx| self.columns[idx].as_slice())
            .ok_or_else(|| TableError::MissingField(name.to_string()))
    }

    pub fn value(&self, row: usize, name: &str) -> Result<&str, TableError> {
        let column = self.column(name)?;
        column
            .get(row)
            .map(String::as_str)
            .ok_or_else(|| TableError::Format(format!("row {} out of bounds", row)))
    }

    /// All values of one record, in field order.
    pub fn row(&self, n: usize) -> Option<Vec<&str>> {
        if n >= self.rows {
            return None;
        }
        Some(self.columns.iter().map(|c| c[n].as_str()).collect())
    }

    /// Keep only the first `n` records.
    pub fn truncate(&mut self, n: usize) {
        for column in &mut self.columns {
            column.truncate(n);
        }
        self.rows = self.rows.min(n);
    }
}
