//! CSV parser
//!
//! The first record is the header unless `header=false`, in which case
//! the caller-supplied column list names the fields. Every following
//! record becomes one object; cells get best-effort scalar coercion
//! applied independently per cell. Row-length handling is configurable:
//! lenient zips short rows and drops surplus cells, strict rejects any
//! mismatch.

use crate::conversion::config::{ConversionOptions, CsvOptions, RowLength};
use crate::conversion::limits::Deadline;
use crate::error::{ConversionError, ConversionResult, ParseError};
use crate::parser::coerce_scalar;
use crate::value::{Object, Value};

pub fn parse(
    text: &str,
    options: &ConversionOptions,
    deadline: &Deadline,
) -> ConversionResult<Value> {
    let csv = &options.csv;
    let records = read_records(text, csv, deadline)?;
    if records.is_empty() {
        return Err(ConversionError::parse("Empty input", 1, 1));
    }

    let mut records = records.into_iter();
    let columns: Vec<String> = if csv.header {
        records
            .next()
            .map(|record| record.cells)
            .unwrap_or_default()
    } else {
        match &csv.columns {
            Some(columns) => columns.clone(),
            None => {
                return Err(ConversionError::conversion(
                    crate::error::ConversionErrorKind::configuration(
                        "CSV without a header line requires an explicit column list",
                    ),
                ));
            }
        }
    };
    if columns.is_empty() {
        return Err(ConversionError::parse("Empty header record", 1, 1));
    }

    let mut rows = Vec::new();
    for record in records {
        deadline.check()?;
        if record.cells.len() != columns.len() && csv.row_length == RowLength::Strict {
            return Err(ParseError::new(
                format!(
                    "Row has {} cells, header has {} columns",
                    record.cells.len(),
                    columns.len()
                ),
                record.line,
                1,
            )
            .with_code("ragged-row")
            .into());
        }
        let mut row = Object::new();
        // Lenient mode: zip stops at the shorter side
        for (column, cell) in columns.iter().zip(record.cells.iter()) {
            Value::insert_member(&mut row, column.clone(), coerce_scalar(cell));
        }
        rows.push(Value::Object(row));
    }

    Ok(Value::Array(rows))
}

struct Record {
    cells: Vec<String>,
    line: usize,
}

/// State-machine record reader with doubled-quote escaping
fn read_records(
    text: &str,
    csv: &CsvOptions,
    deadline: &Deadline,
) -> ConversionResult<Vec<Record>> {
    let mut records = Vec::new();
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut record_line = 1usize;
    let mut line = 1usize;
    let mut saw_any = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        deadline.check()?;
        saw_any = true;
        if in_quotes {
            if c == csv.quote {
                if chars.peek() == Some(&csv.quote) {
                    chars.next();
                    cell.push(csv.quote);
                } else {
                    in_quotes = false;
                }
            } else {
                if c == '\n' {
                    line += 1;
                }
                cell.push(c);
            }
        } else if c == csv.quote {
            if !cell.is_empty() {
                return Err(ConversionError::parse(
                    "Quote character inside unquoted field",
                    line,
                    1,
                ));
            }
            in_quotes = true;
        } else if c == csv.delimiter {
            cells.push(std::mem::take(&mut cell));
        } else if c == '\n' || c == '\r' {
            if c == '\r' && chars.peek() == Some(&'\n') {
                chars.next();
            }
            cells.push(std::mem::take(&mut cell));
            // Skip fully blank records
            if !(cells.len() == 1 && cells[0].is_empty()) {
                records.push(Record {
                    cells: std::mem::take(&mut cells),
                    line: record_line,
                });
            } else {
                cells.clear();
            }
            line += 1;
            record_line = line;
        } else {
            cell.push(c);
        }
    }

    if in_quotes {
        return Err(ConversionError::parse(
            "Unterminated quoted field",
            record_line,
            1,
        ));
    }
    if saw_any && (!cell.is_empty() || !cells.is_empty()) {
        cells.push(cell);
        if !(cells.len() == 1 && cells[0].is_empty()) {
            records.push(Record {
                cells,
                line: record_line,
            });
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;
    use assert_matches::assert_matches;

    fn parse_default(text: &str) -> ConversionResult<Value> {
        parse(text, &ConversionOptions::default(), &Deadline::unbounded())
    }

    #[test]
    fn test_header_and_coercion() {
        let value = parse_default("name,age,active\nJohn,30,true\nJane,25.5,false\n").unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        let john = rows[0].as_object().unwrap();
        assert_eq!(john["name"], Value::String("John".to_string()));
        assert_eq!(john["age"], Value::Number(Number::Int(30)));
        assert_eq!(john["active"], Value::Bool(true));
        let jane = rows[1].as_object().unwrap();
        assert_eq!(jane["age"], Value::Number(Number::Float(25.5)));
    }

    #[test]
    fn test_quoted_fields() {
        let value = parse_default("a,b\n\"x,y\",\"He said \"\"hi\"\"\"\n").unwrap();
        let row = value.as_array().unwrap()[0].as_object().unwrap().clone();
        assert_eq!(row["a"], Value::String("x,y".to_string()));
        assert_eq!(row["b"], Value::String("He said \"hi\"".to_string()));
    }

    #[test]
    fn test_embedded_newline_in_quoted_field() {
        let value = parse_default("a,b\n\"line1\nline2\",2\n").unwrap();
        let row = value.as_array().unwrap()[0].as_object().unwrap().clone();
        assert_eq!(row["a"], Value::String("line1\nline2".to_string()));
    }

    #[test]
    fn test_custom_delimiter() {
        let mut options = ConversionOptions::default();
        options.csv.delimiter = ';';
        let value = parse("a;b\n1;2\n", &options, &Deadline::unbounded()).unwrap();
        let row = value.as_array().unwrap()[0].as_object().unwrap().clone();
        assert_eq!(row["b"], Value::Number(Number::Int(2)));
    }

    #[test]
    fn test_no_header_with_columns() {
        let mut options = ConversionOptions::default();
        options.csv.header = false;
        options.csv.columns = Some(vec!["x".to_string(), "y".to_string()]);
        let value = parse("1,2\n3,4\n", &options, &Deadline::unbounded()).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[1].as_object().unwrap()["y"],
            Value::Number(Number::Int(4))
        );
    }

    #[test]
    fn test_ragged_rows_lenient() {
        let value = parse_default("a,b,c\n1,2\n1,2,3,4\n").unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows[0].as_object().unwrap().len(), 2);
        assert_eq!(rows[1].as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_ragged_rows_strict() {
        let mut options = ConversionOptions::default();
        options.csv.row_length = RowLength::Strict;
        let result = parse("a,b,c\n1,2\n", &options, &Deadline::unbounded());
        assert_matches!(result.unwrap_err(), ConversionError::Parse(e) => {
            assert_eq!(e.code, "ragged-row");
            assert_eq!(e.line, 2);
        });
    }

    #[test]
    fn test_unterminated_quote() {
        assert!(parse_default("a,b\n\"oops,2\n").is_err());
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_default("").is_err());
        assert!(parse_default("\n\n").is_err());
    }
}
