// Response normalization: JSON and XML bodies into Book records
use crate::book::Book;
use crate::dom::{Element, XmlParser};
use crate::error::SearchError;
use serde_json::Value;

/// Maps a JSON array of `{book: {title, author, isbn}, stock: {quantity, price}}`
/// rows to books, in order.
///
/// Missing nested objects or fields become `None`. A body that is not an
/// array is a [`SearchError::NotAnArray`].
pub fn normalize_json(value: &Value) -> Result<Vec<Book>, SearchError> {
    let rows = value.as_array().ok_or(SearchError::NotAnArray {
        found: json_kind(value),
    })?;

    Ok(rows.iter().map(book_from_json).collect())
}

fn book_from_json(row: &Value) -> Book {
    let book = row.get("book");
    let stock = row.get("stock");

    Book {
        title: field(book, "title").and_then(json_string),
        author: field(book, "author").and_then(json_string),
        isbn: field(book, "isbn").and_then(json_string),
        quantity: field(stock, "quantity").and_then(json_number),
        price: field(stock, "price").and_then(json_number),
    }
}

fn field<'a>(parent: Option<&'a Value>, name: &str) -> Option<&'a Value> {
    parent.and_then(|p| p.get(name))
}

fn json_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn json_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parses `text` with `parser` and maps each direct child of the root to a book.
///
/// String fields come from the first descendant with the matching tag name.
/// `quantity` and `price` are always present and are NaN when the tag or its
/// text is missing or not numeric.
pub fn normalize_xml(parser: &dyn XmlParser, text: &str) -> Result<Vec<Book>, SearchError> {
    let root = parser.parse(text).map_err(SearchError::XmlParse)?;

    Ok(root.child_elements().map(book_from_row).collect())
}

fn book_from_row(row: &Element) -> Book {
    Book {
        title: row_text(row, "title"),
        author: row_text(row, "author"),
        isbn: row_text(row, "isbn"),
        quantity: Some(coerce_number(row_text(row, "quantity").as_deref())),
        price: Some(coerce_number(row_text(row, "price").as_deref())),
    }
}

fn row_text(row: &Element, tag: &str) -> Option<String> {
    row.first_descendant(tag)?.first_text().map(str::to_string)
}

/// Loose numeric coercion: absent is NaN, blank is zero, otherwise a decimal
/// or `0x`/`0o`/`0b` literal.
pub fn coerce_number(text: Option<&str>) -> f64 {
    let Some(text) = text else {
        return f64::NAN;
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let radix = match trimmed.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &trimmed[2..];
        // from_str_radix would accept a sign after the prefix
        if digits.starts_with(['+', '-']) {
            return f64::NAN;
        }
        return u64::from_str_radix(digits, radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }

    match trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed) {
        "Infinity" => {
            if trimmed.starts_with('-') {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            }
        }
        // Rust accepts "inf" and "nan" spellings that are not numbers here
        unsigned if unsigned.starts_with(|c: char| c.is_ascii_alphabetic()) => f64::NAN,
        _ => trimmed.parse().unwrap_or(f64::NAN),
    }
}
