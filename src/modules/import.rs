//! Goodreads library export import
//!
//! Only rows on the `to-read` shelf become books. Rows with missing columns
//! are kept with empty values; nothing beyond CSV syntax is validated.

use csv::StringRecord;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::models::Book;

const TO_READ_SHELF: &str = "to-read";

#[derive(Debug)]
pub struct ImportError(String);

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CSV parse error: {}", self.0)
    }
}

impl std::error::Error for ImportError {}

/// Column positions resolved once from the header row.
struct Columns {
    book_id: Option<usize>,
    title: Option<usize>,
    author: Option<usize>,
    exclusive_shelf: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        Self {
            book_id: find("Book Id"),
            title: find("Title"),
            author: find("Author l-f"),
            exclusive_shelf: find("Exclusive Shelf"),
        }
    }
}

/// Missing columns and short records both read as empty strings.
fn field(record: &StringRecord, idx: Option<usize>) -> &str {
    idx.and_then(|i| record.get(i)).unwrap_or("")
}

pub fn parse_goodreads_csv(content: &[u8]) -> Result<Vec<Book>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content);

    let headers = rdr.headers().map_err(|e| ImportError(e.to_string()))?;
    let columns = Columns::from_headers(headers);

    let mut books = Vec::new();
    let mut skipped = 0usize;

    for result in rdr.records() {
        let record = result.map_err(|e| ImportError(e.to_string()))?;

        let shelf = field(&record, columns.exclusive_shelf);
        if shelf.trim().to_lowercase() != TO_READ_SHELF {
            skipped += 1;
            continue;
        }

        let book_id = field(&record, columns.book_id);
        let title = field(&record, columns.title);
        if book_id.is_empty() {
            tracing::warn!("to-read row without a Book Id: {:?}", title);
        }

        books.push(Book::imported(
            book_id.to_string(),
            normalize_title(title),
            field(&record, columns.author).to_string(),
        ));
    }

    tracing::info!(
        "Parsed {} to-read books ({} rows on other shelves)",
        books.len(),
        skipped
    );
    Ok(books)
}

static TRAILING_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]*\)\s*$").expect("valid title pattern"));

/// Drop one trailing parenthetical (usually the series) and surrounding
/// whitespace: `"Dune (Dune #1)"` becomes `"Dune"`.
pub fn normalize_title(title: &str) -> String {
    TRAILING_GROUP.replace(title, "").trim().to_string()
}
