//! Fixture record types and their table definitions.

use serde::{Deserialize, Serialize};
use tabkv_codec::{encode, KeyEncoder, OrderedKey};
use tabkv_core::{CborCodec, Table};

/// A shop order, indexed by type, status and district.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Primary key.
    pub id: u64,
    /// Product type, e.g. `"book"`.
    pub kind: String,
    /// Processing status.
    pub status: u32,
    /// Delivery district.
    pub district: String,
}

impl Order {
    /// Creates an order.
    pub fn new(id: u64, kind: &str, status: u32, district: &str) -> Self {
        Self {
            id,
            kind: kind.to_string(),
            status,
            district: district.to_string(),
        }
    }
}

/// Encoded primary key of an order.
#[must_use]
pub fn order_key(id: u64) -> Vec<u8> {
    id.to_ordered_bytes()
}

/// Encoded `Status` value as stored in index keys.
#[must_use]
pub fn status(value: u32) -> Vec<u8> {
    value.to_ordered_bytes()
}

/// Orders in bucket `shop/orders` with:
/// - `pk_ID`
/// - `idx_Type_Status_District`, nested under the data bucket
/// - `idx_Status`, nested under the data bucket
///
/// # Panics
///
/// Never, the definition is valid.
#[must_use]
pub fn order_table() -> Table<Order> {
    Table::builder("shop/orders")
        .fields(["ID", "Type", "Status", "District"])
        .codec(CborCodec::new())
        .primary_key("pk_ID", |o: &Order| order_key(o.id))
        .index("idx_Type_Status_District", |o: &Order| {
            let mut key = KeyEncoder::new();
            key.field(o.kind.as_bytes())
                .ordered(&o.status)
                .field(o.district.as_bytes());
            key.into_bytes()
        })
        .index("idx_Status", |o: &Order| encode(&[status(o.status)]))
        .build()
        .expect("order table definition")
}

/// A person with a list of tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Primary key.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Age in years.
    pub age: i32,
    /// Home city.
    pub city: String,
    /// Free-form labels, indexed one entry per tag.
    pub tags: Vec<String>,
}

impl Person {
    /// Creates a person.
    pub fn new(id: u64, name: &str, age: i32, city: &str, tags: &[&str]) -> Self {
        Self {
            id,
            name: name.to_string(),
            age,
            city: city.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// People in bucket `people` with:
/// - `pk_ID`
/// - `idx_City_Age`, nested under the data bucket
/// - `midx_Tags`, one entry per tag
///
/// # Panics
///
/// Never, the definition is valid.
#[must_use]
pub fn person_table() -> Table<Person> {
    Table::builder("people")
        .fields(["ID", "Name", "Age", "City", "Tags"])
        .codec(CborCodec::new())
        .primary_key("pk_ID", |p: &Person| p.id.to_ordered_bytes())
        .index("idx_City_Age", |p: &Person| {
            let mut key = KeyEncoder::new();
            key.field(p.city.as_bytes()).ordered(&p.age);
            key.into_bytes()
        })
        .mindex("midx_Tags", |p: &Person| {
            p.tags.iter().map(|t| encode(&[t])).collect()
        })
        .build()
        .expect("person table definition")
}

/// A catalogue entry keyed by ISBN.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Primary key.
    pub isbn: String,
    /// Title.
    pub title: String,
    /// Author name.
    pub author: String,
    /// Publication year.
    pub year: u16,
}

impl Book {
    /// Creates a book.
    pub fn new(isbn: &str, title: &str, author: &str, year: u16) -> Self {
        Self {
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            year,
        }
    }
}

/// Books in bucket `library/books` with:
/// - `pk_ISBN`, raw string keys
/// - `catalog/by_author`, an independent bucket over `Author` and `Year`
/// - `books/idx_Title`, nested under the data bucket by its leading segment
///
/// # Panics
///
/// Never, the definition is valid.
#[must_use]
pub fn book_table() -> Table<Book> {
    Table::builder("library/books")
        .fields(["ISBN", "Title", "Author", "Year"])
        .codec(CborCodec::new())
        .primary_key("pk_ISBN", |b: &Book| b.isbn.as_bytes().to_vec())
        .index_with_fields("catalog/by_author", ["Author", "Year"], |b: &Book| {
            let mut key = KeyEncoder::new();
            key.field(b.author.as_bytes()).ordered(&b.year);
            key.into_bytes()
        })
        .index("books/idx_Title", |b: &Book| encode(&[&b.title]))
        .build()
        .expect("book table definition")
}

/// The four orders of the end-to-end example.
#[must_use]
pub fn sample_orders() -> Vec<Order> {
    vec![
        Order::new(1, "book", 1, "East"),
        Order::new(2, "fruit", 2, "South"),
        Order::new(3, "fruit", 3, "West"),
        Order::new(4, "book", 2, "East"),
    ]
}
