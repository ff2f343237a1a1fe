pub use clock::{Clock, SystemClock};
pub use id_generator::{IdGenerator, UuidIdGenerator};
pub use in_memory_books_repository::InMemoryBookRepository;

use crate::api::{Book, BookFilter, BookId, BookPayload, BookSummary};

mod clock;
mod id_generator;
mod in_memory_books_repository;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum BookRepositoryError {
    #[error("Book name is missing")]
    MissingName,

    #[error("Read page {read_page} is greater than page count {page_count}")]
    PageOverflow { read_page: u32, page_count: u32 },

    #[error("Book {0} not found")]
    NotFound(BookId),
}

#[async_trait::async_trait]
pub trait BookRepository: Send + Sync {
    /// Validates and stores a new book, returns an id assigned to the book
    async fn add_book(&self, payload: BookPayload) -> Result<BookId, BookRepositoryError>;
    /// Lists books matching the filter in insertion order
    async fn list_books(&self, filter: BookFilter)
        -> Result<Vec<BookSummary>, BookRepositoryError>;
    /// Retrieves the full record of the book
    async fn get_book(&self, book_id: BookId) -> Result<Book, BookRepositoryError>;
    /// Replaces all mutable fields of the book.
    /// Existence is checked before the payload is validated.
    async fn update_book(
        &self,
        book_id: BookId,
        payload: BookPayload,
    ) -> Result<(), BookRepositoryError>;
    /// Removes the book from the repository
    async fn delete_book(&self, book_id: BookId) -> Result<(), BookRepositoryError>;
}

/// Mutable part of a book which passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFields {
    pub name: String,
    pub year: Option<i32>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub page_count: u32,
    pub read_page: u32,
    pub reading: bool,
}

impl BookFields {
    pub fn finished(&self) -> bool {
        self.read_page == self.page_count
    }
}

impl TryFrom<BookPayload> for BookFields {
    type Error = BookRepositoryError;

    fn try_from(payload: BookPayload) -> Result<Self, Self::Error> {
        let name = payload
            .name
            .filter(|name| !name.is_empty())
            .ok_or(BookRepositoryError::MissingName)?;

        let page_count = payload.page_count.unwrap_or_default();
        let read_page = payload.read_page.unwrap_or_default();
        if read_page > page_count {
            return Err(BookRepositoryError::PageOverflow {
                read_page,
                page_count,
            });
        }

        Ok(Self {
            name,
            year: payload.year,
            author: payload.author,
            summary: payload.summary,
            publisher: payload.publisher,
            page_count,
            read_page,
            reading: payload.reading.unwrap_or_default(),
        })
    }
}
