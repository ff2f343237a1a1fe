use crate::api::{Book, BookFilter, BookId, BookPayload, BookSummary};
use crate::books_repository::{
    BookFields, BookRepository, BookRepositoryError, Clock, IdGenerator, SystemClock,
    UuidIdGenerator,
};

/// Books kept in insertion order behind a single lock.
/// Every operation holds the lock from lookup to mutation.
pub struct InMemoryBookRepository {
    id_generator: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
    books: parking_lot::Mutex<Vec<Book>>,
}

impl Default for InMemoryBookRepository {
    fn default() -> Self {
        Self::new(UuidIdGenerator, SystemClock)
    }
}

impl InMemoryBookRepository {
    pub fn new(id_generator: impl IdGenerator + 'static, clock: impl Clock + 'static) -> Self {
        Self {
            id_generator: Box::new(id_generator),
            clock: Box::new(clock),
            books: Default::default(),
        }
    }

    fn unused_id(&self, books: &[Book]) -> BookId {
        loop {
            let id = self.id_generator.generate();
            if books.iter().all(|book| book.id != id) {
                return id;
            }
            tracing::warn!("Generated book id {} already taken, retrying", id);
        }
    }
}

#[async_trait::async_trait]
impl BookRepository for InMemoryBookRepository {
    #[tracing::instrument(skip_all)]
    async fn add_book(&self, payload: BookPayload) -> Result<BookId, BookRepositoryError> {
        let mut locked_books = self.books.lock();
        let fields = BookFields::try_from(payload).inspect_err(|err| {
            tracing::warn!("Rejected new book: {}", err);
        })?;

        let id = self.unused_id(&locked_books);
        let now = self.clock.now();
        locked_books.push(Book {
            id: id.clone(),
            finished: fields.finished(),
            name: fields.name,
            year: fields.year,
            author: fields.author,
            summary: fields.summary,
            publisher: fields.publisher,
            page_count: fields.page_count,
            read_page: fields.read_page,
            reading: fields.reading,
            inserted_at: now,
            updated_at: now,
        });
        tracing::info!(book_id = %id, "Book added");
        Ok(id)
    }

    async fn list_books(
        &self,
        filter: BookFilter,
    ) -> Result<Vec<BookSummary>, BookRepositoryError> {
        Ok(self
            .books
            .lock()
            .iter()
            .filter(|book| filter.matches(book))
            .map(BookSummary::from)
            .collect())
    }

    async fn get_book(&self, book_id: BookId) -> Result<Book, BookRepositoryError> {
        self.books
            .lock()
            .iter()
            .find(|book| book.id == book_id)
            .cloned()
            .ok_or(BookRepositoryError::NotFound(book_id))
    }

    #[tracing::instrument(skip(self, payload))]
    async fn update_book(
        &self,
        book_id: BookId,
        payload: BookPayload,
    ) -> Result<(), BookRepositoryError> {
        let mut locked_books = self.books.lock();
        let Some(book) = locked_books.iter_mut().find(|book| book.id == book_id) else {
            return Err(BookRepositoryError::NotFound(book_id));
        };
        let fields = BookFields::try_from(payload).inspect_err(|err| {
            tracing::warn!("Rejected book update: {}", err);
        })?;

        book.finished = fields.finished();
        book.name = fields.name;
        book.year = fields.year;
        book.author = fields.author;
        book.summary = fields.summary;
        book.publisher = fields.publisher;
        book.page_count = fields.page_count;
        book.read_page = fields.read_page;
        book.reading = fields.reading;
        book.updated_at = self.clock.now();
        tracing::info!("Book updated");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_book(&self, book_id: BookId) -> Result<(), BookRepositoryError> {
        let mut locked_books = self.books.lock();
        let position = locked_books
            .iter()
            .position(|book| book.id == book_id)
            .ok_or_else(|| BookRepositoryError::NotFound(book_id.clone()))?;
        locked_books.remove(position);
        tracing::info!("Book deleted");
        Ok(())
    }
}
