use anyhow::{bail, Context};
use reqwest::{Response, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use reqwest_tracing::TracingMiddleware;

use crate::api::{
    AddBookResponse, Book, BookId, BookPayload, BookQuery, BookSummary, GetAllBooksResponse,
    GetBookResponse, MessageResponse,
};

pub struct BookshelfClient {
    url: String,
    /// Retries transient failures, used for the idempotent GET, PUT and DELETE
    client: ClientWithMiddleware,
    /// Sends exactly once, a retried POST could store the book twice
    create_client: ClientWithMiddleware,
}

impl BookshelfClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        let client = ClientBuilder::new(reqwest_client.clone())
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();
        let create_client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            client,
            create_client,
        })
    }

    /// Calls POST /books endpoint
    /// Returns id assigned to the new book
    pub async fn add_book(&self, payload: &BookPayload) -> anyhow::Result<BookId> {
        let response = self
            .create_client
            .post(format!("{}/books", self.url))
            .json(payload)
            .send()
            .await?;

        if response.status() != StatusCode::CREATED {
            bail!("Failed to add book: {}", fail_message(response).await)
        }

        let added: AddBookResponse = response.json().await.context("Invalid response body")?;
        Ok(added.data.book_id)
    }

    /// Calls GET /books endpoint with the given filters
    pub async fn list_books(&self, query: &BookQuery) -> anyhow::Result<Vec<BookSummary>> {
        let response = self
            .client
            .get(format!("{}/books", self.url))
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Failed to list books: {}", fail_message(response).await)
        }

        let listed: GetAllBooksResponse = response.json().await.context("Invalid response body")?;
        Ok(listed.data.books)
    }

    /// Calls GET /books/{book_id} endpoint
    /// Returns None if book was not in the repository
    pub async fn get_book(&self, book_id: &str) -> anyhow::Result<Option<Book>> {
        let response = self
            .client
            .get(format!("{}/books/{}", self.url, book_id))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            Ok(None)
        } else if response.status().is_success() {
            let found: GetBookResponse = response.json().await.context("Invalid response body")?;
            Ok(Some(found.data.book))
        } else {
            bail!("Failed to get book: {}", fail_message(response).await)
        }
    }

    /// Calls PUT /books/{book_id} endpoint
    /// Returns false if book was not in the repository
    pub async fn update_book(&self, book_id: &str, payload: &BookPayload) -> anyhow::Result<bool> {
        let response = self
            .client
            .put(format!("{}/books/{}", self.url, book_id))
            .json(payload)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            Ok(false)
        } else if response.status().is_success() {
            Ok(true)
        } else {
            bail!("Failed to update book: {}", fail_message(response).await)
        }
    }

    /// Calls DELETE /books/{book_id} endpoint
    /// Returns false if book was not in the repository
    pub async fn delete_book(&self, book_id: &str) -> anyhow::Result<bool> {
        let response = self
            .client
            .delete(format!("{}/books/{}", self.url, book_id))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            Ok(false)
        } else if response.status().is_success() {
            Ok(true)
        } else {
            bail!("Failed to delete book: {}", fail_message(response).await)
        }
    }
}

async fn fail_message(response: Response) -> String {
    let status = response.status();
    match response.json::<MessageResponse>().await {
        Ok(body) => body.message,
        Err(_) => status.to_string(),
    }
}

#[cfg(test)]
mod client_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use actix_web::{App, HttpResponse, HttpServer};
    use paperclip::actix::{web, OpenApiExt};

    use crate::api::{BookPayload, BookQuery};
    use crate::app_config::{config_app, json_config};
    use crate::books_repository::{BookRepository, InMemoryBookRepository};

    use super::BookshelfClient;

    fn start_server() -> String {
        let books_repository: Arc<dyn BookRepository> = Arc::new(InMemoryBookRepository::default());
        let server = HttpServer::new(move || {
            App::new()
                .wrap_api()
                .app_data(web::Data::new(books_repository.clone()))
                .app_data(json_config())
                .configure(config_app)
                .build()
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("Failed to bind");
        let address = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        format!("http://{}", address)
    }

    #[actix_web::test]
    /// A failing create is sent once, the server may already have stored the book
    async fn test_add_book_is_not_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counted = attempts.clone();
        let server = HttpServer::new(move || {
            let counted = counted.clone();
            actix_web::App::new().route(
                "/books",
                actix_web::web::post().to(move || {
                    counted.fetch_add(1, Ordering::SeqCst);
                    async { HttpResponse::ServiceUnavailable().finish() }
                }),
            )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("Failed to bind");
        let address = server.addrs()[0];
        actix_web::rt::spawn(server.run());

        let client =
            BookshelfClient::new(&format!("http://{}", address)).expect("Failed to create client");
        let result = client.add_book(&payload("A", 1, 1)).await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    fn payload(name: &str, page_count: u32, read_page: u32) -> BookPayload {
        BookPayload {
            name: Some(name.to_string()),
            publisher: Some("Dicoding".to_string()),
            page_count: Some(page_count),
            read_page: Some(read_page),
            reading: Some(true),
            ..BookPayload::default()
        }
    }

    #[actix_web::test]
    /// Drives every endpoint through the client against an in-process server
    async fn test_client_against_running_server() {
        let client = BookshelfClient::new(&start_server()).expect("Failed to create client");

        let book_id = client
            .add_book(&payload("Kejarlah Mimpi", 100, 100))
            .await
            .expect("Failed to add book");

        let book = client
            .get_book(&book_id)
            .await
            .expect("Failed to get book")
            .expect("Book not found");
        assert_eq!(book.name, "Kejarlah Mimpi");
        assert!(book.finished);

        let error = client
            .add_book(&payload("B", 50, 60))
            .await
            .expect_err("Overflowing book was added");
        assert!(error
            .to_string()
            .contains("readPage tidak boleh lebih besar dari pageCount"));

        let listed = client
            .list_books(&BookQuery {
                name: Some("mimpi".to_string()),
                ..BookQuery::default()
            })
            .await
            .expect("Failed to list books");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, book_id);

        assert!(client
            .update_book(&book_id, &payload("Kejarlah Mimpi", 100, 40))
            .await
            .expect("Failed to update book"));
        assert!(!client
            .update_book("unknown", &payload("X", 1, 1))
            .await
            .expect("Failed to update book"));

        let book = client.get_book(&book_id).await.unwrap().unwrap();
        assert!(!book.finished);
        assert_eq!(book.read_page, 40);

        assert!(client.delete_book(&book_id).await.expect("Failed to delete"));
        assert!(!client.delete_book(&book_id).await.expect("Failed to delete"));
        assert_eq!(client.get_book(&book_id).await.unwrap(), None);
    }
}
