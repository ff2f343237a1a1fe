use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::Error;
use actix_web::HttpResponse;
use paperclip::actix::{
    api_v2_operation,
    web::{self},
};

use crate::api::{
    AddBookResponse, BookData, BookId, BookIdData, BookPayload, BookQuery, BooksData,
    GetAllBooksResponse, GetBookResponse, MessageResponse, ResponseStatus,
};
use crate::books_repository::{BookRepository, BookRepositoryError};

pub(crate) const BOOK_ADDED: &str = "Buku berhasil ditambahkan";
pub(crate) const ADD_MISSING_NAME: &str = "Gagal menambahkan buku. Mohon isi nama buku";
pub(crate) const ADD_PAGE_OVERFLOW: &str =
    "Gagal menambahkan buku. readPage tidak boleh lebih besar dari pageCount";
pub(crate) const BOOK_NOT_FOUND: &str = "Buku tidak ditemukan";
pub(crate) const BOOK_UPDATED: &str = "Buku berhasil diperbarui";
pub(crate) const UPDATE_NOT_FOUND: &str = "Gagal memperbarui buku. Id tidak ditemukan";
pub(crate) const UPDATE_MISSING_NAME: &str = "Gagal memperbarui buku. Mohon isi nama buku";
pub(crate) const UPDATE_PAGE_OVERFLOW: &str =
    "Gagal memperbarui buku. readPage tidak boleh lebih besar dari pageCount";
pub(crate) const BOOK_DELETED: &str = "Buku berhasil dihapus";
pub(crate) const DELETE_NOT_FOUND: &str = "Buku gagal dihapus. Id tidak ditemukan";
pub(crate) const MALFORMED_BODY: &str = "Gagal memproses permintaan.";

fn fail(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(MessageResponse::fail(message))
}

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
pub async fn get_all_books(
    books_repository: Data<Arc<dyn BookRepository>>,
    query: web::Query<BookQuery>,
) -> Result<HttpResponse, Error> {
    Ok(
        match books_repository.list_books(query.into_inner().into()).await {
            Ok(books) => HttpResponse::Ok().json(GetAllBooksResponse {
                status: ResponseStatus::Success,
                data: BooksData { books },
            }),
            Err(err) => {
                tracing::error!("Get all books failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn add_book(
    books_repository: Data<Arc<dyn BookRepository>>,
    payload: web::Json<BookPayload>,
) -> Result<HttpResponse, Error> {
    Ok(
        match books_repository.add_book(payload.into_inner()).await {
            Ok(book_id) => HttpResponse::Created().json(AddBookResponse {
                status: ResponseStatus::Success,
                message: BOOK_ADDED.to_string(),
                data: BookIdData { book_id },
            }),
            Err(BookRepositoryError::MissingName) => {
                fail(StatusCode::BAD_REQUEST, ADD_MISSING_NAME)
            }
            Err(BookRepositoryError::PageOverflow { .. }) => {
                fail(StatusCode::BAD_REQUEST, ADD_PAGE_OVERFLOW)
            }
            Err(err) => {
                tracing::error!("Add book failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn get_book(
    books_repository: Data<Arc<dyn BookRepository>>,
    book_id: web::Path<BookId>,
) -> Result<HttpResponse, Error> {
    Ok(
        match books_repository.get_book(book_id.into_inner()).await {
            Ok(book) => HttpResponse::Ok().json(GetBookResponse {
                status: ResponseStatus::Success,
                data: BookData { book },
            }),
            Err(BookRepositoryError::NotFound(_)) => fail(StatusCode::NOT_FOUND, BOOK_NOT_FOUND),
            Err(err) => {
                tracing::error!("Get book failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn update_book(
    books_repository: Data<Arc<dyn BookRepository>>,
    book_id: web::Path<BookId>,
    payload: web::Json<BookPayload>,
) -> Result<HttpResponse, Error> {
    Ok(
        match books_repository
            .update_book(book_id.into_inner(), payload.into_inner())
            .await
        {
            Ok(()) => HttpResponse::Ok().json(MessageResponse::success(BOOK_UPDATED)),
            Err(BookRepositoryError::NotFound(_)) => {
                fail(StatusCode::NOT_FOUND, UPDATE_NOT_FOUND)
            }
            Err(BookRepositoryError::MissingName) => {
                fail(StatusCode::BAD_REQUEST, UPDATE_MISSING_NAME)
            }
            Err(BookRepositoryError::PageOverflow { .. }) => {
                fail(StatusCode::BAD_REQUEST, UPDATE_PAGE_OVERFLOW)
            }
        },
    )
}

#[api_v2_operation]
pub async fn delete_book(
    books_repository: Data<Arc<dyn BookRepository>>,
    book_id: web::Path<BookId>,
) -> Result<HttpResponse, Error> {
    Ok(
        match books_repository.delete_book(book_id.into_inner()).await {
            Ok(()) => HttpResponse::Ok().json(MessageResponse::success(BOOK_DELETED)),
            Err(BookRepositoryError::NotFound(_)) => {
                fail(StatusCode::NOT_FOUND, DELETE_NOT_FOUND)
            }
            Err(err) => {
                tracing::error!("Delete book failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}
