//! End-to-end tests against a running bookshelf_api server.
//! Run with `BOOKSHELF_URL=http://localhost:9000 cargo test --features system_tests`.
