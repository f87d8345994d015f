//! A chess rules engine: position representation, legal move generation, FEN
//! and move text I/O, and terminal/draw classification.
//!
//! This crate is deliberately narrow: no evaluation, no search, no opening
//! book and no communication protocol. It answers exactly the questions a
//! chess front-end needs answered -- "what is this position", "what moves
//! are legal here", "what happens after a move" and "is the game over" --
//! and nothing else.
//!
//! See [`chess`] for the public surface.

// TODO: Gradually move most of warnings to deny.
#![warn(missing_docs, variant_size_differences)]
// Rustc lints.
#![warn(
    absolute_paths_not_starting_with_crate,
    keyword_idents,
    macro_use_extern_crate,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_import_braces,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]
// Rustdoc lints.
#![warn(
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_html_tags,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::bare_urls
)]
// Clippy lints.
#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![deny(clippy::perf)]

pub mod chess;
pub mod error;
