// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Convert markdown meeting notes to Google Docs API batch-update requests.
//!
//! This crate provides parsing and request generation for turning a markdown
//! file into a single formatted Google Doc, preserving heading levels, nested
//! bullet lists, checklist items, bold `@mention` assignees and footer styling.
//!
//! # Overview
//!
//! The conversion happens in two steps:
//!
//! 1. Classify each markdown line into a [`parser::Block`]
//! 2. Translate the blocks into an ordered [`requests::BatchUpdate`], the
//!    body of a `documents.batchUpdate` call
//!
//! Sending the requests is left to the caller; the JSON body can be posted
//! as-is to an existing, empty document.
//!
//! # Example
//!
//! ```no_run
//! use md2gdoc::{parser, requests};
//!
//! let md = std::fs::read_to_string("notes.md").unwrap();
//! let blocks = parser::parse_markdown(&md, &parser::ParseOptions::default());
//!
//! let opts = requests::BuildOptions {
//!     strike_checked: true,
//!     ..Default::default()
//! };
//!
//! let batch = requests::build_requests(&blocks, &opts);
//! println!("{}", batch.to_json(true).unwrap());
//! ```
//!
//! # Modules
//!
//! - [`parser`]: line classification into blocks
//! - [`requests`]: Docs API request types and batch generation

#![deny(missing_docs)]

pub mod parser;
pub mod requests;
