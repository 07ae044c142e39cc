//! gitwiki - A Git-backed versioned document store
//!
//! Documents are plain files in a git working tree; every save is a commit,
//! history is the commit log and search is `git grep`.
//!
//! # Example
//!
//! ```no_run
//! use gitwiki::storage::{Author, RevisionSpec};
//! use gitwiki::wiki::{ContentStore, StoreConfig};
//!
//! let store = ContentStore::open(StoreConfig::new("./data")).unwrap();
//! store.save("FrontPage", "# Hello", "", &Author::empty()).unwrap();
//! let page = store.load("FrontPage", &RevisionSpec::Current).unwrap();
//! let history = store.history("FrontPage").unwrap();
//! let hits = store.search("hello");
//! ```

pub mod parse;
pub mod storage;
pub mod wiki;
