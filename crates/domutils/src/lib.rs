//! Markup tree mutation and serialization
//!
//! Structural edits and markup output for an already-parsed HTML/XML tree.
//!
//! ## Core Design
//!
//! ```text
//! JSON tree → DomArena (owned) → mutate / search → DomSerializer → markup
//!                  ↓
//!            NodeId (u32)
//! ```
//!
//! Each node is linked three ways: its parent's ordered child list, a
//! `prev_id` chain and a `next_id` chain. The mutators in [`mutation`]
//! update all three together; [`DomArena::verify_links`] checks they agree.
//!
//! ```
//! use domutils::{Attributes, DomArena, RenderOptions};
//!
//! let mut arena = DomArena::new();
//! let root = arena.create_root();
//! let p = arena.create_tag("p", Attributes::new());
//! let text = arena.create_text("a < b");
//! arena.append_child(root, p).unwrap();
//! arena.append_child(p, text).unwrap();
//!
//! let options = RenderOptions { decode_entities: true, xml_mode: false };
//! let html = domutils::serializer::render(&arena, &[root], &options).unwrap();
//! assert_eq!(html, "<p>a &lt; b</p>");
//! ```

pub mod arena;
pub mod entities;
pub mod error;
pub mod mutation;
pub mod search;
pub mod serializer;
pub mod service;
pub mod types;
pub mod utils;

pub use arena::DomArena;
pub use entities::{EntityEncoder, XmlEntities};
pub use error::{DomError, Result};
pub use serializer::{DomSerializer, RenderOptions};
pub use service::{DomService, DomServiceConfig};
pub use types::*;
pub use utils::get_text;
