//! Language-neutral model of array allocations and the per-syntax facts
//! needed to classify and rewrite them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌────────────────────┐
//! │ Source Files    │────▶│ Front-ends   │────▶│ ParsedFile         │
//! └─────────────────┘     │ (C#, VB)     │     │ (sites, imports,   │
//!                         └──────────────┘     │  constants)        │
//!                                              └────────────────────┘
//!                                                      │
//!                                                      ▼
//!                         ┌──────────────┐     ┌────────────────────┐
//!                         │ Rewriter     │◀────│ Classifier         │
//!                         │ (fix)        │     │ (detect)           │
//!                         └──────────────┘     └────────────────────┘
//! ```
//!
//! # Adding a New Language
//!
//! 1. Create a new module in `src/analysis/languages/`
//! 2. Define its lexer rules and implement `LanguageFacts`
//! 3. Register the front-end in `languages/mod.rs`

pub mod fold;
pub mod languages;
mod render;
mod site;
mod traits;

pub use languages::{
    get_facts, get_facts_by_id, register_languages, registered_extensions, BasicFacts,
    CSharpFacts,
};
pub use render::render_type_argument;
pub use site::{
    ArrayCreationSite, ArrayLevel, Constants, ElementType, ExprToken, GenericMethod, Import,
    Initializer, LengthEvidence, SiteContext, SiteOrigin, SizeExpr,
};
pub use traits::{LanguageFacts, ParsedFile};
