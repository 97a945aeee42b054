//! `zmd_core` is the engine behind [zmd](../zmd_cli), a preprocessor that
//! keeps the code examples of a markdown book honest. It finds annotated
//! fences in a `*.z.md` source, runs them through an external toolchain
//! (Zig by default), and writes a `*.md` page with every block followed by
//! the output it actually produced.
//!
//! ## Processing Pipeline
//!
//! ```text
//! page.z.md
//!   → Transducer (line-by-line state machine, output kept in input order)
//!   → Annotation classifier (fence info string → block kind + highlight)
//!   → Fragment accumulator (collect_<id> bodies, public `*` prefix)
//!   → Invoker (content-addressed cache, then the toolchain process)
//!   → page.md
//! ```
//!
//! ## Fence Annotations
//!
//! | Info string            | Effect                                              |
//! | ---------------------- | --------------------------------------------------- |
//! | `zig`                  | wrap in the entry point and run                     |
//! | `zig -singleFile`      | run as a complete file                              |
//! | `zig -skip`            | echo only                                           |
//! | `zig -collect_<id>`    | store the body under `<id>` (`*` = public prefix)   |
//! | `zig -execute_<id>`    | run public + collection `<id>` + this body          |
//! | `zig -test_collect_<id>` | store the body for a later test                   |
//! | `zig -test_<id>`       | test public + collection `<id>` + this body         |
//!
//! Any of them may end in a `{...}` highlight spec, which is echoed into the
//! rendered fence.
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `zmd.toml`.
//! - [`project`]: A project root plus its configuration, and the invoker
//!   built from it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use zmd_core::ProcessOptions;
//! use zmd_core::project::ProjectContext;
//!
//! let project = ProjectContext::load(Path::new(".")).unwrap();
//! let mut invoker = project.invoker(false);
//! let report = project
//! 	.process(Path::new("intro.z.md"), &ProcessOptions::default(), &mut invoker)
//! 	.unwrap();
//! println!("wrote {}", report.output.display());
//! ```

pub use accumulator::*;
pub use annotation::*;
pub use block::*;
pub use cache::*;
pub use config::*;
pub use document::*;
pub use entry_point::*;
pub use error::*;
pub use invoker::*;
pub use toolchain::*;
pub use transducer::*;

mod accumulator;
mod annotation;
mod block;
mod cache;
pub mod config;
mod document;
mod entry_point;
#[allow(unused_assignments)]
mod error;
mod invoker;
pub mod project;
mod toolchain;
mod transducer;

#[cfg(test)]
mod __fixtures;
