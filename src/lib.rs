//! # doclib
//!
//! Backend for a small document library. A directory of uploaded files is
//! the source of truth; doclib lists it, keeps a catalog of what it has
//! seen, and crops square thumbnails for the images.
//!
//! # Architecture: One Pass Per Request
//!
//! Every request runs a single synchronous pass over the directory:
//!
//! ```text
//! 1. Filter    docs/           →  entries       (allowed regular files, sorted)
//! 2. Crop      docs/photo.jpg  →  docs/crop/    (image types only)
//! 3. Catalog   entries         →  files table   (insert if absent)
//! ```
//!
//! List mode stops after step 1. Button mode runs all three and reads the
//! catalog rows back for rendering.
//!
//! Failures are contained per file. A corrupt image or a failed insert is
//! logged and reported, and the pass moves on to the next file. Only an
//! unreadable directory or an unavailable store stops a pass.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Lists the documents directory and keeps allowed regular files |
//! | [`naming`] | Splits filenames into base name and extension |
//! | [`imaging`] | Cover-crop geometry, the image backend trait, thumbnail operations |
//! | [`size`] | Byte counts as `"1.5 kb"`-style strings |
//! | [`catalog`] | The synchronization pass and its per-file report |
//! | [`store`] | The catalog store trait, its SQLite implementation, the error log |
//! | [`view`] | List and button display modes |
//! | [`config`] | `doclib.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | Tracing subscriber setup |
//!
//! # Design Decisions
//!
//! ## Create-Only Catalog
//!
//! A file gets a row the first time a pass sees it, and that row is never
//! touched again. Changed files keep their original size and timestamps;
//! deleted files keep their rows. The `UNIQUE` constraint on `files.file`
//! settles races between concurrent passes.
//!
//! ## Thumbnails Are Disposable
//!
//! Thumbnails are not tracked. Each pass re-crops every image, writing to a
//! hidden staging file that is renamed into place, so a reader never sees a
//! half-written thumbnail.
//!
//! ## Narrow Store Trait
//!
//! The synchronizer speaks to storage through [`store::Store`]: insert,
//! count, select, update and an error sink. Values are always bound
//! parameters and identifiers are validated, so filenames never reach
//! statement text.

pub mod catalog;
pub mod config;
pub mod imaging;
pub mod logging;
pub mod naming;
pub mod output;
pub mod scan;
pub mod size;
pub mod store;
pub mod view;

#[cfg(test)]
pub(crate) mod test_helpers;
