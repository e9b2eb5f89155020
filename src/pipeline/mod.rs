//! Pipeline stages for image/PDF-to-scanned-PDF processing.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch the rendering backend) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! decode ──▶ recolor ──▶ encode ──▶ compose
//! (image/    (optional   (PNG/      (printpdf page:
//!  pdfium)    luma)       data-URI)  background + shadow + image)
//! ```
//!
//! 1. [`decode`]  — source bytes to an RGBA bitmap, at native size, the
//!    fixed A4 target, or (for PDF sources) a padded first-page canvas;
//!    pdfium work runs in `spawn_blocking` because it is not async-safe
//! 2. [`recolor`] — optional in-place luma rewrite of every pixel
//! 3. [`encode`]  — PNG-encode a bitmap, for PDF embedding or as a base64
//!    data-URI preview
//! 4. [`compose`] — lay background, drop-shadow, and bitmap onto the fixed
//!    595×842 page and serialise to PDF bytes

pub mod compose;
pub mod decode;
pub mod encode;
pub mod recolor;
