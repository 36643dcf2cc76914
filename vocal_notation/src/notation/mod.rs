// The line-oriented karaoke notation format.
//
// - document.rs: NotationDocument / NoteLine / LineBreak / NoteKind
// - header.rs: Header fields and metadata normalisation
// - version.rs: Format versions and the header gating table
// - writer.rs: Segments -> document -> text, atomic file output
// - parser.rs: Text -> document, with eager per-line timing
// - rewrite.rs: Byte-preserving repitch and score annotation

pub mod document;
pub mod header;
pub mod parser;
pub mod rewrite;
pub mod version;
pub mod writer;

pub use document::{LineBreak, NotationDocument, NoteKind, NoteLine};
pub use header::Header;
pub use parser::{parse, read_notation_file};
pub use rewrite::{append_score_comment, repitch};
pub use version::{FormatVersion, HeaderField};
pub use writer::{NotationWriter, SongMetadata, WrittenNotation, render, write_notation_file};
