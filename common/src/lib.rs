//! Part Number Manager Common Library
//!
//! CLIと将来のフロントエンドで共有されるセッションモデル（I/Oなし）

pub mod types;
pub mod error;
pub mod selection;
pub mod text;
pub mod ledger;
pub mod export;
pub mod slot;
pub mod session;
pub mod shell_cache;

pub use types::{CaptureSource, CapturedImage, PartRecord, Point, RecognizedText, RecordId, SelectionRect};
pub use error::{Error, Result};
pub use selection::{DisplayMapping, MouseEvent, OverlayProjection, PointerEvent, RegionSelector, SelectorState, TouchEvent, TouchPhase};
pub use text::{clean_line, clean_text, recognized_lines};
pub use ledger::{RecordBook, RecordDraft, UnitCatalog, DEFAULT_QUANTITY};
pub use export::{export_file_name, serialize_record, serialize_records, EXPIRY_LABEL};
pub use slot::{RecognitionSlot, SlotState, Ticket};
pub use session::Session;
pub use shell_cache::{CacheStorage, CachedResponse, MemoryCacheStorage, Network, ResponseKind, ShellCache};
