//! セッション状態
//!
//! 1回のアプリ実行分の状態（画像、選択範囲、認識結果、レコード一覧、単位カタログ）を
//! 1つの構造体にまとめる。永続化はしない。

use crate::ledger::{RecordBook, RecordDraft, UnitCatalog};
use crate::selection::{DisplayMapping, RegionSelector};
use crate::slot::{RecognitionSlot, SlotState, Ticket};
use crate::types::{CapturedImage, RecognizedText, RecordId, SelectionRect};

#[derive(Debug, Clone)]
pub struct Session {
    image: Option<CapturedImage>,
    pub selector: RegionSelector,
    recognized: Option<RecognizedText>,
    pub draft: RecordDraft,
    pub records: RecordBook,
    pub units: UnitCatalog,
    message: Option<String>,
    progress: f32,
    slot: RecognitionSlot,
}

impl Session {
    pub fn new(units: UnitCatalog) -> Self {
        Self {
            image: None,
            selector: RegionSelector::new(DisplayMapping::identity(1, 1)),
            recognized: None,
            draft: RecordDraft::default(),
            records: RecordBook::new(),
            units,
            message: None,
            progress: 0.0,
            slot: RecognitionSlot::new(),
        }
    }

    pub fn image(&self) -> Option<&CapturedImage> {
        self.image.as_ref()
    }

    pub fn recognized(&self) -> Option<&RecognizedText> {
        self.recognized.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn slot_state(&self) -> SlotState {
        self.slot.state()
    }

    pub fn is_recognizing(&self) -> bool {
        self.slot.is_running()
    }

    pub fn selection(&self) -> Option<SelectionRect> {
        self.selector.selection()
    }

    /// 新しい画像に置き換える（再撮影と同じくリセットする）
    pub fn set_image(&mut self, image: CapturedImage) {
        self.retake();
        self.selector = RegionSelector::new(DisplayMapping::identity(image.width(), image.height()));
        self.image = Some(image);
    }

    /// 再撮影: 画像・選択・認識結果を捨て、実行中の認識はキャンセル
    pub fn retake(&mut self) {
        self.slot.cancel();
        self.image = None;
        self.selector.clear();
        self.recognized = None;
        self.draft.number.clear();
        self.message = None;
        self.progress = 0.0;
    }

    /// 認識開始。実行中なら None
    pub fn begin_recognition(&mut self) -> Option<Ticket> {
        let ticket = self.slot.begin()?;
        self.progress = 0.0;
        self.message = None;
        Some(ticket)
    }

    pub fn set_progress(&mut self, ticket: Ticket, progress: f32) {
        if self.slot.is_current(ticket) {
            self.progress = progress.clamp(0.0, 1.0);
        }
    }

    /// 認識結果を反映。キャンセル済みのチケットなら捨てて false
    ///
    /// 失敗時は以前の認識結果と選択範囲をそのまま残す。
    pub fn finish_recognition(
        &mut self,
        ticket: Ticket,
        result: std::result::Result<RecognizedText, String>,
    ) -> bool {
        if !self.slot.is_current(ticket) {
            return false;
        }
        self.progress = 0.0;
        match result {
            Ok(text) => {
                self.slot.complete(ticket);
                self.recognized = Some(text);
            }
            Err(message) => {
                self.slot.fail(ticket);
                self.message = Some(message);
            }
        }
        true
    }

    /// 認識行を品番欄に取り込む
    pub fn pick_line(&mut self, index: usize) -> bool {
        let Some(line) = self.recognized.as_ref().and_then(|t| t.lines.get(index)) else {
            return false;
        };
        let line = line.clone();
        self.draft.pick_line(&line);
        true
    }

    /// 入力中の内容でレコードを追加し、フォームを初期化
    pub fn add_record(&mut self) -> Option<RecordId> {
        let id = self.records.add_record(&self.draft, self.units.selected())?;
        self.draft.clear();
        Some(id)
    }

    pub fn remove_record(&mut self, id: RecordId) -> bool {
        self.records.remove_record(id)
    }

    pub fn edit_record(&mut self, id: RecordId, quantity: &str, expiry_date: &str) -> bool {
        self.records.edit_record(id, quantity, expiry_date)
    }

    pub fn report_error(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }
}
