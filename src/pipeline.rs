//! 撮影 → 範囲選択 → 文字認識 → レコード作成 のパイプライン
//!
//! 外部呼び出し（撮影・認識・出力・共有）で起きたエラーは
//! セッションのメッセージに変換して保持し、呼び出し元にも返す。
//!
//! 認識は `start_recognition` → `PendingRecognition::run` → `finish_recognition`
//! の3段階。待機中に `retake` されると、後から届いた結果は捨てる。

use crate::cache::{CacheKey, RecognitionCache};
use crate::capture;
use crate::config::Config;
use crate::error::{PartNumError, Result};
use crate::export::{export_records, today};
use crate::part_number::{extract_part_numbers, is_valid_expiry_date};
use crate::recognizer::{OcrEngine, RecognitionInvoker, RecognitionMode};
use crate::share::{share_text, ClipboardSink, ShareOutcome, ShareTarget};
use partnum_common::{
    serialize_records, CapturedImage, DisplayMapping, PointerEvent, RecognizedText, RecordId,
    SelectionRect, Session, Ticket, UnitCatalog,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

pub const NO_NUMBER_NOTICE: &str = "숫자를 인식하지 못했습니다. 다시 촬영해주세요.";
pub const LOW_CONFIDENCE_NOTICE: &str = "인식 신뢰도가 낮습니다. 더 선명하게 촬영해주세요.";
pub const SHARE_TITLE: &str = "품번 목록";

/// 実行待ちの認識リクエスト
pub struct PendingRecognition {
    ticket: Ticket,
    image: CapturedImage,
    rect: Option<SelectionRect>,
    mode: RecognitionMode,
    key: CacheKey,
    cached: Option<RecognizedText>,
    progress: watch::Sender<f32>,
}

impl PendingRecognition {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn rect(&self) -> Option<SelectionRect> {
        self.rect
    }

    /// 進捗（0.0-1.0）の購読
    pub fn progress(&self) -> watch::Receiver<f32> {
        self.progress.subscribe()
    }

    pub async fn run<E: OcrEngine>(self, invoker: &RecognitionInvoker<E>) -> RecognitionOutcome {
        let from_cache = self.cached.is_some();
        let result = match self.cached {
            Some(text) => Ok(text),
            None => {
                invoker
                    .recognize(&self.image, self.rect, self.mode, &self.progress)
                    .await
            }
        };
        RecognitionOutcome {
            ticket: self.ticket,
            key: self.key,
            from_cache,
            result,
        }
    }
}

/// 認識の結果（まだセッションには反映していない）
pub struct RecognitionOutcome {
    ticket: Ticket,
    key: CacheKey,
    from_cache: bool,
    result: Result<RecognizedText>,
}

impl RecognitionOutcome {
    pub fn from_cache(&self) -> bool {
        self.from_cache
    }
}

pub struct Pipeline<E: OcrEngine> {
    session: Session,
    invoker: Arc<RecognitionInvoker<E>>,
    cache: RecognitionCache,
    min_confidence: f32,
}

impl<E: OcrEngine> Pipeline<E> {
    pub fn new(invoker: RecognitionInvoker<E>, units: UnitCatalog, min_confidence: f32) -> Self {
        Self {
            session: Session::new(units),
            invoker: Arc::new(invoker),
            cache: RecognitionCache::new(),
            min_confidence,
        }
    }

    pub fn from_config(engine: E, config: &Config) -> Result<Self> {
        let units = UnitCatalog::new(config.default_units.iter().cloned())?;
        let invoker = RecognitionInvoker::new(engine, config.language.clone());
        Ok(Self::new(invoker, units, config.min_confidence))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn invoker(&self) -> Arc<RecognitionInvoker<E>> {
        Arc::clone(&self.invoker)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    fn report<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.session.report_error(e.to_string());
        }
        result
    }

    // =============================================
    // 撮影
    // =============================================

    pub fn capture_file(&mut self, path: &Path) -> Result<()> {
        let image = capture::capture_frame(path);
        let image = self.report(image)?;
        info!(path = %path.display(), "captured");
        self.set_image(image);
        Ok(())
    }

    pub fn pick_from_gallery(&mut self, folder: &Path, index: usize) -> Result<()> {
        let image = capture::pick_from_gallery(folder, index);
        let image = self.report(image)?;
        self.set_image(image);
        Ok(())
    }

    pub fn set_image(&mut self, image: CapturedImage) {
        self.session.set_image(image);
    }

    /// 再撮影（実行中の認識はキャンセル）
    pub fn retake(&mut self) {
        self.session.retake();
    }

    // =============================================
    // 範囲選択
    // =============================================

    /// 表示サイズを設定（ポインタ座標はこのサイズ基準）
    pub fn set_display_size(&mut self, width: f32, height: f32) {
        if let Some(image) = self.session.image() {
            let mapping = DisplayMapping::new(width, height, image.width(), image.height());
            self.session.selector.set_mapping(mapping);
        }
    }

    pub fn pointer(&mut self, event: PointerEvent) {
        self.session.selector.handle(event);
    }

    pub fn clear_selection(&mut self) {
        self.session.selector.clear();
    }

    // =============================================
    // 文字認識
    // =============================================

    pub fn start_recognition(&mut self, mode: RecognitionMode) -> Result<PendingRecognition> {
        let Some(image) = self.session.image().cloned() else {
            return self.report(Err(PartNumError::Capture("촬영된 사진이 없습니다".into())));
        };
        if self.session.is_recognizing() {
            return Err(PartNumError::Busy);
        }
        let rect = self.session.selection();
        let key = CacheKey::new(&image, rect, mode);
        let cached = self.cache.get(&key).cloned();
        let ticket = self.session.begin_recognition().ok_or(PartNumError::Busy)?;
        let (progress, _) = watch::channel(0.0);
        debug!(?rect, ?mode, cached = cached.is_some(), "recognition started");

        Ok(PendingRecognition {
            ticket,
            image,
            rect,
            mode,
            key,
            cached,
            progress,
        })
    }

    pub fn set_progress(&mut self, ticket: Ticket, value: f32) {
        self.session.set_progress(ticket, value);
    }

    /// 結果を反映。キャンセル済みなら Ok(None)
    pub fn finish_recognition(&mut self, outcome: RecognitionOutcome) -> Result<Option<RecognizedText>> {
        let RecognitionOutcome {
            ticket,
            key,
            from_cache,
            result,
        } = outcome;

        match result {
            Ok(text) => {
                if !self.session.finish_recognition(ticket, Ok(text.clone())) {
                    debug!("late recognition result discarded");
                    return Ok(None);
                }
                if !from_cache {
                    self.cache.insert(key, text.clone());
                }
                if extract_part_numbers(&text.joined()).is_empty() {
                    self.session.report_error(NO_NUMBER_NOTICE);
                } else if text.confidence.is_some_and(|c| c < self.min_confidence) {
                    self.session.report_error(LOW_CONFIDENCE_NOTICE);
                }
                info!(lines = text.lines.len(), from_cache, "recognition finished");
                Ok(Some(text))
            }
            Err(e) => {
                if !self.session.finish_recognition(ticket, Err(e.to_string())) {
                    debug!(error = %e, "late recognition failure discarded");
                    return Ok(None);
                }
                Err(e)
            }
        }
    }

    /// 開始から反映までを一度に行う
    pub async fn recognize(&mut self, mode: RecognitionMode) -> Result<RecognizedText> {
        let pending = self.start_recognition(mode)?;
        let invoker = self.invoker();
        let outcome = pending.run(&*invoker).await;
        self.finish_recognition(outcome)?
            .ok_or_else(|| PartNumError::Recognition("취소되었습니다".into()))
    }

    /// 認識結果中の品番候補
    pub fn candidates(&self) -> Vec<String> {
        self.session
            .recognized()
            .map(|t| extract_part_numbers(&t.joined()))
            .unwrap_or_default()
    }

    // =============================================
    // レコード
    // =============================================

    pub fn pick_line(&mut self, index: usize) -> bool {
        self.session.pick_line(index)
    }

    /// 品番・数量が空なら Ok(None)。有効期限の形式が不正なら入力エラー。
    pub fn add_record(&mut self) -> Result<Option<RecordId>> {
        let expiry = self.session.draft.expiry_date.trim().to_string();
        if !expiry.is_empty() && !is_valid_expiry_date(&expiry) {
            return self.report(Err(PartNumError::Validation(
                "유통기한은 YYYYMMDD (8자리)로 입력해주세요".into(),
            )));
        }
        let id = self.session.add_record();
        if let Some(id) = id {
            debug!(%id, "record added");
        }
        Ok(id)
    }

    pub fn remove_record(&mut self, id: RecordId) -> bool {
        self.session.remove_record(id)
    }

    pub fn edit_record(&mut self, id: RecordId, quantity: &str, expiry_date: &str) -> Result<bool> {
        let expiry = expiry_date.trim();
        if !expiry.is_empty() && !is_valid_expiry_date(expiry) {
            return self.report(Err(PartNumError::Validation(
                "유통기한은 YYYYMMDD (8자리)로 입력해주세요".into(),
            )));
        }
        Ok(self.session.edit_record(id, quantity, expiry))
    }

    pub fn add_unit(&mut self, name: &str) -> bool {
        self.session.units.add_unit(name)
    }

    pub fn rename_unit(&mut self, index: usize, new_name: &str) -> bool {
        self.session.units.rename_unit(index, new_name)
    }

    pub fn delete_unit(&mut self, index: usize) -> bool {
        self.session.units.delete_unit(index)
    }

    pub fn select_unit(&mut self, name: &str) -> bool {
        self.session.units.select(name)
    }

    // =============================================
    // 出力・共有
    // =============================================

    pub fn export_text(&self) -> String {
        serialize_records(self.session.records.records())
    }

    pub fn export_to(&mut self, output: &Path) -> Result<PathBuf> {
        let result = export_records(self.session.records.records(), output, &today());
        self.report(result)
    }

    pub fn share(
        &mut self,
        native: Option<&mut dyn ShareTarget>,
        clipboard: &mut dyn ClipboardSink,
    ) -> Result<ShareOutcome> {
        if self.session.records.is_empty() {
            return self.report(Err(PartNumError::Export("공유할 품번이 없습니다".into())));
        }
        let text = self.export_text();
        let result = share_text(native, clipboard, SHARE_TITLE, &text);
        let outcome = self.report(result)?;
        if let ShareOutcome::CopiedToClipboard(notice) = &outcome {
            self.session.report_error(notice.clone());
        }
        Ok(outcome)
    }
}
