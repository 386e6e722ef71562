//! 範囲選択モジュール
//!
//! 表示中の画像上でドラッグした矩形を追跡する。
//! マウス/タッチのイベントは `PointerEvent` に変換してから
//! `RegionSelector::handle` に渡す。
//!
//! 状態遷移:
//! - Idle --begin--> Drawing
//! - Drawing --update--> Drawing（矩形を置き換え）
//! - Drawing --end--> Idle（確定）
//! - Drawing --2本目のタッチ--> Idle（破棄、確定しない）
//! - Idle --clear--> Idle（確定済み矩形を破棄）

use crate::types::{Point, SelectionRect};

/// 表示座標 → 画像ピクセル座標の変換
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMapping {
    display_width: f32,
    display_height: f32,
    image_width: u32,
    image_height: u32,
}

impl DisplayMapping {
    /// 画像を等倍で表示している場合
    pub fn identity(image_width: u32, image_height: u32) -> Self {
        Self::new(image_width as f32, image_height as f32, image_width, image_height)
    }

    pub fn new(display_width: f32, display_height: f32, image_width: u32, image_height: u32) -> Self {
        Self {
            display_width: display_width.max(1.0),
            display_height: display_height.max(1.0),
            image_width: image_width.max(1),
            image_height: image_height.max(1),
        }
    }

    pub fn image_size(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    /// 表示座標を画像座標に変換し、画像の範囲内に収める
    pub fn to_image(&self, p: Point) -> Point {
        let sx = self.image_width as f32 / self.display_width;
        let sy = self.image_height as f32 / self.display_height;
        Point {
            x: (p.x * sx).clamp(0.0, self.image_width as f32),
            y: (p.y * sy).clamp(0.0, self.image_height as f32),
        }
    }

    /// 画像座標の矩形を表示座標に戻す: (x, y, width, height)
    pub fn to_display(&self, rect: SelectionRect) -> (f32, f32, f32, f32) {
        let sx = self.display_width / self.image_width as f32;
        let sy = self.display_height / self.image_height as f32;
        (
            rect.x as f32 * sx,
            rect.y as f32 * sy,
            rect.width as f32 * sx,
            rect.height as f32 * sy,
        )
    }
}

/// セレクタの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectorState {
    #[default]
    Idle,
    Drawing,
}

/// プラットフォーム非依存のポインタイベント
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up,
    /// 2本目以降の指が触れた（ピンチ/スクロール優先）
    MultiTouch,
    Cancel,
}

/// マウスイベント
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MouseEvent {
    Down(Point),
    Move(Point),
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// タッチイベント（現在画面に触れている点の一覧付き）
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub touches: Vec<Point>,
}

impl PointerEvent {
    pub fn from_mouse(event: MouseEvent) -> Self {
        match event {
            MouseEvent::Down(p) => PointerEvent::Down(p),
            MouseEvent::Move(p) => PointerEvent::Move(p),
            MouseEvent::Up => PointerEvent::Up,
        }
    }

    /// タッチイベントを変換。対応するポインタ操作がなければ None
    pub fn from_touch(event: &TouchEvent) -> Option<Self> {
        if event.touches.len() > 1 {
            return Some(PointerEvent::MultiTouch);
        }
        match event.phase {
            TouchPhase::Start => event.touches.first().map(|p| PointerEvent::Down(*p)),
            TouchPhase::Move => event.touches.first().map(|p| PointerEvent::Move(*p)),
            TouchPhase::End => Some(PointerEvent::Up),
            TouchPhase::Cancel => Some(PointerEvent::Cancel),
        }
    }
}

/// 選択範囲の描画情報（点線の枠 + 半透明の塗り）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayProjection {
    /// 表示座標: (x, y, width, height)
    pub bounds: (f32, f32, f32, f32),
    pub stroke_rgba: [u8; 4],
    pub fill_rgba: [u8; 4],
    /// 点線パターン（線, 間隔）
    pub dash: (f32, f32),
    /// ドラッグ中かどうか
    pub live: bool,
}

/// 範囲選択の状態機械
#[derive(Debug, Clone)]
pub struct RegionSelector {
    mapping: DisplayMapping,
    state: SelectorState,
    anchor: Option<Point>,
    live: Option<SelectionRect>,
    committed: Option<SelectionRect>,
}

impl RegionSelector {
    pub fn new(mapping: DisplayMapping) -> Self {
        Self {
            mapping,
            state: SelectorState::Idle,
            anchor: None,
            live: None,
            committed: None,
        }
    }

    pub fn mapping(&self) -> DisplayMapping {
        self.mapping
    }

    /// 表示サイズの変更（画面回転など）。選択はそのまま。
    pub fn set_mapping(&mut self, mapping: DisplayMapping) {
        self.mapping = mapping;
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    /// 確定済みの選択範囲
    pub fn selection(&self) -> Option<SelectionRect> {
        self.committed
    }

    /// ドラッグ中の矩形
    pub fn live_rect(&self) -> Option<SelectionRect> {
        self.live
    }

    /// ドラッグ開始。以前の確定済み矩形は置き換えられる。
    pub fn begin(&mut self, p: Point) {
        self.anchor = Some(self.mapping.to_image(p));
        self.live = None;
        self.committed = None;
        self.state = SelectorState::Drawing;
    }

    /// Drawing 中のみ有効
    pub fn update(&mut self, p: Point) -> Option<SelectionRect> {
        if self.state != SelectorState::Drawing {
            return None;
        }
        let anchor = self.anchor?;
        let rect = self.normalize(anchor, self.mapping.to_image(p));
        self.live = Some(rect);
        Some(rect)
    }

    /// ドラッグ終了。最後に計算した矩形を確定する。
    pub fn end(&mut self) -> Option<SelectionRect> {
        if self.state != SelectorState::Drawing {
            return self.committed;
        }
        self.committed = self.live.take();
        self.anchor = None;
        self.state = SelectorState::Idle;
        self.committed
    }

    /// ドラッグを破棄（確定しない）
    pub fn abandon(&mut self) {
        self.anchor = None;
        self.live = None;
        self.committed = None;
        self.state = SelectorState::Idle;
    }

    /// 確定済み矩形を破棄し、画像全体を対象に戻す
    pub fn clear(&mut self) {
        self.abandon();
    }

    pub fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down(p) => self.begin(p),
            PointerEvent::Move(p) => {
                self.update(p);
            }
            PointerEvent::Up => {
                self.end();
            }
            PointerEvent::MultiTouch | PointerEvent::Cancel => {
                if self.state == SelectorState::Drawing {
                    self.abandon();
                }
            }
        }
    }

    /// 現在の矩形の描画情報
    pub fn overlay(&self) -> Option<OverlayProjection> {
        let (rect, live) = match (self.live, self.committed) {
            (Some(rect), _) => (rect, true),
            (None, Some(rect)) => (rect, false),
            (None, None) => return None,
        };
        Some(OverlayProjection {
            bounds: self.mapping.to_display(rect),
            stroke_rgba: [0, 150, 255, 255],
            fill_rgba: [0, 100, 255, 60],
            dash: (6.0, 4.0),
            live,
        })
    }

    fn normalize(&self, a: Point, b: Point) -> SelectionRect {
        let x0 = a.x.min(b.x).round() as u32;
        let y0 = a.y.min(b.y).round() as u32;
        let x1 = a.x.max(b.x).round() as u32;
        let y1 = a.y.max(b.y).round() as u32;
        let (w, h) = self.mapping.image_size();
        SelectionRect::new(x0, y0, x1 - x0, y1 - y0).clamp_to(w, h)
    }
}
