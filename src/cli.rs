use clap::{Parser, Subcommand};
use partnum_common::{Point, SelectionRect};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "partnum")]
#[command(about = "라벨 사진 OCR・품번 목록 정리 도구", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像を1回認識して行を表示
    Ocr {
        /// 画像ファイル
        #[arg(required = true)]
        image: PathBuf,

        /// 認識範囲 x,y,width,height（画像ピクセル）
        #[arg(long, conflicts_with = "drag")]
        rect: Option<RectArg>,

        /// ドラッグ操作 x0,y0:x1,y1 で範囲指定
        #[arg(long)]
        drag: Option<DragArg>,

        /// 高度な設定（英大文字+数字のみ）で認識
        #[arg(long)]
        advanced: bool,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 対話式で品番一覧を作成
    Scan {
        /// 画像ファイル（撮影画像）
        images: Vec<PathBuf>,

        /// ギャラリーフォルダから選択
        #[arg(short, long)]
        gallery: Option<PathBuf>,

        /// 出力先フォルダ/ファイル
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// ギャラリーフォルダの画像一覧
    Gallery {
        #[arg(required = true)]
        folder: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// tesseract のコマンドを設定
        #[arg(long)]
        set_tesseract: Option<String>,

        /// 認識言語を設定（例: kor+eng）
        #[arg(long)]
        set_language: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// `x,y,width,height`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RectArg(pub SelectionRect);

impl std::str::FromStr for RectArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(format!("Invalid rect: {}. Use x,y,width,height", s));
        }
        let mut values = [0u32; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| format!("Invalid number in rect: {}", part))?;
        }
        Ok(RectArg(SelectionRect::new(values[0], values[1], values[2], values[3])))
    }
}

/// 矩形の対角をドラッグの始点・終点に変換（f32 で計算し、クランプはセレクタ側）
pub fn rect_stroke(rect: SelectionRect) -> (Point, Point) {
    let x = rect.x as f32;
    let y = rect.y as f32;
    (
        Point::new(x, y),
        Point::new(x + rect.width as f32, y + rect.height as f32),
    )
}

/// `x0,y0:x1,y1`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragArg {
    pub from: Point,
    pub to: Point,
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("Invalid point: {}. Use x,y", s))?;
    let x: f32 = x.trim().parse().map_err(|_| format!("Invalid x: {}", x))?;
    let y: f32 = y.trim().parse().map_err(|_| format!("Invalid y: {}", y))?;
    Ok(Point::new(x, y))
}

impl std::str::FromStr for DragArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = s
            .split_once(':')
            .ok_or_else(|| format!("Invalid drag: {}. Use x0,y0:x1,y1", s))?;
        Ok(DragArg {
            from: parse_point(from)?,
            to: parse_point(to)?,
        })
    }
}
