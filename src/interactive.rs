//! 対話式スキャンセッション
//!
//! 撮影画像を順に取り込み、範囲選択・認識・行の取り込み・レコード追加を
//! 1行コマンドで操作する。終了時に出力先へ書き出す。
//! 書き出しに失敗してもセッションは終わらない。

use crate::capture;
use crate::cli::{rect_stroke, DragArg, RectArg};
use crate::error::{PartNumError, Result};
use crate::part_number::is_valid_part_number;
use crate::pipeline::{Pipeline, RecognitionOutcome};
use crate::recognizer::{OcrEngine, RecognitionMode};
use crate::share::{ShareOutcome, SystemClipboard};
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use partnum_common::{serialize_record, Point, PointerEvent, RecordId, SelectionRect};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// 対話アクション
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// 次の画像を取り込む（パス指定可）
    Capture(Option<PathBuf>),
    /// ギャラリーの n 番目
    Gallery(usize),
    /// 範囲指定（画像ピクセル）
    Rect(SelectionRect),
    /// ドラッグで範囲指定
    Drag(Point, Point),
    ClearSelection,
    Recognize(RecognitionMode),
    /// 認識行を品番欄へ
    PickLine(usize),
    Quantity(String),
    Expiry(String),
    Unit(String),
    AddUnit(String),
    /// 単位の改名（番号は 0 始まりに変換済み）
    RenameUnit(usize, String),
    DeleteUnit(usize),
    Units,
    AddRecord,
    RemoveRecord(u64),
    /// 数量・有効期限の編集
    EditRecord {
        id: u64,
        quantity: String,
        expiry_date: String,
    },
    List,
    /// 書き出し（パス省略時は既定の出力先）
    Export(Option<PathBuf>),
    Retake,
    Share,
    Help,
    /// 書き出して終了
    Quit,
}

const HELP: &str = "\
명령: c [경로] 촬영 | g <번호> 갤러리 | r x,y,w,h 범위 | d x0,y0:x1,y1 드래그 | x 범위해제
      o 인식 | a 고급인식 | p <행> 행 선택 | n <수량> | e <YYYYMMDD> 유통기한
      u <단위> 단위 선택 | U <단위> 단위 추가 | R <번호> <이름> 단위 변경 | D <번호> 단위 삭제 | L 단위 목록
      + 추가 | - <id> 삭제 | E <id> <수량> [YYYYMMDD] 수정 | l 목록
      w [경로] 저장 | t 재촬영 | s 공유 | h 도움말 | q 저장 후 종료";

/// 1行コマンドを解釈。解釈できなければ None
pub fn parse_action(input: &str) -> Option<SessionAction> {
    let trimmed = input.trim();
    let (cmd, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((c, a)) => (c, a.trim()),
        None => (trimmed, ""),
    };

    match (cmd, arg) {
        ("c", "") => Some(SessionAction::Capture(None)),
        ("c", path) => Some(SessionAction::Capture(Some(PathBuf::from(path)))),
        ("g", n) => n.parse().ok().map(SessionAction::Gallery),
        ("r", rect) => rect.parse::<RectArg>().ok().map(|r| SessionAction::Rect(r.0)),
        ("d", drag) => drag
            .parse::<DragArg>()
            .ok()
            .map(|d| SessionAction::Drag(d.from, d.to)),
        ("x", "") => Some(SessionAction::ClearSelection),
        ("o", "") => Some(SessionAction::Recognize(RecognitionMode::Standard)),
        ("a", "") => Some(SessionAction::Recognize(RecognitionMode::Advanced)),
        ("p", n) => parse_index(n).map(SessionAction::PickLine),
        ("n", qty) if !qty.is_empty() => Some(SessionAction::Quantity(qty.to_string())),
        ("e", date) => Some(SessionAction::Expiry(date.to_string())),
        ("u", unit) if !unit.is_empty() => Some(SessionAction::Unit(unit.to_string())),
        ("U", unit) if !unit.is_empty() => Some(SessionAction::AddUnit(unit.to_string())),
        ("R", rest) => {
            let (index, name) = rest.split_once(char::is_whitespace)?;
            let index = parse_index(index)?;
            let name = name.trim();
            (!name.is_empty()).then(|| SessionAction::RenameUnit(index, name.to_string()))
        }
        ("D", index) => parse_index(index).map(SessionAction::DeleteUnit),
        ("L", "") => Some(SessionAction::Units),
        ("E", rest) => {
            let mut parts = rest.split_whitespace();
            let id = parse_record_id(parts.next()?)?;
            let quantity = parts.next()?.to_string();
            let expiry_date = parts.next().unwrap_or("").to_string();
            if parts.next().is_some() {
                return None;
            }
            Some(SessionAction::EditRecord {
                id,
                quantity,
                expiry_date,
            })
        }
        ("w", "") => Some(SessionAction::Export(None)),
        ("w", path) => Some(SessionAction::Export(Some(PathBuf::from(path)))),
        ("+", "") => Some(SessionAction::AddRecord),
        ("-", id) => parse_record_id(id).map(SessionAction::RemoveRecord),
        ("l", "") => Some(SessionAction::List),
        ("t", "") => Some(SessionAction::Retake),
        ("s", "") => Some(SessionAction::Share),
        ("h", "") | ("?", "") => Some(SessionAction::Help),
        ("q", "") | ("Q", "") => Some(SessionAction::Quit),
        _ => None,
    }
}

/// 画面上の番号は 1 始まり
fn parse_index(s: &str) -> Option<usize> {
    s.trim().parse::<usize>().ok().filter(|n| *n > 0).map(|n| n - 1)
}

/// `#3` / `3`
fn parse_record_id(s: &str) -> Option<u64> {
    s.trim().trim_start_matches('#').parse().ok()
}

/// 終了前の書き出し。終了してよければ true
///
/// 失敗時はレコードを残したまま false（メッセージはセッションに入る）。
pub fn finish_session<E: OcrEngine>(pipeline: &mut Pipeline<E>, output: &Path) -> bool {
    if pipeline.session().records.is_empty() {
        println!("저장할 품번이 없습니다");
        return true;
    }
    match pipeline.export_to(output) {
        Ok(path) => {
            println!("\n✓ 저장했습니다: {}", path.display());
            true
        }
        Err(_) => false,
    }
}

/// 対話式セッション
pub async fn run_interactive_session<E: OcrEngine>(
    pipeline: &mut Pipeline<E>,
    images: &[PathBuf],
    gallery: Option<&Path>,
    output: &Path,
) -> Result<()> {
    let mut queue: VecDeque<PathBuf> = images.iter().cloned().collect();

    if let Some(folder) = gallery {
        let entries = capture::scan_gallery(folder)?;
        println!("🖼  갤러리: {}장", entries.len());
        for (i, entry) in entries.iter().enumerate() {
            println!("  [{}] {} {}", i, entry.file_name, entry.date.as_deref().unwrap_or(""));
        }
    }
    println!("{}\n", HELP);

    if let Some(first) = queue.pop_front() {
        if pipeline.capture_file(&first).is_ok() {
            println!("✔ {}", first.display());
        }
        show_message(pipeline);
    }

    loop {
        let input: String = Input::new()
            .with_prompt(prompt_line(pipeline))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| PartNumError::CliExecution(e.to_string()))?;

        let Some(action) = parse_action(&input) else {
            if !input.trim().is_empty() {
                println!("  알 수 없는 명령입니다 (h: 도움말)");
            }
            continue;
        };

        match action {
            SessionAction::Capture(path) => {
                let Some(path) = path.or_else(|| queue.pop_front()) else {
                    println!("  남은 사진이 없습니다");
                    continue;
                };
                if pipeline.capture_file(&path).is_ok() {
                    println!("  ✔ {}", path.display());
                }
            }
            SessionAction::Gallery(index) => match gallery {
                Some(folder) => {
                    if pipeline.pick_from_gallery(folder, index).is_ok() {
                        println!("  ✔ 갤러리 [{}]", index);
                    }
                }
                None => println!("  --gallery 폴더가 지정되지 않았습니다"),
            },
            SessionAction::Rect(rect) => {
                let (from, to) = rect_stroke(rect);
                drag(pipeline, from, to);
            }
            SessionAction::Drag(from, to) => drag(pipeline, from, to),
            SessionAction::ClearSelection => {
                pipeline.clear_selection();
                println!("  → 전체 이미지");
            }
            SessionAction::Recognize(mode) => {
                if recognize_with_progress(pipeline, mode).await.is_ok() {
                    print_recognized(pipeline);
                }
            }
            SessionAction::PickLine(index) => {
                if !pipeline.pick_line(index) {
                    println!("  해당 행이 없습니다");
                }
            }
            SessionAction::Quantity(qty) => pipeline.session_mut().draft.quantity = qty,
            SessionAction::Expiry(date) => pipeline.session_mut().draft.expiry_date = date,
            SessionAction::Unit(unit) => {
                if !pipeline.select_unit(&unit) {
                    println!("  등록되지 않은 단위입니다 (U {} 로 추가)", unit);
                }
            }
            SessionAction::AddUnit(unit) => {
                if pipeline.add_unit(&unit) {
                    pipeline.select_unit(&unit);
                } else {
                    println!("  추가할 수 없는 단위입니다");
                }
            }
            SessionAction::AddRecord => {
                let number = pipeline.session().draft.number.clone();
                if !number.trim().is_empty() && !is_valid_part_number(&number) {
                    println!("  (참고) 6~12자리 숫자 형식이 아닙니다: {}", number.trim());
                }
                match pipeline.add_record() {
                    Ok(Some(id)) => {
                        if let Some(record) = pipeline.session().records.get(id) {
                            println!("  + {} {}", id, serialize_record(record));
                        }
                    }
                    Ok(None) => println!("  품번과 수량을 입력해주세요"),
                    Err(_) => {}
                }
            }
            SessionAction::RenameUnit(index, name) => {
                if !pipeline.rename_unit(index, &name) {
                    println!("  변경할 수 없습니다 (번호 또는 중복 이름 확인)");
                }
            }
            SessionAction::DeleteUnit(index) => {
                if !pipeline.delete_unit(index) {
                    println!("  삭제할 수 없습니다 (마지막 단위는 삭제 불가)");
                }
            }
            SessionAction::Units => print_units(pipeline),
            SessionAction::EditRecord {
                id,
                quantity,
                expiry_date,
            } => match pipeline.edit_record(RecordId(id), &quantity, &expiry_date) {
                Ok(true) => {
                    if let Some(record) = pipeline.session().records.get(RecordId(id)) {
                        println!("  ✎ {} {}", record.id, serialize_record(record));
                    }
                }
                Ok(false) => println!("  해당 항목이 없거나 수량이 비어 있습니다"),
                Err(_) => {}
            },
            SessionAction::Export(path) => {
                let target = path.as_deref().unwrap_or(output);
                if let Ok(written) = pipeline.export_to(target) {
                    println!("  ✓ 저장했습니다: {}", written.display());
                }
            }
            SessionAction::RemoveRecord(id) => {
                if !pipeline.remove_record(RecordId(id)) {
                    println!("  해당 항목이 없습니다");
                }
            }
            SessionAction::List => print_records(pipeline),
            SessionAction::Retake => {
                pipeline.retake();
                println!("  → 다시 촬영하세요 (c)");
            }
            SessionAction::Share => {
                let mut clipboard = SystemClipboard;
                if let Ok(ShareOutcome::Shared) = pipeline.share(None, &mut clipboard) {
                    println!("  ✔ 공유했습니다");
                }
            }
            SessionAction::Help => println!("{}", HELP),
            SessionAction::Quit => {
                if finish_session(pipeline, output) {
                    break;
                }
                show_message(pipeline);
                println!("  저장하지 못했습니다. w <경로> 로 다른 위치에 저장하거나 s 로 공유하세요");
                continue;
            }
        }
        show_message(pipeline);
    }

    Ok(())
}

fn prompt_line<E: OcrEngine>(pipeline: &Pipeline<E>) -> String {
    let session = pipeline.session();
    let area = match session.selection() {
        Some(rect) => rect.to_string(),
        None => "전체".to_string(),
    };
    format!(
        "[{}건] 품번={} 수량={}{} 범위={}",
        session.records.len(),
        session.draft.number,
        session.draft.quantity,
        session.units.selected(),
        area
    )
}

/// Down → Move → Up で選択範囲を確定
fn drag<E: OcrEngine>(pipeline: &mut Pipeline<E>, from: Point, to: Point) {
    pipeline.pointer(PointerEvent::Down(from));
    pipeline.pointer(PointerEvent::Move(to));
    pipeline.pointer(PointerEvent::Up);
    match pipeline.session().selection() {
        Some(rect) => println!("  → 범위 {}", rect),
        None => println!("  → 범위 없음 (전체 이미지)"),
    }
}

async fn recognize_with_progress<E: OcrEngine>(
    pipeline: &mut Pipeline<E>,
    mode: RecognitionMode,
) -> Result<()> {
    let pending = pipeline.start_recognition(mode)?;
    let ticket = pending.ticket();
    let mut progress = pending.progress();
    let invoker = pipeline.invoker();

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} 인식 중 [{bar:30.cyan/blue}] {pos}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let run = pending.run(&*invoker);
    tokio::pin!(run);
    let outcome: RecognitionOutcome = loop {
        tokio::select! {
            outcome = &mut run => break outcome,
            changed = progress.changed() => {
                if changed.is_err() {
                    break (&mut run).await;
                }
                let value = *progress.borrow();
                pipeline.set_progress(ticket, value);
                bar.set_position((value * 100.0) as u64);
            }
        }
    };
    bar.finish_and_clear();

    pipeline.finish_recognition(outcome).map(|_| ())
}

fn print_recognized<E: OcrEngine>(pipeline: &Pipeline<E>) {
    let Some(text) = pipeline.session().recognized() else {
        return;
    };
    for (i, line) in text.lines.iter().enumerate() {
        println!("  {:>2}: {}", i + 1, line);
    }
    let candidates = pipeline.candidates();
    if !candidates.is_empty() {
        println!("  품번 후보: {}", candidates.join(", "));
    }
}

fn print_records<E: OcrEngine>(pipeline: &Pipeline<E>) {
    let records = pipeline.session().records.records();
    if records.is_empty() {
        println!("  (없음)");
    }
    for record in records {
        println!("  {} {}", record.id, serialize_record(record));
    }
}

fn print_units<E: OcrEngine>(pipeline: &Pipeline<E>) {
    let units = &pipeline.session().units;
    for (i, unit) in units.units().iter().enumerate() {
        let mark = if unit == units.selected() { "*" } else { " " };
        println!("  {}{}: {}", mark, i + 1, unit);
    }
}

fn show_message<E: OcrEngine>(pipeline: &mut Pipeline<E>) {
    if let Some(message) = pipeline.session().message() {
        println!("  ⚠ {}", message);
    }
    pipeline.session_mut().clear_message();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::{OcrOutput, OcrRequest, ProgressFn, RecognitionInvoker};
    use async_trait::async_trait;
    use image::DynamicImage;
    use partnum_common::UnitCatalog;

    struct IdleEngine;

    #[async_trait]
    impl OcrEngine for IdleEngine {
        async fn recognize(
            &self,
            _image: &DynamicImage,
            _request: &OcrRequest,
            _progress: ProgressFn<'_>,
        ) -> Result<OcrOutput> {
            Err(PartNumError::Recognition("unused".into()))
        }
    }

    fn pipeline_with_record() -> Pipeline<IdleEngine> {
        let units = UnitCatalog::new(["EA"]).unwrap();
        let mut p = Pipeline::new(RecognitionInvoker::new(IdleEngine, "eng"), units, 30.0);
        p.session_mut().draft.number = "123456".into();
        p.add_record().unwrap();
        p
    }

    #[test]
    fn test_parse_capture() {
        assert_eq!(parse_action("c"), Some(SessionAction::Capture(None)));
        assert_eq!(
            parse_action("c  label.jpg "),
            Some(SessionAction::Capture(Some(PathBuf::from("label.jpg"))))
        );
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(
            parse_action("r 10,10,100,50"),
            Some(SessionAction::Rect(SelectionRect::new(10, 10, 100, 50)))
        );
        assert_eq!(
            parse_action("d 110,60:10,10"),
            Some(SessionAction::Drag(Point::new(110.0, 60.0), Point::new(10.0, 10.0)))
        );
        assert_eq!(parse_action("r 10,10"), None);
        assert_eq!(parse_action("x"), Some(SessionAction::ClearSelection));
    }

    #[test]
    fn test_parse_recognize() {
        assert_eq!(
            parse_action("o"),
            Some(SessionAction::Recognize(RecognitionMode::Standard))
        );
        assert_eq!(
            parse_action("a"),
            Some(SessionAction::Recognize(RecognitionMode::Advanced))
        );
    }

    #[test]
    fn test_parse_pick_line_is_one_based() {
        assert_eq!(parse_action("p 1"), Some(SessionAction::PickLine(0)));
        assert_eq!(parse_action("p 0"), None);
        assert_eq!(parse_action("p x"), None);
    }

    #[test]
    fn test_parse_record_commands() {
        assert_eq!(parse_action("n 3"), Some(SessionAction::Quantity("3".into())));
        assert_eq!(parse_action("n"), None);
        assert_eq!(parse_action("e 20251231"), Some(SessionAction::Expiry("20251231".into())));
        assert_eq!(parse_action("e"), Some(SessionAction::Expiry(String::new())));
        assert_eq!(parse_action("u 박스"), Some(SessionAction::Unit("박스".into())));
        assert_eq!(parse_action("U EA"), Some(SessionAction::AddUnit("EA".into())));
        assert_eq!(parse_action("+"), Some(SessionAction::AddRecord));
        assert_eq!(parse_action("- #2"), Some(SessionAction::RemoveRecord(2)));
        assert_eq!(parse_action("- 7"), Some(SessionAction::RemoveRecord(7)));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(parse_action(""), None);
        assert_eq!(parse_action("zzz"), None);
        assert_eq!(parse_action("o extra"), None);
        assert_eq!(parse_action("q"), Some(SessionAction::Quit));
    }

    #[test]
    fn test_parse_unit_commands() {
        assert_eq!(
            parse_action("R 2 케이스"),
            Some(SessionAction::RenameUnit(1, "케이스".into()))
        );
        assert_eq!(parse_action("R 0 X"), None);
        assert_eq!(parse_action("R 1"), None);
        assert_eq!(parse_action("D 3"), Some(SessionAction::DeleteUnit(2)));
        assert_eq!(parse_action("D"), None);
        assert_eq!(parse_action("L"), Some(SessionAction::Units));
    }

    #[test]
    fn test_parse_edit_record() {
        assert_eq!(
            parse_action("E #2 5 20251231"),
            Some(SessionAction::EditRecord {
                id: 2,
                quantity: "5".into(),
                expiry_date: "20251231".into(),
            })
        );
        assert_eq!(
            parse_action("E 2 5"),
            Some(SessionAction::EditRecord {
                id: 2,
                quantity: "5".into(),
                expiry_date: String::new(),
            })
        );
        assert_eq!(parse_action("E 2"), None);
        assert_eq!(parse_action("E x 5"), None);
        assert_eq!(parse_action("E 2 5 20251231 extra"), None);
    }

    #[test]
    fn test_parse_export() {
        assert_eq!(parse_action("w"), Some(SessionAction::Export(None)));
        assert_eq!(
            parse_action("w out/list.txt"),
            Some(SessionAction::Export(Some(PathBuf::from("out/list.txt"))))
        );
    }

    #[test]
    fn test_finish_session_keeps_records_on_export_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();
        let mut p = pipeline_with_record();

        // 親がファイルなので書き出せない
        assert!(!finish_session(&mut p, &blocker.join("list.txt")));
        assert_eq!(p.session().records.len(), 1);
        assert!(p.session().message().is_some());

        let target = dir.path().join("ok.txt");
        assert!(finish_session(&mut p, &target));
        assert_eq!(std::fs::read_to_string(target).unwrap(), "123456 1EA");
    }

    #[test]
    fn test_finish_session_with_no_records() {
        let units = UnitCatalog::new(["EA"]).unwrap();
        let mut p = Pipeline::new(RecognitionInvoker::new(IdleEngine, "eng"), units, 30.0);
        let dir = tempfile::tempdir().unwrap();
        assert!(finish_session(&mut p, dir.path()));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
