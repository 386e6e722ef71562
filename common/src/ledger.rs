//! 品番レコード一覧と単位カタログ

use crate::error::{Error, Result};
use crate::types::{PartRecord, RecordId};

/// 入力フォームの数量初期値
pub const DEFAULT_QUANTITY: &str = "1";

/// 入力中のレコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDraft {
    pub number: String,
    pub quantity: String,
    pub expiry_date: String,
}

impl Default for RecordDraft {
    fn default() -> Self {
        Self {
            number: String::new(),
            quantity: DEFAULT_QUANTITY.to_string(),
            expiry_date: String::new(),
        }
    }
}

impl RecordDraft {
    /// 認識行を品番欄にセット（検証しない）
    pub fn pick_line(&mut self, line: &str) {
        self.number = line.to_string();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_complete(&self) -> bool {
        !self.number.trim().is_empty() && !self.quantity.trim().is_empty()
    }
}

/// セッション内のレコード一覧（挿入順を保持）
#[derive(Debug, Clone, Default)]
pub struct RecordBook {
    records: Vec<PartRecord>,
    next_id: u64,
}

impl RecordBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// レコードを末尾に追加
    ///
    /// 品番か数量が空なら何もしない。
    pub fn add_record(&mut self, draft: &RecordDraft, unit: &str) -> Option<RecordId> {
        if !draft.is_complete() {
            return None;
        }
        self.next_id += 1;
        let id = RecordId(self.next_id);
        self.records.push(PartRecord {
            id,
            number: draft.number.trim().to_string(),
            quantity: draft.quantity.trim().to_string(),
            unit: unit.to_string(),
            expiry_date: draft.expiry_date.trim().to_string(),
        });
        Some(id)
    }

    /// 該当IDがなければ何もしない
    pub fn remove_record(&mut self, id: RecordId) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }

    /// 数量・有効期限の編集（レコードごと置き換える）
    pub fn edit_record(&mut self, id: RecordId, quantity: &str, expiry_date: &str) -> bool {
        if quantity.trim().is_empty() {
            return false;
        }
        let Some(pos) = self.records.iter().position(|r| r.id == id) else {
            return false;
        };
        let old = &self.records[pos];
        self.records[pos] = PartRecord {
            id,
            number: old.number.clone(),
            quantity: quantity.trim().to_string(),
            unit: old.unit.clone(),
            expiry_date: expiry_date.trim().to_string(),
        };
        true
    }

    pub fn records(&self) -> &[PartRecord] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&PartRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// 単位カタログ
///
/// 常に1件以上を保持する。
#[derive(Debug, Clone)]
pub struct UnitCatalog {
    units: Vec<String>,
    selected: String,
}

impl UnitCatalog {
    pub fn new<I, S>(units: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog: Vec<String> = Vec::new();
        for unit in units {
            let unit = unit.into().trim().to_string();
            if !unit.is_empty() && !catalog.contains(&unit) {
                catalog.push(unit);
            }
        }
        let selected = catalog
            .first()
            .cloned()
            .ok_or_else(|| Error::Config("単位が1件もありません".into()))?;
        Ok(Self { units: catalog, selected })
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    /// カタログにある単位のみ選択できる
    pub fn select(&mut self, name: &str) -> bool {
        if self.units.iter().any(|u| u == name) {
            self.selected = name.to_string();
            true
        } else {
            false
        }
    }

    /// 空でなく未登録の場合のみ追加（大文字小文字は区別）
    pub fn add_unit(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.units.iter().any(|u| u == name) {
            return false;
        }
        self.units.push(name.to_string());
        true
    }

    /// 改名。選択中の単位なら選択も追従する。
    pub fn rename_unit(&mut self, index: usize, new_name: &str) -> bool {
        let new_name = new_name.trim();
        if new_name.is_empty() || index >= self.units.len() {
            return false;
        }
        if self
            .units
            .iter()
            .enumerate()
            .any(|(i, u)| i != index && u == new_name)
        {
            return false;
        }
        let old = std::mem::replace(&mut self.units[index], new_name.to_string());
        if self.selected == old {
            self.selected = new_name.to_string();
        }
        true
    }

    /// 最後の1件は削除できない。選択中なら先頭に戻る。
    pub fn delete_unit(&mut self, index: usize) -> bool {
        if self.units.len() <= 1 || index >= self.units.len() {
            return false;
        }
        let removed = self.units.remove(index);
        if self.selected == removed {
            self.selected = self.units[0].clone();
        }
        true
    }
}
