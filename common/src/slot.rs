//! 認識リクエストの単一スロット
//!
//! Idle → Running → {Done, Failed}。再撮影などで cancel されると Idle に戻り、
//! 古いチケットで届いた結果は捨てる。

/// 実行中リクエストの識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotState {
    #[default]
    Idle,
    Running(Ticket),
    Done,
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct RecognitionSlot {
    state: SlotState,
    issued: u64,
}

impl RecognitionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SlotState::Running(_))
    }

    /// 実行中なら None（同時に2件は走らせない）
    pub fn begin(&mut self) -> Option<Ticket> {
        if self.is_running() {
            return None;
        }
        self.issued += 1;
        let ticket = Ticket(self.issued);
        self.state = SlotState::Running(ticket);
        Some(ticket)
    }

    /// 現在のチケットか
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.state == SlotState::Running(ticket)
    }

    /// 成功。古いチケットなら false（結果は捨てる）
    pub fn complete(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.state = SlotState::Done;
        true
    }

    pub fn fail(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.state = SlotState::Failed;
        true
    }

    pub fn cancel(&mut self) {
        self.state = SlotState::Idle;
    }
}
