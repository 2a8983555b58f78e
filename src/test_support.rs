//! Scratch directories and fixture files shared by unit tests.

#![allow(clippy::panic)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::domain::DrawLog;

/// Participant export header as connpass writes it.
pub const PARTICIPANT_HEADER: &str = "参加枠名,ユーザー名,表示名,利用開始日,コメント,参加ステータス,出欠ステータス,PayPal取引ID,請求書ID,更新日時,受付番号";

/// Temporary directory removed on drop.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Creates a fresh, uniquely named directory under the OS temp dir.
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("connpass-raffle-{}", uuid::Uuid::new_v4()));
        if let Err(e) = fs::create_dir_all(&path) {
            panic!("cannot create scratch dir {}: {e}", path.display());
        }
        Self { path }
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `contents` to `name` inside the directory and returns its path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path.join(name);
        if let Err(e) = fs::write(&path, contents) {
            panic!("cannot write {}: {e}", path.display());
        }
        path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Builds one participant CSV line.
pub fn participant_line(user: &str, status: &str, receipt: u64) -> String {
    format!("一般枠,{user},{user},2019/04/01 10:00,,{status},,,,2019/04/02 12:00,{receipt}")
}

/// Builds a participant export with a header and one active row per user.
pub fn participant_csv(users: &[&str]) -> String {
    let mut csv = format!("{PARTICIPANT_HEADER}\n");
    for (receipt, user) in (1_u64..).zip(users) {
        csv.push_str(&participant_line(user, "参加者", receipt));
        csv.push('\n');
    }
    csv
}

/// Prize export with two items.
pub const PRIZE_CSV: &str = "ID,提供,景品名\nP-01,ACME,Mechanical keyboard\nP-02,Initech,Red stapler\n";

/// [`DrawLog`] that keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemoryLog {
    messages: Mutex<Vec<String>>,
}

impl MemoryLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every message recorded so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }
}

impl DrawLog for MemoryLog {
    fn debug(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

#[test]
fn memory_log_records_in_order() {
    let log = MemoryLog::new();
    log.debug("first");
    log.debug("second");
    assert_eq!(log.messages(), vec!["first", "second"]);
}
