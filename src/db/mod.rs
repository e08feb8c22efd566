use anyhow::Result;
use rocksdb::{Direction, IteratorMode, Options, DB};

use crate::{model::draft::DraftRecord, model::message::Message, wizard::GuideSession};

use std::str;

pub struct DBLayer {
    db: DB,
}

impl DBLayer {
    pub fn new(path: &str) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path)?;
        Ok(Self { db })
    }

    // ============================================================
    // GUIDE SESSIONS (intake wizard in progress)
    // ============================================================
    fn guide_key(session_id: &str) -> String {
        format!("guide:{session_id}")
    }

    pub async fn save_guide_session(&self, session: &GuideSession) -> Result<()> {
        let key = Self::guide_key(&session.id);
        let val = serde_json::to_vec(session)?;
        self.db.put(key, val)?;
        Ok(())
    }

    pub async fn load_guide_session(&self, session_id: &str) -> Result<Option<GuideSession>> {
        let key = Self::guide_key(session_id);
        Ok(self
            .db
            .get(key)?
            .map(|v| serde_json::from_slice(&v))
            .transpose()?)
    }

    // ============================================================
    // DRAFT RECORDS (completed intake answers, keyed by session)
    // ============================================================
    fn draft_key(session_id: &str) -> String {
        format!("draft:{session_id}")
    }

    /// Overwrites any previous record for the session.
    pub async fn save_draft(&self, session_id: &str, draft: &DraftRecord) -> Result<()> {
        let key = Self::draft_key(session_id);
        let val = serde_json::to_vec(draft)?;
        self.db.put(key, val)?;
        Ok(())
    }

    pub async fn load_draft(&self, session_id: &str) -> Result<Option<DraftRecord>> {
        let key = Self::draft_key(session_id);
        Ok(self
            .db
            .get(key)?
            .map(|v| serde_json::from_slice(&v))
            .transpose()?)
    }

    // ============================================================
    // SIMULATION MESSAGES (SESSION-ORDERED)
    // ============================================================
    fn msg_key(session_id: &str, ts: i64, id: &str) -> String {
        format!("session:{}:msg:{:020}:{id}", session_id, ts)
        // 020 → zero-padded timestamp for correct sorting
    }

    pub async fn save_message(&self, msg: &Message) -> Result<()> {
        let key = Self::msg_key(&msg.session_id, msg.ts, &msg.id);
        let val = serde_json::to_vec(msg)?;
        self.db.put(key, val)?;
        Ok(())
    }

    pub async fn list_messages_for_session(&self, session_id: &str) -> Result<Vec<Message>> {
        let prefix = format!("session:{}:msg:", session_id);
        let mut results = Vec::new();

        let iter = self
            .db
            .iterator(IteratorMode::From(prefix.as_bytes(), Direction::Forward));

        for item in iter {
            let (key, val) = item?;
            let k = str::from_utf8(&key)?;

            if !k.starts_with(&prefix) {
                break;
            }

            let msg: Message = serde_json::from_slice(&val)?;
            results.push(msg);
        }

        Ok(results)
    }

    /// Delete all messages for a simulation session.
    pub async fn delete_session(&self, session_id: &str) -> Result<usize> {
        let prefix = format!("session:{}:msg:", session_id);

        // Collect keys first to avoid mutating while iterating.
        let mut keys = Vec::new();
        for item in self
            .db
            .iterator(IteratorMode::From(prefix.as_bytes(), Direction::Forward))
        {
            let (key, _) = item?;
            let k = str::from_utf8(&key)?;
            if !k.starts_with(&prefix) {
                break;
            }
            keys.push(key);
        }

        let removed = keys.len();
        for key in keys {
            self.db.delete(key)?;
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::ScenarioTag;

    fn temp_db() -> (DBLayer, std::path::PathBuf) {
        let path = std::env::temp_dir().join(format!("retort-test-{}", uuid::Uuid::new_v4()));
        let db = DBLayer::new(path.to_str().unwrap()).unwrap();
        (db, path)
    }

    #[tokio::test]
    async fn draft_roundtrip_overwrites() {
        let (db, path) = temp_db();
        let session_id = "s1";

        let mut draft = DraftRecord {
            scenario: ScenarioTag::Work,
            description: "同事总是抢占功劳".into(),
            emotion: Some("angry".into()),
            goal: Some("argue".into()),
            additional_info: String::new(),
            created_ts: 1,
        };
        db.save_draft(session_id, &draft).await.unwrap();

        draft.description = "上司经常在公开场合批评我".into();
        db.save_draft(session_id, &draft).await.unwrap();

        let loaded = db.load_draft(session_id).await.unwrap().unwrap();
        assert_eq!(loaded.description, "上司经常在公开场合批评我");
        assert!(db.load_draft("missing").await.unwrap().is_none());

        drop(db);
        let _ = std::fs::remove_dir_all(path);
    }

    #[tokio::test]
    async fn messages_come_back_in_timestamp_order() {
        let (db, path) = temp_db();

        for (ts, text) in [(30, "third"), (10, "first"), (20, "second")] {
            let mut msg = Message::new("sim-1", "user", text);
            msg.ts = ts;
            db.save_message(&msg).await.unwrap();
        }

        let msgs = db.list_messages_for_session("sim-1").await.unwrap();
        let texts: Vec<_> = msgs.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);

        assert_eq!(db.delete_session("sim-1").await.unwrap(), 3);
        assert!(db
            .list_messages_for_session("sim-1")
            .await
            .unwrap()
            .is_empty());

        drop(db);
        let _ = std::fs::remove_dir_all(path);
    }

    #[tokio::test]
    async fn guide_session_roundtrip() {
        let (db, path) = temp_db();

        let session = GuideSession::new(ScenarioTag::Relationship);
        db.save_guide_session(&session).await.unwrap();

        let loaded = db.load_guide_session(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, session.id);
        assert_eq!(loaded.scenario, ScenarioTag::Relationship);

        drop(db);
        let _ = std::fs::remove_dir_all(path);
    }
}
