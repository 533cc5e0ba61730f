// Per-session document state
//
// Each user connection owns one `Session`: the filenames it has ingested,
// the accumulated labeled document text, the last answer, and the audio
// cached for that answer. Sessions are handed out by `SessionRegistry` as
// independently locked handles, so one session's in-flight request never
// blocks another session.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::tts::audio_hash;

/// What happened to a single file during ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Text appended to the session's accumulated document text.
    Ingested,
    /// Filename already ingested in this batch set; nothing changed.
    Duplicate,
    /// File parsed but produced no text. Marked processed with a warning.
    Empty,
}

#[derive(Debug, Clone)]
struct CachedAudio {
    hash: String,
    bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct Session {
    seen_files: BTreeSet<String>,
    document_text: String,
    last_answer: Option<String>,
    audio: Option<CachedAudio>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all accumulated state iff the incoming batch names a different
    /// set of files than the one already ingested. Returns whether a reset
    /// happened.
    pub fn reset_if_batch_changed(&mut self, batch: &BTreeSet<String>) -> bool {
        if self.seen_files.is_empty() || *batch == self.seen_files {
            return false;
        }
        self.seen_files.clear();
        self.document_text.clear();
        self.last_answer = None;
        self.audio = None;
        true
    }

    /// Record one file's extracted text. Duplicate filenames are a no-op;
    /// whitespace-only text marks the file processed without contributing
    /// to the document text.
    pub fn ingest_extracted(&mut self, name: &str, text: &str) -> IngestOutcome {
        if self.seen_files.contains(name) {
            return IngestOutcome::Duplicate;
        }
        self.seen_files.insert(name.to_string());

        if text.trim().is_empty() {
            return IngestOutcome::Empty;
        }

        self.document_text
            .push_str(&format!("--- Content from {} ---\n{}\n", name, text));
        IngestOutcome::Ingested
    }

    pub fn document_text(&self) -> &str {
        &self.document_text
    }

    /// A session is ready for questions once it holds usable document text.
    pub fn is_ready(&self) -> bool {
        !self.document_text.trim().is_empty()
    }

    pub fn seen_files(&self) -> &BTreeSet<String> {
        &self.seen_files
    }

    /// Store the latest answer. Audio cached for a previous answer is
    /// invalidated here; it is only ever valid for the answer whose hash
    /// matches.
    pub fn record_answer(&mut self, answer: String) {
        let keep = self
            .audio
            .as_ref()
            .is_some_and(|cached| cached.hash == audio_hash(&answer));
        if !keep {
            self.audio = None;
        }
        self.last_answer = Some(answer);
    }

    pub fn last_answer(&self) -> Option<&str> {
        self.last_answer.as_deref()
    }

    pub fn cached_audio(&self, hash: &str) -> Option<Vec<u8>> {
        self.audio
            .as_ref()
            .filter(|cached| cached.hash == hash)
            .map(|cached| cached.bytes.clone())
    }

    pub fn store_audio(&mut self, hash: String, bytes: Vec<u8>) {
        self.audio = Some(CachedAudio { hash, bytes });
    }
}

pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        let guard = self.inner.read().await;
        guard.get(&id).cloned()
    }

    /// Look up an existing session or create a fresh one. The returned id
    /// identifies the session for the rest of the interaction.
    pub async fn get_or_create(&self, id: Option<Uuid>) -> (Uuid, SessionHandle) {
        let mut guard = self.inner.write().await;
        if let Some(id) = id {
            if let Some(handle) = guard.get(&id) {
                return (id, handle.clone());
            }
        }
        let id = Uuid::new_v4();
        let handle: SessionHandle = Arc::new(Mutex::new(Session::new()));
        guard.insert(id, handle.clone());
        (id, handle)
    }
}
