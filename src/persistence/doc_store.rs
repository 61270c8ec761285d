use std::collections::BTreeMap;
use std::path::PathBuf;

use fjall::{Database, Keyspace, KeyspaceCreateOptions, PersistMode};
use serde::{Deserialize, Serialize};

use crate::error::TmError;
use crate::models::DomainId;
use crate::persistence::{BlobLog, BlobPointer};
use crate::store::{DocId, IndexedDocument};
use crate::Result;

/// Pointer plus metadata stored in Fjall for a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocPointer {
    pub blob: BlobPointer,
    pub domain: DomainId,
}

impl DocPointer {
    pub fn new(blob: BlobPointer, domain: DomainId) -> Self {
        Self { blob, domain }
    }
}

/// Durable description of the last committed transaction.
///
/// Writing this record is the atomic publish step of a commit: anything in
/// the blob log past `blob_len`, and any pointer at or above `next_doc_id`,
/// belongs to an unfinished transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitPoint {
    pub generation: u64,
    pub next_doc_id: DocId,
    pub blob_len: u64,
    /// Documents of a domain with an id below its cutoff are deleted
    pub domain_cutoffs: BTreeMap<DomainId, DocId>,
}

impl CommitPoint {
    pub fn is_live(&self, doc_id: DocId, domain: DomainId) -> bool {
        doc_id < self.next_doc_id
            && self
                .domain_cutoffs
                .get(&domain)
                .map_or(true, |&cutoff| doc_id >= cutoff)
    }
}

/// Fjall-backed document store with append-only blob log.
pub struct DocStore {
    db: Database,
    docptr: Keyspace,
    commit: Keyspace,
    blob_log: BlobLog,
}

const DOCPTR_CF: &str = "docptr";
const COMMIT_CF: &str = "commit";
const COMMIT_POINT_KEY: &[u8] = b"commit_point";

fn storage_err(e: impl std::fmt::Display) -> TmError {
    TmError::Storage(e.to_string())
}

impl DocStore {
    pub fn open(base_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&base_dir)?;
        let db = Database::builder(&base_dir)
            .open()
            .map_err(|e| TmError::Storage(format!("failed to open fjall doc store: {}", e)))?;

        let docptr = db
            .keyspace(DOCPTR_CF, || KeyspaceCreateOptions::default())
            .map_err(|e| TmError::Storage(format!("failed to open docptr cf: {}", e)))?;
        let commit = db
            .keyspace(COMMIT_CF, || KeyspaceCreateOptions::default())
            .map_err(|e| TmError::Storage(format!("failed to open commit cf: {}", e)))?;

        let blob_log = BlobLog::open(base_dir.join("documents.blob"))?;

        Ok(Self {
            db,
            docptr,
            commit,
            blob_log,
        })
    }

    fn encode_doc_id(doc_id: DocId) -> [u8; 8] {
        doc_id.to_be_bytes()
    }

    fn decode_doc_id(key: &[u8]) -> Option<DocId> {
        let bytes: [u8; 8] = key.try_into().ok()?;
        Some(u64::from_be_bytes(bytes))
    }

    /// Persist a document: append to blob log and store pointer.
    pub fn put_document(&self, doc_id: DocId, doc: &IndexedDocument) -> Result<DocPointer> {
        let payload = bincode::serialize(doc)?;
        let blob_ptr = self.blob_log.append(&payload)?;
        let ptr = DocPointer::new(blob_ptr, doc.domain);
        let val = bincode::serialize(&ptr)?;
        self.docptr
            .insert(Self::encode_doc_id(doc_id), val)
            .map_err(storage_err)?;
        Ok(ptr)
    }

    #[cfg(test)]
    fn get_document(&self, doc_id: DocId) -> Result<Option<IndexedDocument>> {
        let Some(val) = self
            .docptr
            .get(Self::encode_doc_id(doc_id))
            .map_err(storage_err)?
        else {
            return Ok(None);
        };
        let ptr: DocPointer = bincode::deserialize(&val)?;
        self.read_pointer(&ptr).map(Some)
    }

    fn read_pointer(&self, ptr: &DocPointer) -> Result<IndexedDocument> {
        let payload = self.blob_log.read(ptr.blob)?;
        Ok(bincode::deserialize(&payload)?)
    }

    /// Iterate all document pointers in ascending id order.
    pub fn list_doc_pointers(&self) -> Result<Vec<(DocId, DocPointer)>> {
        let mut out = Vec::new();
        for kv in self.docptr.iter() {
            let key = kv.key().map_err(storage_err)?;
            let key_bytes = key.as_ref().to_vec();
            let Some(doc_id) = Self::decode_doc_id(&key_bytes) else {
                continue;
            };
            if let Some(val) = self.docptr.get(&key_bytes).map_err(storage_err)? {
                let ptr: DocPointer = bincode::deserialize(val.as_ref())?;
                out.push((doc_id, ptr));
            }
        }
        out.sort_by_key(|(doc_id, _)| *doc_id);
        Ok(out)
    }

    /// Live documents as of `commit`, ascending id
    pub fn load_documents(&self, commit: &CommitPoint) -> Result<Vec<(DocId, IndexedDocument)>> {
        let mut out = Vec::new();
        for (doc_id, ptr) in self.list_doc_pointers()? {
            if !commit.is_live(doc_id, ptr.domain) {
                continue;
            }
            out.push((doc_id, self.read_pointer(&ptr)?));
        }
        Ok(out)
    }

    pub fn load_commit_point(&self) -> Result<Option<CommitPoint>> {
        let Some(val) = self.commit.get(COMMIT_POINT_KEY).map_err(storage_err)? else {
            return Ok(None);
        };
        Ok(Some(bincode::deserialize(val.as_ref())?))
    }

    pub fn write_commit_point(&self, commit: &CommitPoint) -> Result<()> {
        let val = bincode::serialize(commit)?;
        self.commit
            .insert(COMMIT_POINT_KEY, val)
            .map_err(storage_err)?;
        Ok(())
    }

    /// Remove everything an unfinished transaction may have written: blob
    /// bytes past `blob_len` and pointers at or above `first_doc_id`.
    pub fn discard_uncommitted(&self, first_doc_id: DocId, blob_len: u64) -> Result<()> {
        self.blob_log.truncate(blob_len)?;

        let mut stale = Vec::new();
        for kv in self.docptr.iter() {
            let key = kv.key().map_err(storage_err)?;
            if let Some(doc_id) = Self::decode_doc_id(key.as_ref()) {
                if doc_id >= first_doc_id {
                    stale.push(doc_id);
                }
            }
        }
        for doc_id in stale {
            self.docptr
                .remove(Self::encode_doc_id(doc_id))
                .map_err(storage_err)?;
        }
        Ok(())
    }

    pub fn blob_len(&self) -> Result<u64> {
        self.blob_log.len()
    }

    pub fn sync(&self) -> Result<()> {
        self.blob_log.sync()
    }

    /// Flush the fjall journal to stable storage.
    pub fn persist(&self) -> Result<()> {
        self.db.persist(PersistMode::SyncAll).map_err(storage_err)
    }
}
