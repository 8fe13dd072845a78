use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::error::StoreError;
use crate::models::{NewVerification, OverallStatus, VerificationRecord};

/// 比对结果存储 (由传输层注入，比对引擎本身不持有任何状态)
#[async_trait]
pub trait VerificationStore: Send + Sync {
    async fn save(&self, verification: NewVerification) -> Result<VerificationRecord, StoreError>;

    /// 按输入顺序保存一批记录
    async fn save_all(
        &self,
        verifications: Vec<NewVerification>,
    ) -> Result<Vec<VerificationRecord>, StoreError> {
        let mut records = Vec::with_capacity(verifications.len());
        for verification in verifications {
            records.push(self.save(verification).await?);
        }
        Ok(records)
    }

    async fn get(&self, id: i64) -> Result<Option<VerificationRecord>, StoreError>;

    /// 按 id 倒序 (最新在前)；status 为 None 时不过滤，limit 为 None 时不限条数
    async fn list(
        &self,
        status: Option<OverallStatus>,
        limit: Option<usize>,
    ) -> Result<Vec<VerificationRecord>, StoreError>;

    /// 清空存储，返回删除条数
    async fn clear(&self) -> Result<u64, StoreError>;
}

/// 内存存储
#[derive(Debug)]
pub struct MemoryStore {
    records: DashMap<i64, VerificationRecord>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VerificationStore for MemoryStore {
    async fn save(&self, verification: NewVerification) -> Result<VerificationRecord, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = verification.into_record(id);
        self.records.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: i64) -> Result<Option<VerificationRecord>, StoreError> {
        Ok(self.records.get(&id).map(|r| r.value().clone()))
    }

    async fn list(
        &self,
        status: Option<OverallStatus>,
        limit: Option<usize>,
    ) -> Result<Vec<VerificationRecord>, StoreError> {
        let mut records: Vec<VerificationRecord> = self
            .records
            .iter()
            .filter(|r| status.map_or(true, |s| r.result.overall_status == s))
            .map(|r| r.value().clone())
            .collect();
        records.sort_by(|a, b| b.id.cmp(&a.id));
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    async fn clear(&self) -> Result<u64, StoreError> {
        let removed = self.records.len() as u64;
        self.records.clear();
        Ok(removed)
    }
}
