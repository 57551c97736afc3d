use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::runner::RunMode;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct HistoryRecord {
    pub url: String,
    pub mode: RunMode,
    /// `YYYY-MM-DD HH:MM`, UTC.
    pub time: String,
}

/// Bounded log of successful runs, oldest first.
#[derive(Clone)]
pub struct History {
    records: Arc<Mutex<VecDeque<HistoryRecord>>>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            records: Arc::new(Mutex::new(VecDeque::with_capacity(limit))),
            limit,
        }
    }

    pub fn record(&self, url: &str, mode: RunMode, at: DateTime<Utc>) {
        let record = HistoryRecord {
            url: url.to_string(),
            mode,
            time: at.format(TIME_FORMAT).to_string(),
        };

        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.push_back(record);
        while records.len() > self.limit {
            records.pop_front();
        }
    }

    pub fn recent(&self) -> Vec<HistoryRecord> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.iter().cloned().collect()
    }
}
