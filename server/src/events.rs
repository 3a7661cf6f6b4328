//! Append-only log of query and click events.
//!
//! Handlers write through the [`EventSink`] trait; where the events end up is
//! decided when the server is assembled.

use anyhow::{Context, Result};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEvent {
    pub query: String,
    pub num_terms: usize,
    pub timestamp: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub doc_id: String,
    pub query: Option<String>,
    /// Seconds between the search and the click, when the search time is known.
    pub dwell_time_s: Option<f64>,
    pub timestamp: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    Query(QueryEvent),
    Click(ClickEvent),
}

pub trait EventSink: Send + Sync {
    fn append(&self, event: Event) -> Result<()>;

    /// Every event appended so far, oldest first. Sinks that cannot be read
    /// back report nothing.
    fn replay(&self) -> Result<Vec<Event>> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Default)]
pub struct MemoryEventLog {
    events: RwLock<Vec<Event>>,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl EventSink for MemoryEventLog {
    fn append(&self, event: Event) -> Result<()> {
        self.events.write().push(event);
        Ok(())
    }

    fn replay(&self) -> Result<Vec<Event>> {
        Ok(self.events.read().clone())
    }
}

/// Writes one JSON object per line, flushing after each event.
pub struct JsonlEventSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonlEventSink {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening event log {}", path.display()))?;
        Ok(Self { path, writer: Mutex::new(BufWriter::new(file)) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSink for JsonlEventSink {
    fn append(&self, event: Event) -> Result<()> {
        let mut out = self.writer.lock();
        serde_json::to_writer(&mut *out, &event)?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }

    fn replay(&self) -> Result<Vec<Event>> {
        // hold the writer so no half-written line is read
        let _guard = self.writer.lock();
        let reader = BufReader::new(File::open(&self.path)?);
        let mut events = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event = serde_json::from_str(&line)
                .with_context(|| format!("{} line {}", self.path.display(), i + 1))?;
            events.push(event);
        }
        Ok(events)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClickCount {
    pub doc_id: String,
    pub clicks: usize,
}

/// Dashboard view over the event log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics {
    pub total_queries: usize,
    pub total_clicks: usize,
    pub most_clicked_docs: Vec<ClickCount>,
    pub user_queries: Vec<QueryEvent>,
    pub click_data: Vec<ClickEvent>,
}

pub const MOST_CLICKED_LIMIT: usize = 5;

impl Analytics {
    pub fn from_events(events: Vec<Event>) -> Self {
        let mut user_queries = Vec::new();
        let mut click_data = Vec::new();
        for event in events {
            match event {
                Event::Query(q) => user_queries.push(q),
                Event::Click(c) => click_data.push(c),
            }
        }

        // count per doc, remembering the first click for tie-breaks
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for (i, click) in click_data.iter().enumerate() {
            counts.entry(click.doc_id.as_str()).or_insert((0, i)).0 += 1;
        }
        let mut ranked: Vec<(&str, usize, usize)> =
            counts.into_iter().map(|(id, (n, first))| (id, n, first)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        let most_clicked_docs = ranked
            .into_iter()
            .take(MOST_CLICKED_LIMIT)
            .map(|(doc_id, clicks, _)| ClickCount { doc_id: doc_id.to_string(), clicks })
            .collect();

        Self {
            total_queries: user_queries.len(),
            total_clicks: click_data.len(),
            most_clicked_docs,
            user_queries,
            click_data,
        }
    }
}
