//! Batch controller: one review graph run per input document.
//!
//! Entries come back in input order with one entry per identifier. A
//! document that cannot be resolved gets a `Failed` entry and never reaches
//! the graph; nothing a single document does can abort the batch.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use tracing::Instrument;
use uuid::Uuid;

use crate::domain::{BatchEntry, BatchReport};
use crate::obs::{
    batch_span, document_span, emit_batch_finished, emit_batch_started, emit_document_finished,
    emit_document_started, emit_document_unreadable,
};
use crate::orchestration::graph::ReviewGraph;
use crate::source::DocumentSource;

pub struct BatchController {
    graph: ReviewGraph,
    source: Arc<dyn DocumentSource>,
}

impl BatchController {
    pub fn new(graph: ReviewGraph, source: Arc<dyn DocumentSource>) -> Self {
        Self { graph, source }
    }

    pub fn graph(&self) -> &ReviewGraph {
        &self.graph
    }

    /// Review every identifier.
    ///
    /// With `document_concurrency > 1` several documents are in flight at
    /// once and a freed slot goes to the next document regardless of which
    /// one finished; results are still ordered by input position.
    pub async fn process_batch(&self, documents: &[String]) -> BatchReport {
        let batch_id = Uuid::new_v4();
        let id = batch_id.to_string();
        let started = Instant::now();

        emit_batch_started(&id, documents.len(), self.graph.personas().len());

        let concurrency = self.graph.config().document_concurrency.max(1);
        let mut indexed = stream::iter(documents.iter().enumerate())
            .map(|(position, document)| async move {
                (position, self.process_document(document).await)
            })
            .buffer_unordered(concurrency)
            .collect::<Vec<(usize, BatchEntry)>>()
            .instrument(batch_span(&id))
            .await;
        indexed.sort_by_key(|(position, _)| *position);
        let entries = indexed.into_iter().map(|(_, entry)| entry).collect();

        let report = BatchReport { batch_id, entries };
        emit_batch_finished(
            &id,
            report.len(),
            report.summary().failed_documents,
            started.elapsed().as_millis() as u64,
        );
        report
    }

    /// Resolve and review a single identifier.
    pub async fn process_document(&self, document: &str) -> BatchEntry {
        async {
            let text = match self.source.resolve(document).await {
                Ok(text) => text,
                Err(e) => {
                    emit_document_unreadable(document, &e);
                    return BatchEntry::Failed {
                        document: document.to_string(),
                        error: e.to_string(),
                    };
                }
            };

            let started = Instant::now();
            emit_document_started(document, self.graph.personas().len());
            let review = self.graph.run(&text).await;

            let summary = review.summary();
            emit_document_finished(
                document,
                summary.total_findings,
                summary.failed_agents,
                started.elapsed().as_millis() as u64,
            );

            BatchEntry::Reviewed {
                document: document.to_string(),
                review,
            }
        }
        .instrument(document_span(document))
        .await
    }
}
