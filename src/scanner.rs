use crate::address::Address;
use crate::item::{self, ItemRecord};
use crate::ledger::{Cursor, ItemInspector, LedgerClient, LedgerError, Transaction};
use crate::output::RecordSink;
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub pages: usize,
    pub transactions: usize,
    pub messages: usize,
    pub items: usize,
}

/// Walks a collection's history from the newest transaction back to the first,
/// reporting every outbound message that targets a Fragment number item.
pub struct Scanner<L, I> {
    ledger: L,
    inspector: I,
    collection: Address,
    page_size: u32,
}

impl<L: LedgerClient, I: ItemInspector> Scanner<L, I> {
    pub fn new(ledger: L, inspector: I, collection: Address, page_size: u32) -> Self {
        Scanner {
            ledger,
            inspector,
            collection,
            page_size,
        }
    }

    pub async fn run<S: RecordSink>(&self, sink: &mut S) -> Result<ScanSummary> {
        let head = self
            .ledger
            .current_head()
            .await
            .context("Failed to get masterchain head")?;
        info!("Masterchain head at seqno {}", head.seqno);

        let state = self
            .ledger
            .account_state(&head, &self.collection)
            .await
            .context("Failed to get collection account")?;

        let mut cursor = state.cursor();
        info!(
            "Starting scan of {} from lt {}",
            self.collection, cursor.lt
        );

        let mut summary = ScanSummary::default();
        while !cursor.is_exhausted() {
            let page = self
                .ledger
                .list_transactions(&self.collection, self.page_size, &cursor)
                .await
                .with_context(|| format!("Failed to fetch transactions at lt {}", cursor.lt))?;

            summary.pages += 1;
            summary.transactions += page.len();

            for tx in &page {
                for msg in &tx.out_msgs {
                    let Some(destination) = &msg.destination else {
                        continue;
                    };
                    summary.messages += 1;

                    if let Some(record) = self.inspect(destination).await {
                        sink.emit(&record)?;
                        summary.items += 1;
                    }
                }
            }

            let next = next_cursor(&cursor, &page)?;
            info!(
                "Processed {} transactions down to lt {}, {} items so far",
                page.len(),
                next.lt,
                summary.items
            );
            cursor = next;
        }

        info!(
            "History exhausted: {} pages, {} transactions, {} messages, {} items",
            summary.pages, summary.transactions, summary.messages, summary.items
        );
        Ok(summary)
    }

    /// Runs the scan, then finishes `sink` either way. A scan error wins over a
    /// failed flush, which is only logged.
    pub async fn run_and_finish<S: RecordSink>(&self, sink: &mut S) -> Result<ScanSummary> {
        let result = self.run(sink).await;
        let finished = sink.finish().context("Failed to flush output");

        match result {
            Ok(summary) => finished.map(|()| summary),
            Err(e) => {
                if let Err(flush) = finished {
                    warn!("{:#}", flush);
                }
                Err(e)
            }
        }
    }

    /// Inspection failures are expected for most destinations and never abort the scan.
    async fn inspect(&self, address: &Address) -> Option<ItemRecord> {
        match self.inspector.nft_data(address).await {
            Ok(metadata) => {
                let record = item::classify(address, &metadata);
                if record.is_none() {
                    debug!("Skipping {}: not an initialized number item", address);
                }
                record
            }
            Err(e) => {
                debug!("Skipping {}: {}", address, e);
                None
            }
        }
    }
}

/// Back-pointer of the oldest transaction in `page`, whatever order the page
/// came in. Fails when the page cannot move the scan further back.
pub fn next_cursor(current: &Cursor, page: &[Transaction]) -> Result<Cursor> {
    let oldest = page.iter().min_by_key(|tx| tx.lt).ok_or_else(|| {
        LedgerError::Fetch(format!("no transactions returned at lt {}", current.lt))
    })?;

    let next = oldest.previous();
    if !next.is_exhausted() && next.lt >= current.lt {
        return Err(LedgerError::Fetch(format!(
            "history did not move back from lt {} (got {})",
            current.lt, next.lt
        ))
        .into());
    }
    Ok(next)
}
