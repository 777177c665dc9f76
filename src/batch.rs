//! Streaming CSV front-end for pricing many invoices.
//!
//! Input has one line item per row; consecutive rows sharing an `invoice_id`
//! form one invoice, whose header columns come from its first row. Each
//! invoice is priced on its own, and a rejected invoice never stops the batch.
//!
//! Every cell is trimmed before use, so a coupon cell holding only spaces
//! reads as "no coupon" rather than as an unknown code.

use crate::engine::{ComputationResult, PricingEngine};
use crate::error::{EngineError, Result};
use crate::invoice::{Invoice, InvoiceRecord};
use csv::{ByteRecord, ReaderBuilder, Trim};
use log::{debug, warn};
use std::io::{Read, Write};

/// Outcome of pricing one invoice from the batch.
#[derive(Debug)]
pub struct PricedInvoice {
    pub invoice_id: String,
    pub outcome: std::result::Result<ComputationResult, EngineError>,
}

/// An invoice still collecting rows.
struct PendingInvoice {
    invoice: Invoice,
    /// First row-level defect; rejects the invoice once complete.
    defect: Option<EngineError>,
}

impl PendingInvoice {
    fn new(invoice: Invoice) -> Self {
        PendingInvoice {
            invoice,
            defect: None,
        }
    }

    fn reject(&mut self, row: usize, message: String) {
        warn!("Row {}: {}", row, message);
        if self.defect.is_none() {
            self.defect = Some(EngineError::InvalidRecord { row, message });
        }
    }

    /// Warns when a continuation row disagrees with the header taken from the
    /// invoice's first row.
    fn check_header(&self, row: usize, record: &InvoiceRecord) {
        let header = &self.invoice;
        if header.customer_id != record.customer_id
            || header.country != record.country
            || header.membership != record.membership
            || header.coupon != record.coupon
        {
            warn!(
                "Row {}: header columns differ from the first row of invoice {:?}, keeping the first row's",
                row, header.invoice_id
            );
        }
    }
}

/// Prices invoices read from CSV, keeping results in input order.
pub struct InvoiceBatch {
    engine: PricingEngine,
    results: Vec<PricedInvoice>,
}

impl InvoiceBatch {
    pub fn new(engine: PricingEngine) -> Self {
        InvoiceBatch {
            engine,
            results: Vec::new(),
        }
    }

    /// Reads invoices from a CSV reader in streaming fashion.
    ///
    /// Only the invoice currently being assembled is held in memory besides
    /// the results. A row that cannot be decoded or parsed rejects the invoice
    /// named in its first column; when even the raw row is unreadable, the
    /// invoice being assembled is rejected.
    pub fn process_csv<R: Read>(&mut self, reader: R) -> Result<()> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);
        let headers = csv_reader.byte_headers()?.clone();

        let mut pending: Option<PendingInvoice> = None;
        let mut raw = ByteRecord::new();
        let mut row_num = 1;

        loop {
            row_num += 1;
            match csv_reader.read_byte_record(&mut raw) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    match pending.as_mut() {
                        Some(current) => current.reject(row_num, e.to_string()),
                        None => warn!("Row {}: CSV read error: {}", row_num, e),
                    }
                    continue;
                }
            }

            let invoice_id = raw
                .get(0)
                .map(|id| String::from_utf8_lossy(id).into_owned())
                .unwrap_or_default();

            let continues = pending
                .as_ref()
                .is_some_and(|p| p.invoice.invoice_id == invoice_id);

            let record = raw.deserialize::<InvoiceRecord>(Some(&headers));

            if !continues {
                if let Some(done) = pending.take() {
                    self.finish(done);
                }
                let header = match &record {
                    Ok(record) => record.header(),
                    Err(_) => Invoice::new(&invoice_id, "", ""),
                };
                pending = Some(PendingInvoice::new(header));
            } else if let (Some(current), Ok(record)) = (pending.as_ref(), &record) {
                current.check_header(row_num, record);
            }

            let Some(current) = pending.as_mut() else {
                continue;
            };
            match record {
                Ok(record) => match record.line_item() {
                    Ok(Some(item)) => current.invoice.items.push(item),
                    Ok(None) => {}
                    Err(message) => current.reject(row_num, message),
                },
                Err(e) => current.reject(row_num, format!("undecodable row: {}", e)),
            }
        }

        if let Some(done) = pending.take() {
            self.finish(done);
        }

        Ok(())
    }

    /// Prices a completed invoice and records the outcome.
    fn finish(&mut self, pending: PendingInvoice) {
        let invoice_id = pending.invoice.invoice_id.clone();

        let outcome = match pending.defect {
            Some(defect) => Err(defect),
            None => self
                .engine
                .compute_total(&pending.invoice)
                .map_err(EngineError::from),
        };

        match &outcome {
            Ok(result) => debug!("Invoice {:?}: total {}", invoice_id, result.total),
            Err(e) => warn!("Invoice {:?} rejected: {}", invoice_id, e),
        }

        self.results.push(PricedInvoice {
            invoice_id,
            outcome,
        });
    }

    pub fn results(&self) -> &[PricedInvoice] {
        &self.results
    }

    /// Writes one CSV row per invoice, in input order.
    ///
    /// Monetary values are formatted with exactly 4 decimal places, warnings
    /// are joined with `|`, and rejected invoices carry only their error.
    pub fn write_output<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "invoice_id",
            "subtotal",
            "shipping",
            "fragile_fee",
            "discount",
            "tax",
            "total",
            "warnings",
            "error",
        ])?;

        for priced in &self.results {
            match &priced.outcome {
                Ok(result) => {
                    let b = &result.breakdown;
                    csv_writer.write_record([
                        priced.invoice_id.clone(),
                        b.subtotal.to_string(),
                        b.shipping.to_string(),
                        b.fragile_fee.to_string(),
                        b.discount.to_string(),
                        b.tax.to_string(),
                        b.total.to_string(),
                        result.warning_messages().join("|"),
                        String::new(),
                    ])?;
                }
                Err(e) => {
                    let mut record = vec![priced.invoice_id.clone()];
                    record.extend(std::iter::repeat(String::new()).take(7));
                    record.push(error_message(e));
                    csv_writer.write_record(&record)?;
                }
            }
        }

        csv_writer.flush()?;
        Ok(())
    }
}

/// Validation failures are reported by their bare problem list.
fn error_message(error: &EngineError) -> String {
    match error {
        EngineError::Validation(v) => v.to_string(),
        other => other.to_string(),
    }
}
