//! Worker records and the worker table view

use std::collections::HashSet;

use parking_lot::Mutex;

use super::WorkerInfo;
use crate::address::Address;
use crate::element::List;
use crate::focus::Focusable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmationStatus {
    #[default]
    Unconfirmed,
    InProgress,
    Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerRecord {
    pub address: Address,
    pub status: ConfirmationStatus,
}

/// Rebuild records from a fresh fetch.
///
/// An in-flight address shows `InProgress` whatever the node says. Addresses
/// the node reports confirmed are added to `confirmed`, which only grows.
pub fn reconcile(
    fetched: &[WorkerInfo],
    in_flight: &HashSet<Address>,
    confirmed: &mut HashSet<Address>,
) -> Vec<WorkerRecord> {
    fetched
        .iter()
        .map(|info| {
            if info.confirmed {
                confirmed.insert(info.address);
            }
            let status = if in_flight.contains(&info.address) {
                ConfirmationStatus::InProgress
            } else if info.confirmed || confirmed.contains(&info.address) {
                ConfirmationStatus::Confirmed
            } else {
                ConfirmationStatus::Unconfirmed
            };
            WorkerRecord {
                address: info.address,
                status,
            }
        })
        .collect()
}

/// Worker table: records plus a selectable row list
#[derive(Debug, Default)]
pub struct WorkerListView {
    records: Mutex<Vec<WorkerRecord>>,
    rows: List,
}

impl WorkerListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<WorkerRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn status_of(&self, address: &Address) -> Option<ConfirmationStatus> {
        self.records
            .lock()
            .iter()
            .find(|r| &r.address == address)
            .map(|r| r.status)
    }

    /// Replace every record; the selected row index survives, clamped
    pub fn set_records(&self, records: Vec<WorkerRecord>) {
        self.rows
            .replace_items(records.iter().map(|r| r.address.to_hex()));
        *self.records.lock() = records;
    }

    /// Update one record in place; unknown addresses are ignored
    pub fn set_status(&self, address: &Address, status: ConfirmationStatus) {
        if let Some(record) = self
            .records
            .lock()
            .iter_mut()
            .find(|r| &r.address == address)
        {
            record.status = status;
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.rows.selected()
    }

    pub fn selected_address(&self) -> Option<Address> {
        let index = self.rows.selected()?;
        self.records.lock().get(index).map(|r| r.address)
    }

    pub fn select(&self, index: usize) {
        self.rows.select(index);
    }

    pub fn select_next(&self) {
        self.rows.select_next();
    }

    pub fn select_prev(&self) {
        self.rows.select_prev();
    }
}

impl Focusable for WorkerListView {
    fn set_focused(&self, focused: bool) {
        self.rows.set_focused(focused);
    }

    fn is_focused(&self) -> bool {
        self.rows.is_focused()
    }
}
