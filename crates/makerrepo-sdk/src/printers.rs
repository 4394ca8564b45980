// Copyright 2025 The MakerRepo Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The 3D printers of the space, their issues, and who is using them.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{info, instrument};

use crate::{Client, Result};

/// A single printer.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Printer {
    /// The identifier of the printer.
    pub id: u64,
    /// The number of the printer within its type.
    pub number: String,
    /// Whether the printer is under maintenance.
    #[serde(default)]
    pub maintenance: bool,
    /// Whether issues were reported for the printer.
    #[serde(default)]
    pub has_issues: bool,
}

/// Whether a printer can be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrinterStatus {
    /// The printer can be linked to a user.
    Available,
    /// The printer is under maintenance.
    Maintenance,
    /// Issues were reported for the printer.
    Issues,
}

impl Printer {
    /// The status of the printer. Maintenance takes precedence over issues.
    pub fn status(&self) -> PrinterStatus {
        if self.maintenance {
            PrinterStatus::Maintenance
        } else if self.has_issues {
            PrinterStatus::Issues
        } else {
            PrinterStatus::Available
        }
    }
}

/// A model of printer, with the printers of that model.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PrinterType {
    /// The identifier of the model.
    pub id: u64,
    /// The full name of the model.
    pub name: String,
    /// The abbreviation of the model.
    pub short_form: String,
    /// Whether the model is offered at all.
    #[serde(default)]
    pub available: bool,
    /// The printers of that model.
    #[serde(default)]
    pub printers: Vec<Printer>,
}

impl PrinterType {
    /// The display label of one of the printers, e.g. `UM2P - 2`.
    pub fn label(&self, printer: &Printer) -> String {
        format!("{} - {}", self.short_form, printer.number)
    }
}

/// A problem reported for a printer.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PrinterIssue {
    /// The identifier of the issue.
    pub id: u64,
    /// The printer the issue is about.
    pub printer_id: u64,
    /// A one-line summary.
    pub summary: String,
    /// The details.
    #[serde(default)]
    pub description: Option<String>,
    /// The name of whoever reported the issue.
    #[serde(default)]
    pub reporter: Option<String>,
    /// When the issue was reported.
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Deserialize)]
struct PrinterIssuesResponse {
    #[serde(default)]
    issues: Vec<PrinterIssue>,
}

/// Counters for the printers of a space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PrinterStats {
    /// Every printer.
    pub total: usize,
    /// Printers without maintenance or issues.
    pub available: usize,
    /// Printers under maintenance.
    pub maintenance: usize,
    /// Open issues.
    pub issues: usize,
}

impl PrinterStats {
    /// Count the printers of `types` and the `issues`.
    pub fn new(types: &[PrinterType], issues: &[PrinterIssue]) -> Self {
        let printers = || types.iter().flat_map(|t| &t.printers);

        Self {
            total: printers().count(),
            available: printers().filter(|p| p.status() == PrinterStatus::Available).count(),
            maintenance: printers().filter(|p| p.maintenance).count(),
            issues: issues.len(),
        }
    }
}

/// The label of the printer with the given id, if it's one of `types`.
pub fn printer_label(types: &[PrinterType], printer_id: u64) -> Option<String> {
    types.iter().find_map(|t| {
        t.printers.iter().find(|p| p.id == printer_id).map(|printer| t.label(printer))
    })
}

#[derive(Serialize)]
struct LinkPrinter {
    user_id: u64,
    printer_id: u64,
}

#[derive(Serialize)]
struct LinkPrinterRequest {
    printer: LinkPrinter,
}

/// The printers of the space.
#[derive(Debug, Clone)]
pub struct Printers {
    client: Client,
}

impl Printers {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// List the printer models and their printers.
    pub async fn printer_data(&self) -> Result<Vec<PrinterType>> {
        self.client.get("printers/printer_data").await
    }

    /// List the open printer issues.
    pub async fn issues(&self) -> Result<Vec<PrinterIssue>> {
        let response: PrinterIssuesResponse = self.client.get("printer_issues").await?;
        Ok(response.issues)
    }

    /// Record that `user_id` is using the printer `printer_id`.
    #[instrument(skip(self))]
    pub async fn link_to_user(&self, printer_id: u64, user_id: u64) -> Result<()> {
        let request = LinkPrinterRequest { printer: LinkPrinter { user_id, printer_id } };
        let _: JsonValue = self.client.patch("printers/link_printer_to_user", &request).await?;

        info!("Linked the printer");
        Ok(())
    }
}
