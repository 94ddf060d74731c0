//! Bulk supplier upload
//!
//! Reconciles parsed spreadsheet rows against the existing supplier
//! collection: unknown companies are inserted, soft-deleted ones are
//! reactivated with the row's data, active ones are skipped. The existing
//! collection is snapshotted once per batch; rows inserted earlier in the
//! same batch join the snapshot, so re-running a file is idempotent.

use super::error::SupplierResult;
use super::manager::{SupplierFields, SupplierManager};
use crate::domain::supplier::{Supplier, SupplierContact, SUPPLIER_COLLECTION};
use crate::infrastructure::events::Event;
use crate::session::ActingUser;
use crate::shared::text::{compact, split_multi};
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, instrument, warn};
use uuid::Uuid;

const COMPANY_HEADERS: [&str; 3] = ["Company Name", "Company", "Supplier"];
const ADDRESS_HEADERS: [&str; 2] = ["Addresses", "Address"];
const EMAIL_HEADERS: [&str; 2] = ["Emails", "Email"];
const CONTACT_NAME_HEADERS: [&str; 3] = ["Contact Name(s)", "Contact Person", "Contacts"];
const CONTACT_PHONE_HEADERS: [&str; 3] = ["Phone Number(s)", "Contact Number", "Phone"];
const FORTE_PRODUCT_HEADERS: [&str; 2] = ["Forte Product(s)", "Forte Products"];
const PRODUCT_HEADERS: [&str; 2] = ["Product(s)", "Products"];
const CERTIFICATE_HEADERS: [&str; 2] = ["Certificate(s)", "Certificates"];

/// One parsed spreadsheet row, keyed by header cell
#[derive(Debug, Clone, Default)]
pub struct SupplierRow {
	cells: BTreeMap<String, String>,
}

impl SupplierRow {
	pub fn new(cells: BTreeMap<String, String>) -> Self {
		Self { cells }
	}

	pub fn set(mut self, header: impl Into<String>, value: impl Into<String>) -> Self {
		self.cells.insert(header.into(), value.into());
		self
	}

	/// The first non-blank cell among the candidate headers; exported files
	/// have drifted between header spellings over the years
	fn first_of(&self, headers: &[&str]) -> String {
		headers
			.iter()
			.filter_map(|h| self.cells.get(*h))
			.map(|v| v.trim())
			.find(|v| !v.is_empty())
			.map(str::to_string)
			.unwrap_or_default()
	}

	fn cell(&self, header: &str) -> String {
		self.first_of(&[header])
	}

	/// Map the row onto supplier fields. Contact phones pair with contact
	/// names by position, which is why `split_multi` keeps empty segments.
	pub fn to_fields(&self) -> SupplierFields {
		let names = split_multi(&self.first_of(&CONTACT_NAME_HEADERS));
		let phones = split_multi(&self.first_of(&CONTACT_PHONE_HEADERS));
		let contacts = names
			.iter()
			.enumerate()
			.filter(|(_, name)| !name.is_empty())
			.map(|(i, name)| SupplierContact {
				name: name.clone(),
				phone: phones.get(i).cloned().unwrap_or_default(),
			})
			.collect();

		SupplierFields {
			company: self.first_of(&COMPANY_HEADERS),
			internal_code: self.cell("Internal Code"),
			addresses: split_multi(&self.first_of(&ADDRESS_HEADERS)),
			emails: split_multi(&self.first_of(&EMAIL_HEADERS)),
			website: self.cell("Website"),
			contacts,
			forte_products: split_multi(&self.first_of(&FORTE_PRODUCT_HEADERS)),
			products: split_multi(&self.first_of(&PRODUCT_HEADERS)),
			certificates: split_multi(&self.first_of(&CERTIFICATE_HEADERS)),
		}
	}
}

/// What happened to one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
	Inserted(Uuid),
	Reactivated(Uuid),
	/// An active supplier with this company already exists
	SkippedDuplicate(String),
	/// The row failed validation; carries the reason
	SkippedInvalid(String),
}

/// Tally for one upload batch
#[derive(Debug, Default)]
pub struct UploadSummary {
	pub inserted: usize,
	pub reactivated: usize,
	pub skipped_duplicate: usize,
	pub skipped_invalid: usize,
	/// Per-row outcomes in input order
	pub outcomes: Vec<RowOutcome>,
}

impl UploadSummary {
	/// True when every row was skipped; callers surface this instead of a
	/// silent no-op
	pub fn nothing_uploaded(&self) -> bool {
		self.inserted == 0 && self.reactivated == 0
	}

	fn record(&mut self, outcome: RowOutcome) {
		match &outcome {
			RowOutcome::Inserted(_) => self.inserted += 1,
			RowOutcome::Reactivated(_) => self.reactivated += 1,
			RowOutcome::SkippedDuplicate(_) => self.skipped_duplicate += 1,
			RowOutcome::SkippedInvalid(_) => self.skipped_invalid += 1,
		}
		self.outcomes.push(outcome);
	}
}

#[derive(Clone, Copy)]
struct Known {
	id: Uuid,
	is_active: bool,
}

impl SupplierManager {
	/// Reconcile a batch of parsed rows against the supplier collection
	#[instrument(skip(self, rows, user), fields(rows = rows.len(), user = %user.reference_id))]
	pub async fn upload(
		&self,
		rows: Vec<SupplierRow>,
		user: &ActingUser,
	) -> SupplierResult<UploadSummary> {
		// The batch runs under the manager's write lock so a concurrent
		// create cannot slip past the snapshot below
		let _guard = self.write_lock.lock().await;

		// One snapshot for the whole batch, soft-deleted suppliers included
		let mut known: HashMap<String, Known> = HashMap::new();
		for doc in self.store.list(SUPPLIER_COLLECTION).await? {
			if let Ok(supplier) = doc.deserialize::<Supplier>() {
				known.insert(
					supplier.company.to_lowercase(),
					Known {
						id: doc.id,
						is_active: supplier.is_active,
					},
				);
			}
		}

		let mut summary = UploadSummary::default();
		for row in rows {
			let fields = row.to_fields();
			let key = fields.company.trim().to_lowercase();

			match known.get(&key).copied() {
				Some(existing) if existing.is_active => {
					summary.record(RowOutcome::SkippedDuplicate(fields.company));
				}
				Some(existing) => {
					self.reactivate(existing.id, fields, user).await?;
					known.insert(
						key,
						Known {
							id: existing.id,
							is_active: true,
						},
					);
					summary.record(RowOutcome::Reactivated(existing.id));
				}
				None => match self.insert(fields, user).await {
					Ok(supplier) => {
						known.insert(
							key,
							Known {
								id: supplier.id,
								is_active: true,
							},
						);
						summary.record(RowOutcome::Inserted(supplier.id));
					}
					Err(e) => summary.record(RowOutcome::SkippedInvalid(e.to_string())),
				},
			}
		}

		if summary.nothing_uploaded() {
			warn!(
				"Upload finished without inserting anything ({} duplicate(s), {} invalid)",
				summary.skipped_duplicate, summary.skipped_invalid
			);
		} else {
			info!(
				"Upload finished: {} inserted, {} reactivated, {} skipped",
				summary.inserted,
				summary.reactivated,
				summary.skipped_duplicate + summary.skipped_invalid
			);
		}
		self.events.emit(Event::SupplierUploadCompleted {
			inserted: summary.inserted,
			reactivated: summary.reactivated,
			skipped: summary.skipped_duplicate + summary.skipped_invalid,
		});
		Ok(summary)
	}

	/// Bring a soft-deleted supplier back with the row's data; the original
	/// code, creator and creation stamp are kept
	async fn reactivate(
		&self,
		id: Uuid,
		fields: SupplierFields,
		user: &ActingUser,
	) -> SupplierResult<()> {
		self.store
			.update(
				SUPPLIER_COLLECTION,
				id,
				json!({
					"company": fields.company.trim(),
					"internalCode": fields.internal_code.trim(),
					"addresses": compact(&fields.addresses),
					"emails": compact(&fields.emails),
					"website": fields.website.trim(),
					"contacts": fields.contacts,
					"forteProducts": compact(&fields.forte_products),
					"products": compact(&fields.products),
					"certificates": compact(&fields.certificates),
					"isActive": true,
					"referenceID": user.reference_id,
					"updatedAt": Utc::now(),
					"deletedBy": Value::Null,
					"deletedAt": Value::Null,
				}),
			)
			.await?;
		Ok(())
	}
}
