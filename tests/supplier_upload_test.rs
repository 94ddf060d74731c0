//! Bulk supplier upload through the core: inserts, reactivation, duplicate
//! skipping, and the completion event.

use catalog_core::domain::UserProfile;
use catalog_core::infrastructure::events::Event;
use catalog_core::session::StaticResolver;
use catalog_core::supplier::{RowOutcome, SupplierRow};
use catalog_core::Core;
use std::sync::Arc;

fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
		)
		.try_init();
}

async fn core() -> (Core, tempfile::TempDir) {
	init_tracing();
	let dir = tempfile::tempdir().unwrap();
	let resolver = Arc::new(StaticResolver::new().with_user(
		"u1",
		UserProfile {
			firstname: "Ada".into(),
			lastname: "Reyes".into(),
			role: "Staff".into(),
			reference_id: "REF-1".into(),
			email: "ada@example.com".into(),
		},
	));
	let core = Core::new_with_resolver(dir.path().to_path_buf(), resolver)
		.await
		.unwrap();
	core.session.sign_in("u1").await.unwrap();
	(core, dir)
}

fn row(company: &str) -> SupplierRow {
	SupplierRow::default()
		.set("Company Name", company)
		.set("Address", "1 Main St")
		.set("Email", "sales@example.com")
}

#[tokio::test]
async fn test_upload_inserts_then_skips_on_rerun() {
	let (core, _dir) = core().await;
	let user = core.session.acting_user().await.unwrap();
	let mut events = core.events.subscribe();

	let rows = vec![
		row("Acme"),
		row("Borealis").set("Contact Person", "Ana|Ben").set(
			"Contact Number",
			"111|222",
		),
	];
	let summary = core.suppliers.upload(rows.clone(), &user).await.unwrap();
	assert_eq!(summary.inserted, 2);
	assert_eq!(summary.skipped_duplicate, 0);

	// Every inserted supplier is a full record with generated code
	let id = match summary.outcomes[1] {
		RowOutcome::Inserted(id) => id,
		_ => panic!("expected insert"),
	};
	let borealis = core.suppliers.get(id).await.unwrap();
	assert_eq!(borealis.supplier_id, Some(id));
	assert!(borealis.company_code.contains("-SUPP-"));
	assert_eq!(borealis.contacts.len(), 2);
	assert_eq!(borealis.contacts[1].phone, "222");

	// Re-running the same file uploads nothing
	let again = core.suppliers.upload(rows, &user).await.unwrap();
	assert_eq!(again.inserted, 0);
	assert_eq!(again.skipped_duplicate, 2);
	assert!(again.nothing_uploaded());

	// The completion events carry the tallies, in order
	let mut completions = Vec::new();
	while let Ok(event) = events.try_recv() {
		if let Event::SupplierUploadCompleted {
			inserted,
			reactivated,
			skipped,
		} = event
		{
			completions.push((inserted, reactivated, skipped));
		}
	}
	assert_eq!(completions, vec![(2, 0, 0), (0, 0, 2)]);
}

#[tokio::test]
async fn test_upload_reactivates_and_refreshes_deleted_supplier() {
	let (core, _dir) = core().await;
	let user = core.session.acting_user().await.unwrap();

	let summary = core
		.suppliers
		.upload(vec![row("Acme")], &user)
		.await
		.unwrap();
	let id = match summary.outcomes[0] {
		RowOutcome::Inserted(id) => id,
		_ => panic!("expected insert"),
	};
	core.suppliers.soft_delete(id, &user).await.unwrap();

	// The same company comes back in a later file with fresher data
	let summary = core
		.suppliers
		.upload(vec![row("ACME").set("Website", "https://acme.example")], &user)
		.await
		.unwrap();
	assert_eq!(summary.reactivated, 1);
	assert_eq!(summary.outcomes, vec![RowOutcome::Reactivated(id)]);

	let revived = core.suppliers.get(id).await.unwrap();
	assert!(revived.is_active);
	assert!(revived.deleted_at.is_none());
	assert_eq!(revived.website, "https://acme.example");
}

#[tokio::test]
async fn test_upload_mixed_batch_tallies() {
	let (core, _dir) = core().await;
	let user = core.session.acting_user().await.unwrap();

	core.suppliers
		.upload(vec![row("Acme")], &user)
		.await
		.unwrap();

	let summary = core
		.suppliers
		.upload(
			vec![
				row("Acme"),                                   // active duplicate
				row("Borealis"),                               // fresh insert
				SupplierRow::default().set("Company", "   "),  // no usable company
			],
			&user,
		)
		.await
		.unwrap();

	assert_eq!(summary.inserted, 1);
	assert_eq!(summary.skipped_duplicate, 1);
	assert_eq!(summary.skipped_invalid, 1);
	assert!(!summary.nothing_uploaded());
}
