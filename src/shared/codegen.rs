//! Human-readable product and supplier codes
//!
//! Codes look like `ZL-PROD-7K2M9Q`: an initials prefix derived from the
//! name, a kind tag, and a random 6-character suffix. No uniqueness check is
//! performed against existing codes; the suffix space makes collisions
//! negligible.

use rand::Rng;

/// Which kind of code to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
	Product,
	Supplier,
}

impl CodeKind {
	fn tag(self) -> &'static str {
		match self {
			CodeKind::Product => "PROD",
			CodeKind::Supplier => "SUPP",
		}
	}

	fn fallback_prefix(self) -> &'static str {
		match self {
			CodeKind::Product => "PROD",
			CodeKind::Supplier => "COMP",
		}
	}

	/// Corporate suffixes are dropped from the prefix for supplier codes only
	fn strip_corporate_suffixes(self) -> bool {
		matches!(self, CodeKind::Supplier)
	}
}

const CORPORATE_SUFFIXES: [&str; 6] = ["INC", "INCORPORATED", "CORP", "CORPORATION", "LTD", "CO"];

const SUFFIX_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 6;
const PREFIX_WORDS: usize = 4;

/// Generate a `PREFIX-PROD-XXXXXX` / `PREFIX-SUPP-XXXXXX` code from a name
pub fn generate_code(name: &str, kind: CodeKind) -> String {
	let mut prefix = name_prefix(name, kind);
	if prefix.is_empty() {
		prefix = kind.fallback_prefix().to_string();
	}
	format!("{}-{}-{}", prefix, kind.tag(), random_suffix())
}

/// First letters of up to four significant words, alphabetic input only
fn name_prefix(name: &str, kind: CodeKind) -> String {
	let cleaned: String = name
		.chars()
		.filter(|c| c.is_ascii_alphabetic() || *c == ' ')
		.collect();
	cleaned
		.split_whitespace()
		.filter(|word| {
			!kind.strip_corporate_suffixes()
				|| !CORPORATE_SUFFIXES.contains(&word.to_ascii_uppercase().as_str())
		})
		.filter_map(|word| word.chars().next())
		.map(|c| c.to_ascii_uppercase())
		.take(PREFIX_WORDS)
		.collect()
}

fn random_suffix() -> String {
	let mut rng = rand::thread_rng();
	(0..SUFFIX_LEN)
		.map(|_| SUFFIX_CHARS[rng.gen_range(0..SUFFIX_CHARS.len())] as char)
		.collect()
}
