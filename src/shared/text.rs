//! Small text helpers shared by the supplier and product paths

/// Trim every entry and drop the blank ones
pub fn compact(values: &[String]) -> Vec<String> {
	values
		.iter()
		.map(|v| v.trim().to_string())
		.filter(|v| !v.is_empty())
		.collect()
}

/// Split a pipe-delimited cell into trimmed entries; empty segments survive
/// so positional pairing (contact names against phones) stays aligned
pub fn split_multi(raw: &str) -> Vec<String> {
	if raw.trim().is_empty() {
		return Vec::new();
	}
	raw.split('|').map(|v| v.trim().to_string()).collect()
}
