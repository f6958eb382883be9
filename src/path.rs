//! SEMP v2 resource path composition.

/// Root of the SEMP v2 configuration API. Always the first path segment
/// and never percent-encoded.
pub const SEMP_V2_CONFIG: &str = "/SEMP/v2/config";

/// Compose a resource path from ordered segments.
///
/// Segment 0 is the fixed API root and passes through verbatim. Every
/// later segment has `/` replaced with `%2F` so identifiers containing
/// slashes (topic names, composite keys) stay within a single path
/// element. Segments are joined with `/`; no other normalization is
/// applied.
///
/// The original management tooling had to guard against being handed a
/// bare string here; the slice type makes that unrepresentable.
pub fn compose(segments: &[String]) -> String {
    let encoded: Vec<String> = segments
        .iter()
        .enumerate()
        .map(|(i, seg)| {
            if i == 0 {
                seg.clone()
            } else {
                seg.replace('/', "%2F")
            }
        })
        .collect();
    encoded.join("/")
}

/// Convenience for building a segment vector starting at the API root.
pub fn root() -> Vec<String> {
    vec![SEMP_V2_CONFIG.to_string()]
}
