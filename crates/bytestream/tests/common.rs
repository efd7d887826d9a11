#![allow(missing_docs)]
#![allow(dead_code)]

/// A single indirect object with a stream body, as found in a PDF file.
pub const PDF_OBJECT: &[u8] = b"1 0 obj\n<< /Length 5 >>\nstream\nhello\nendstream\nendobj\n";

/// A cross-reference table section: a subsection header followed by
/// fixed-width entries.
pub const XREF_SECTION: &[u8] = b"xref\n0 3\n\
0000000000 65535 f\r\n\
0000000017 00000 n\r\n\
0000000081 00000 n\r\n\
trailer\n";

/// An HTTP request head.
pub const REQUEST: &[u8] = b"GET /attest?challenge=1 HTTP/1.1\r\nHost: verify\r\nAccept: */*\r\n\r\n";
