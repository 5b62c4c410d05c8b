//! Optional well-formedness check
//!
//! Substitution is literal, so a bad replacement value could in principle
//! break the document's markup. When enabled, the rewritten bytes are
//! streamed through an XML reader before anything is written; the folder
//! fails with a recorded reason instead of producing a corrupt artifact.

use quick_xml::events::Event;
use quick_xml::Reader;

/// Stream the document through the XML reader, reporting the first error
pub fn check_well_formed(document: &[u8]) -> Result<(), String> {
    let mut reader = Reader::from_reader(document);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => return Ok(()),
            Ok(_) => {}
            Err(e) => {
                return Err(format!("at byte {}: {}", reader.buffer_position(), e));
            }
        }
        buf.clear();
    }
}
