//! Naming table.
//!
//! Only the Windows/US-English records the reference icon fonts actually
//! carry are considered; their values are UTF-16 big-endian.
//!
//! <https://learn.microsoft.com/en-us/typography/opentype/spec/name>

use crate::error::FontResult;
use crate::reader::Reader;

/// `(platform_id, language_id, encoding_id)` triples worth decoding.
const ACCEPTED_IDS: [(u16, u16, u16); 2] = [(3, 1033, 1), (3, 1033, 10)];

/// The first six name ids: copyright, family, subfamily, unique id,
/// full name, version.
const FIELD_COUNT: usize = 6;

#[derive(Clone, Debug, Default)]
pub struct NameTable {
    pub copyright: String,
    pub family: String,
    pub subfamily: String,
    pub font_id: String,
    pub fullname: String,
    pub version: String,
}

pub(crate) fn parse(mut r: Reader<'_>) -> FontResult<NameTable> {
    r.read_u16()?; // version
    let record_count = r.read_u16()?;
    let storage_offset = usize::from(r.read_u16()?);

    struct NameRecord {
        name_id: u16,
        length: u16,
        offset: u16,
    }

    let mut records = Vec::new();
    for _ in 0..record_count {
        let platform_id = r.read_u16()?;
        let encoding_id = r.read_u16()?;
        let language_id = r.read_u16()?;
        let name_id = r.read_u16()?;
        let length = r.read_u16()?;
        let offset = r.read_u16()?;
        if ACCEPTED_IDS.contains(&(platform_id, language_id, encoding_id)) {
            records.push(NameRecord {
                name_id,
                length,
                offset,
            });
        }
    }

    let mut fields: [String; FIELD_COUNT] = Default::default();
    for record in records {
        let index = usize::from(record.name_id);
        if index >= FIELD_COUNT {
            continue;
        }
        let start = storage_offset + usize::from(record.offset);
        let mut value = r.view(start, start + usize::from(record.length))?;
        fields[index] = value.read_utf16_be(usize::from(record.length))?;
    }

    let [copyright, family, subfamily, font_id, fullname, version] = fields;
    Ok(NameTable {
        copyright,
        family,
        subfamily,
        font_id,
        fullname,
        version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(value: &str) -> Vec<u8> {
        value.encode_utf16().flat_map(u16::to_be_bytes).collect()
    }

    fn name_bytes(records: &[(u16, u16, u16, u16, &str)]) -> Vec<u8> {
        let mut storage = Vec::new();
        let mut table = Vec::new();
        table.extend_from_slice(&0u16.to_be_bytes()); // version
        table.extend_from_slice(&(records.len() as u16).to_be_bytes());
        let storage_offset = 6 + records.len() * 12;
        table.extend_from_slice(&(storage_offset as u16).to_be_bytes());

        for (platform, encoding, language, name_id, value) in records {
            let encoded = utf16(value);
            table.extend_from_slice(&platform.to_be_bytes());
            table.extend_from_slice(&encoding.to_be_bytes());
            table.extend_from_slice(&language.to_be_bytes());
            table.extend_from_slice(&name_id.to_be_bytes());
            table.extend_from_slice(&(encoded.len() as u16).to_be_bytes());
            table.extend_from_slice(&(storage.len() as u16).to_be_bytes());
            storage.extend_from_slice(&encoded);
        }
        table.extend_from_slice(&storage);
        table
    }

    #[test]
    fn decodes_windows_english_records() {
        let data = name_bytes(&[
            (3, 1, 1033, 1, "Icons"),
            (3, 1, 1033, 2, "Regular"),
            (3, 1, 1033, 5, "Version 1.0"),
        ]);
        let name = parse(Reader::new(&data)).unwrap();
        assert_eq!(name.family, "Icons");
        assert_eq!(name.subfamily, "Regular");
        assert_eq!(name.version, "Version 1.0");
        assert_eq!(name.copyright, "");
    }

    #[test]
    fn skips_foreign_platforms_and_large_ids() {
        let data = name_bytes(&[
            (1, 0, 0, 1, "MacName"),
            (3, 1, 1033, 9, "Designer"),
            (3, 10, 1033, 1, "Unicode Full"),
        ]);
        let name = parse(Reader::new(&data)).unwrap();
        // The (3, 1033, 10) record is accepted, the Mac record is not.
        assert_eq!(name.family, "Unicode Full");
        assert_eq!(name.fullname, "");
    }
}
