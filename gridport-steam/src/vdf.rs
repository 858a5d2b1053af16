//! Binary VDF, the key/value format of `shortcuts.vdf`.
//!
//! Each entry is a type byte, a NUL-terminated key and a value:
//!
//! | type | value |
//! |------|-------|
//! | 0x00 | nested map, terminated by 0x08 |
//! | 0x01 | NUL-terminated UTF-8 string |
//! | 0x02 | little-endian 32-bit integer |
//!
//! The file itself is one map terminated by 0x08.

use crate::error::SteamError;

const TYPE_MAP: u8 = 0x00;
const TYPE_STRING: u8 = 0x01;
const TYPE_INT: u8 = 0x02;
const MAP_END: u8 = 0x08;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VdfValue {
    Map(VdfMap),
    String(String),
    Int(i32),
}

/// A map that keeps its keys in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VdfMap {
    entries: Vec<(String, VdfValue)>,
}

impl VdfMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&VdfValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Case-insensitive lookup; Steam is not consistent about key casing.
    pub fn get_ignore_case(&self, key: &str) -> Option<&VdfValue> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get_ignore_case(key)? {
            VdfValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.get_ignore_case(key)? {
            VdfValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn get_map(&self, key: &str) -> Option<&VdfMap> {
        match self.get_ignore_case(key)? {
            VdfValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Replace the value under `key`, or append it.
    pub fn insert(&mut self, key: impl Into<String>, value: VdfValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VdfValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a complete binary VDF document.
    pub fn parse(data: &[u8]) -> Result<Self, SteamError> {
        let mut reader = Reader { data, pos: 0 };
        reader.map(true)
    }

    /// Serialize as a complete binary VDF document.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write(&mut out);
        out
    }

    fn write(&self, out: &mut Vec<u8>) {
        for (key, value) in &self.entries {
            match value {
                VdfValue::Map(map) => {
                    out.push(TYPE_MAP);
                    write_cstr(out, key);
                    map.write(out);
                }
                VdfValue::String(s) => {
                    out.push(TYPE_STRING);
                    write_cstr(out, key);
                    write_cstr(out, s);
                }
                VdfValue::Int(n) => {
                    out.push(TYPE_INT);
                    write_cstr(out, key);
                    out.extend_from_slice(&n.to_le_bytes());
                }
            }
        }
        out.push(MAP_END);
    }
}

fn write_cstr(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(s.as_bytes());
    out.push(0);
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn byte(&mut self) -> Option<u8> {
        let b = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    fn cstr(&mut self) -> Result<String, SteamError> {
        let rest = &self.data[self.pos..];
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| self.error("unterminated string"))?;
        let s = String::from_utf8_lossy(&rest[..len]).into_owned();
        self.pos += len + 1;
        Ok(s)
    }

    fn int(&mut self) -> Result<i32, SteamError> {
        let bytes = self
            .data
            .get(self.pos..self.pos + 4)
            .ok_or_else(|| self.error("truncated integer"))?;
        let n = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        self.pos += 4;
        Ok(n)
    }

    /// Read entries up to the map terminator. The outermost map may also
    /// simply run to the end of the data.
    fn map(&mut self, outermost: bool) -> Result<VdfMap, SteamError> {
        let mut map = VdfMap::new();
        loop {
            let kind = match self.byte() {
                Some(MAP_END) => return Ok(map),
                Some(kind) => kind,
                None if outermost => return Ok(map),
                None => return Err(self.error("unexpected end of data")),
            };
            let key = self.cstr()?;
            let value = match kind {
                TYPE_MAP => VdfValue::Map(self.map(false)?),
                TYPE_STRING => VdfValue::String(self.cstr()?),
                TYPE_INT => VdfValue::Int(self.int()?),
                other => {
                    return Err(self.error(&format!("unknown value type 0x{other:02x}")));
                }
            };
            map.entries.push((key, value));
        }
    }

    fn error(&self, message: &str) -> SteamError {
        SteamError::Vdf(format!("{message} at byte {}", self.pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_bytes() {
        let mut data = vec![TYPE_MAP];
        data.extend_from_slice(b"shortcuts\0");
        data.push(TYPE_MAP);
        data.extend_from_slice(b"0\0");
        data.push(TYPE_INT);
        data.extend_from_slice(b"appid\0");
        data.extend_from_slice(&(-2i32).to_le_bytes());
        data.push(TYPE_STRING);
        data.extend_from_slice(b"AppName\0Quest Game\0");
        data.extend_from_slice(&[MAP_END, MAP_END, MAP_END]);

        let root = VdfMap::parse(&data).unwrap();
        let entry = root.get_map("shortcuts").unwrap().get_map("0").unwrap();
        assert_eq!(entry.get_int("appid"), Some(-2));
        assert_eq!(entry.get_str("appname"), Some("Quest Game"));
        assert_eq!(root.to_bytes(), data);
    }

    #[test]
    fn empty_input_is_empty_map() {
        assert!(VdfMap::parse(&[]).unwrap().is_empty());
    }

    #[test]
    fn truncated_input_is_an_error() {
        let mut data = vec![TYPE_MAP];
        data.extend_from_slice(b"shortcuts\0");
        data.push(TYPE_INT);
        data.extend_from_slice(b"appid\0\x01\x02");
        assert!(matches!(VdfMap::parse(&data), Err(SteamError::Vdf(_))));
    }

    #[test]
    fn unknown_type_is_an_error() {
        let data = b"\x07key\0\0\0\0\0\0\0\0\0\x08";
        let err = VdfMap::parse(data).unwrap_err();
        assert!(err.to_string().contains("0x07"));
    }

    #[test]
    fn insert_replaces_existing_key() {
        let mut map = VdfMap::new();
        map.insert("a", VdfValue::Int(1));
        map.insert("b", VdfValue::Int(2));
        map.insert("a", VdfValue::String("x".into()));
        assert_eq!(map.len(), 2);
        assert_eq!(map.get_str("a"), Some("x"));
    }
}
