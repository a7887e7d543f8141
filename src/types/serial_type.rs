use crate::types::{
    SerialTypeCode,
    error::{DatabaseError, Result},
    value::Value,
};

/// Storage class of one record column, as declared in the record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialType {
    Null,
    Int8,
    Int16,
    Int24,
    Int32,
    Int48,
    Int64,
    Float64,
    Zero,
    One,
    /// Codes 10 and 11 are reserved for internal use and carry no bytes.
    Reserved(SerialTypeCode),
    Blob(usize),
    Text(usize),
}

impl SerialType {
    pub fn from_code(code: SerialTypeCode) -> Self {
        match code {
            0 => SerialType::Null,
            1 => SerialType::Int8,
            2 => SerialType::Int16,
            3 => SerialType::Int24,
            4 => SerialType::Int32,
            5 => SerialType::Int48,
            6 => SerialType::Int64,
            7 => SerialType::Float64,
            8 => SerialType::Zero,
            9 => SerialType::One,
            10 | 11 => SerialType::Reserved(code),
            n if n % 2 == 0 => SerialType::Blob(((n - 12) / 2) as usize),
            n => SerialType::Text(((n - 13) / 2) as usize),
        }
    }

    pub fn code(&self) -> SerialTypeCode {
        match self {
            SerialType::Null => 0,
            SerialType::Int8 => 1,
            SerialType::Int16 => 2,
            SerialType::Int24 => 3,
            SerialType::Int32 => 4,
            SerialType::Int48 => 5,
            SerialType::Int64 => 6,
            SerialType::Float64 => 7,
            SerialType::Zero => 8,
            SerialType::One => 9,
            SerialType::Reserved(code) => *code,
            SerialType::Blob(len) => *len as SerialTypeCode * 2 + 12,
            SerialType::Text(len) => *len as SerialTypeCode * 2 + 13,
        }
    }

    /// Number of body bytes a column of this type occupies.
    pub fn width(&self) -> usize {
        match self {
            SerialType::Null | SerialType::Zero | SerialType::One | SerialType::Reserved(_) => 0,
            SerialType::Int8 => 1,
            SerialType::Int16 => 2,
            SerialType::Int24 => 3,
            SerialType::Int32 => 4,
            SerialType::Int48 => 6,
            SerialType::Int64 | SerialType::Float64 => 8,
            SerialType::Blob(len) | SerialType::Text(len) => *len,
        }
    }

    /// Decode exactly `width()` bytes at `pos`.
    pub fn decode(&self, buffer: &[u8], pos: usize) -> Result<Value> {
        let width = self.width();
        let available = buffer.len().saturating_sub(pos);
        if width > available {
            return Err(DatabaseError::InsufficientBytes {
                offset: pos,
                needed: width,
                available,
            });
        }
        let bytes: &[u8] = if width == 0 {
            &[]
        } else {
            &buffer[pos..pos + width]
        };

        let value = match self {
            SerialType::Null | SerialType::Reserved(_) => Value::Null,
            SerialType::Zero => Value::Integer(0),
            SerialType::One => Value::Integer(1),
            SerialType::Int8
            | SerialType::Int16
            | SerialType::Int24
            | SerialType::Int32
            | SerialType::Int48
            | SerialType::Int64 => Value::Integer(read_signed_be(bytes)),
            SerialType::Float64 => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                Value::Real(f64::from_be_bytes(raw))
            }
            SerialType::Blob(_) => Value::Blob(bytes.to_vec()),
            SerialType::Text(_) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        };
        Ok(value)
    }
}

pub fn width_of(code: SerialTypeCode) -> usize {
    SerialType::from_code(code).width()
}

pub fn decode_column(code: SerialTypeCode, buffer: &[u8], pos: usize) -> Result<Value> {
    SerialType::from_code(code).decode(buffer, pos)
}

/// Big-endian two's-complement integer of 1..=8 bytes, sign-extended.
fn read_signed_be(bytes: &[u8]) -> i64 {
    let mut value: i64 = match bytes.first() {
        Some(first) if first & 0x80 != 0 => -1,
        _ => 0,
    };
    for byte in bytes {
        value = (value << 8) | *byte as i64;
    }
    value
}

/// Smallest serial type able to hold `value`, plus its body bytes.
pub fn encode_value(value: &Value) -> (SerialType, Vec<u8>) {
    match value {
        Value::Null => (SerialType::Null, Vec::new()),
        Value::Integer(0) => (SerialType::Zero, Vec::new()),
        Value::Integer(1) => (SerialType::One, Vec::new()),
        Value::Integer(i) => {
            let i = *i;
            let serial_type = if (-0x80..0x80).contains(&i) {
                SerialType::Int8
            } else if (-0x8000..0x8000).contains(&i) {
                SerialType::Int16
            } else if (-0x80_0000..0x80_0000).contains(&i) {
                SerialType::Int24
            } else if (-0x8000_0000..0x8000_0000).contains(&i) {
                SerialType::Int32
            } else if (-0x8000_0000_0000..0x8000_0000_0000).contains(&i) {
                SerialType::Int48
            } else {
                SerialType::Int64
            };
            let width = serial_type.width();
            (serial_type, i.to_be_bytes()[8 - width..].to_vec())
        }
        Value::Real(r) => (SerialType::Float64, r.to_be_bytes().to_vec()),
        Value::Text(s) => (SerialType::Text(s.len()), s.as_bytes().to_vec()),
        Value::Blob(b) => (SerialType::Blob(b.len()), b.clone()),
    }
}
