//! Canonical binary encoding for the ledger transaction format.
//!
//! Only the field types a memo-bearing `AccountSet` needs are implemented:
//! UInt16, UInt32, native Amount, Blob, AccountID, STObject and STArray.
//! Fields are emitted in canonical order, sorted by (type code, field code).

use crate::utils::{NotaryError, Result};

pub const TYPE_UINT16: u8 = 1;
pub const TYPE_UINT32: u8 = 2;
pub const TYPE_AMOUNT: u8 = 6;
pub const TYPE_BLOB: u8 = 7;
pub const TYPE_ACCOUNT_ID: u8 = 8;
pub const TYPE_OBJECT: u8 = 14;
pub const TYPE_ARRAY: u8 = 15;

const OBJECT_END_MARKER: u8 = 0xE1;
const ARRAY_END_MARKER: u8 = 0xF1;

/// Largest length the 3-byte VL prefix can express.
pub const MAX_VL_LENGTH: usize = 918_744;

const MAX_DROPS: u64 = 100_000_000_000_000_000;

/// (type code, field code) pair identifying a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FieldId {
    pub type_code: u8,
    pub field_code: u8,
}

impl FieldId {
    pub const fn new(type_code: u8, field_code: u8) -> Self {
        Self { type_code, field_code }
    }

    /// Field header: 1, 2 or 3 bytes depending on whether each code fits a nibble.
    pub fn header(&self) -> Vec<u8> {
        let (t, f) = (self.type_code, self.field_code);
        match (t < 16, f < 16) {
            (true, true) => vec![(t << 4) | f],
            (true, false) => vec![t << 4, f],
            (false, true) => vec![f, t],
            (false, false) => vec![0, t, f],
        }
    }
}

/// Variable-length prefix for blobs and account ids.
pub fn vl_prefix(len: usize) -> Result<Vec<u8>> {
    if len <= 192 {
        Ok(vec![len as u8])
    } else if len <= 12_480 {
        let l = len - 193;
        Ok(vec![193 + (l >> 8) as u8, (l & 0xFF) as u8])
    } else if len <= MAX_VL_LENGTH {
        let l = len - 12_481;
        Ok(vec![241 + (l >> 16) as u8, ((l >> 8) & 0xFF) as u8, (l & 0xFF) as u8])
    } else {
        Err(NotaryError::Sign(format!("field of {} bytes exceeds the variable-length limit", len)))
    }
}

/// Native XRP amount in drops.
pub fn encode_native_amount(drops: u64) -> Result<[u8; 8]> {
    if drops > MAX_DROPS {
        return Err(NotaryError::Sign(format!("amount {} drops out of range", drops)));
    }
    // bit 63 clear = native, bit 62 set = positive
    Ok((0x4000_0000_0000_0000u64 | drops).to_be_bytes())
}

/// A typed field value.
#[derive(Clone, Debug)]
pub enum FieldValue {
    UInt16(u16),
    UInt32(u32),
    NativeAmount(u64),
    Blob(Vec<u8>),
    AccountId([u8; 20]),
    Object(Vec<(FieldId, FieldValue)>),
    Array(Vec<(FieldId, FieldValue)>),
}

/// Collects fields and writes them in canonical order.
#[derive(Default, Debug)]
pub struct Serializer {
    fields: Vec<(FieldId, FieldValue)>,
}

impl Serializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, id: FieldId, value: FieldValue) -> Self {
        self.fields.push((id, value));
        self
    }

    pub fn finish(self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        write_fields(&mut out, self.fields)?;
        Ok(out)
    }
}

fn write_fields(out: &mut Vec<u8>, mut fields: Vec<(FieldId, FieldValue)>) -> Result<()> {
    fields.sort_by_key(|(id, _)| *id);
    for pair in fields.windows(2) {
        if pair[0].0 == pair[1].0 {
            return Err(NotaryError::Sign(format!("duplicate field {:?}", pair[0].0)));
        }
    }
    for (id, value) in fields {
        out.extend_from_slice(&id.header());
        write_value(out, value)?;
    }
    Ok(())
}

fn write_value(out: &mut Vec<u8>, value: FieldValue) -> Result<()> {
    match value {
        FieldValue::UInt16(v) => out.extend_from_slice(&v.to_be_bytes()),
        FieldValue::UInt32(v) => out.extend_from_slice(&v.to_be_bytes()),
        FieldValue::NativeAmount(drops) => out.extend_from_slice(&encode_native_amount(drops)?),
        FieldValue::Blob(bytes) => {
            out.extend_from_slice(&vl_prefix(bytes.len())?);
            out.extend_from_slice(&bytes);
        }
        FieldValue::AccountId(id) => {
            out.extend_from_slice(&vl_prefix(id.len())?);
            out.extend_from_slice(&id);
        }
        FieldValue::Object(inner) => {
            write_fields(out, inner)?;
            out.push(OBJECT_END_MARKER);
        }
        FieldValue::Array(elements) => {
            // array elements keep their order; each is a wrapped object
            for (id, element) in elements {
                out.extend_from_slice(&id.header());
                write_value(out, element)?;
            }
            out.push(ARRAY_END_MARKER);
        }
    }
    Ok(())
}
